#![warn(
    unused_extern_crates,
    missing_debug_implementations,
    missing_copy_implementations,
    rust_2018_idioms,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::fallible_impl_from,
    clippy::cast_precision_loss,
    clippy::cast_possible_wrap,
    clippy::print_stdout,
    clippy::dbg_macro
)]
#![forbid(unsafe_code)]

//! The inbound half of a BTC to WAN atomic swap.
//!
//! Bitcoin are locked in a P2SH HTLC on the source ledger, the lock is then
//! announced to the HTLC contract on Wanchain where a storeman locks the
//! wrapped asset under the same secret hash. Revealing the secret in a
//! redeem claims it; if the swap stalls, the bitcoin are revoked after the
//! lock timestamp.

pub mod actions;
pub mod bitcoin;
pub mod btsieve;
pub mod config;
pub mod coordinator;
pub mod encoding;
mod error;
mod redeem_key;
mod secret;
mod secret_hash;
pub mod submit;
pub mod swap;
mod timestamp;
pub mod wanchain;

/// A module for exporting dependencies that appear in the public API of our
/// crate.
///
/// Some types of our dependencies appear in public APIs of this crate and
/// hence force consumers to use a semver-compatible version of the crate in
/// their application. This module allows those consumers to access said
/// dependencies without having to declare a dependency themselves.
pub mod export {
    pub use ::bitcoin;
}

pub use self::{
    config::Config,
    coordinator::{Coordinator, Notification, SwapHandle, SwapState},
    error::{Error, ErrorKind},
    redeem_key::RedeemKey,
    secret::Secret,
    secret_hash::SecretHash,
    swap::{Storeman, SwapIntent},
    timestamp::Timestamp,
};

use serde::{Deserialize, Serialize};

/// The networks the source ledger can be on.
#[derive(
    Debug,
    Clone,
    Copy,
    strum_macros::Display,
    strum_macros::EnumString,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Main,
    Test,
    Dev,
}

impl Default for Network {
    fn default() -> Self {
        Network::Main
    }
}

impl From<Network> for ::bitcoin::Network {
    fn from(network: Network) -> Self {
        match network {
            Network::Main => ::bitcoin::Network::Bitcoin,
            Network::Test => ::bitcoin::Network::Testnet,
            Network::Dev => ::bitcoin::Network::Regtest,
        }
    }
}
