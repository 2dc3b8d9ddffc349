mod file;
mod settings;

pub use self::{
    file::File,
    settings::{Logging, Settings},
};
use crate::{
    btsieve::WatchPolicy,
    wanchain::{Address, Hash, U256, GWEI},
    Network,
};
use std::time::Duration;

/// The immutable configuration every swap attempt runs with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    pub network: Network,
    pub wanchain: Wanchain,
    pub watch: WatchPolicy,
    /// Upper bound on waiting for the counterparty's lock, `None` waits
    /// forever.
    pub watch_timeout: Option<Duration>,
}

impl From<Settings> for Config {
    fn from(settings: Settings) -> Self {
        Config {
            network: settings.network,
            wanchain: settings.wanchain,
            watch: settings.watch.policy,
            watch_timeout: settings.watch.timeout,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Wanchain {
    /// The HTLC contract handling inbound BTC.
    pub htlc_address: Address,
    pub signatures: Signatures,
    pub gas: Gas,
}

/// Keccak-256 hashes of the HTLC contract's function and event signatures.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Signatures {
    pub lock_notice: Hash,
    pub redeem: Hash,
    pub lock_event: Hash,
}

impl Signatures {
    pub fn lock_notice_selector(&self) -> [u8; 4] {
        selector(&self.lock_notice)
    }

    pub fn redeem_selector(&self) -> [u8; 4] {
        selector(&self.redeem)
    }
}

fn selector(signature: &Hash) -> [u8; 4] {
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&signature.as_bytes()[..4]);
    selector
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gas {
    pub lock_gas_limit: u64,
    pub redeem_gas_limit: u64,
    /// In wei.
    pub gas_price: U256,
}

impl Default for Gas {
    fn default() -> Self {
        Gas {
            lock_gas_limit: 4_710_000,
            redeem_gas_limit: 4_700_000,
            gas_price: U256::from(180 * GWEI),
        }
    }
}
