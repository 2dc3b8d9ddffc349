//! Source ledger (Bitcoin) side of the swap: the HTLC script that holds the
//! locked coins and the transaction that takes them back after the timelock.

mod htlc;
mod revoke;

pub use self::{
    htlc::Htlc,
    revoke::{RevokeSigner, UnsignedRevoke, SEQUENCE_ALLOW_NTIMELOCK_NO_RBF},
};

use crate::{Error, Network};
use bitcoin::{
    blockdata::{opcodes::all::*, script::Builder},
    Address, Script,
};
use std::str::FromStr;

/// A RIPEMD160(SHA256(pubkey)) as committed to in P2PKH outputs and in both
/// branches of the HTLC.
pub type PubkeyHash = [u8; 20];

/// Extracts the public key hash from a base58 P2PKH address.
///
/// Only pay-to-pubkey-hash addresses carry a hash we can commit to, anything
/// else is rejected. Testnet and regtest share their address prefixes hence
/// one is accepted in place of the other.
pub fn address_to_hash160(address: &str, network: Network) -> Result<PubkeyHash, Error> {
    let parsed = Address::from_str(address)
        .map_err(|e| Error::InvalidAddress(format!("{}: {}", address, e)))?;

    if !same_network(parsed.network, network.into()) {
        return Err(Error::InvalidAddress(format!(
            "{} is a {} address, expected {}",
            address, parsed.network, network
        )));
    }

    let script_pubkey = parsed.script_pubkey();
    if !script_pubkey.is_p2pkh() {
        return Err(Error::InvalidAddress(format!(
            "{} is not a pay-to-pubkey-hash address",
            address
        )));
    }

    // OP_DUP OP_HASH160 OP_PUSHBYTES_20 <hash> OP_EQUALVERIFY OP_CHECKSIG
    let mut hash = [0u8; 20];
    hash.copy_from_slice(&script_pubkey.as_bytes()[3..23]);

    Ok(hash)
}

pub fn p2pkh_script(pubkey_hash: &PubkeyHash) -> Script {
    Builder::new()
        .push_opcode(OP_DUP)
        .push_opcode(OP_HASH160)
        .push_slice(pubkey_hash)
        .push_opcode(OP_EQUALVERIFY)
        .push_opcode(OP_CHECKSIG)
        .into_script()
}

fn same_network(actual: bitcoin::Network, expected: bitcoin::Network) -> bool {
    use bitcoin::Network::*;

    match (actual, expected) {
        (Testnet, Regtest) | (Regtest, Testnet) => true,
        (actual, expected) => actual == expected,
    }
}
