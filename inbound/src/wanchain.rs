//! Minimal Wanchain (destination ledger) types.
//!
//! Wanchain speaks the Ethereum JSON-RPC dialect, so these mirror the shapes
//! returned by a web3 client and only contain the fields we are actually
//! using.

use crate::{encoding::strip_hex_prefix, Error};
pub use primitive_types::U256;
use serde::{Deserialize, Serialize};
use serde_hex::{CompactPfx, SerHex, SerHexSeq, StrictPfx};
use std::{
    fmt,
    fmt::{Display, Formatter, LowerHex},
    str::FromStr,
};

/// One gwei in wei, gas prices are configured in gwei.
pub const GWEI: u64 = 1_000_000_000;

#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Address(#[serde(with = "SerHex::<StrictPfx>")] [u8; 20]);

impl Address {
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }
}

impl From<Address> for [u8; 20] {
    fn from(s: Address) -> Self {
        s.0
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::encoding::parse_bytes20(s).map(Address)
    }
}

impl LowerHex for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "0x")?;
        }
        for i in &self.0[..] {
            write!(f, "{:02x}", i)?;
        }
        Ok(())
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self)
    }
}

impl From<Address> for Hash {
    fn from(address: Address) -> Self {
        let mut h256 = Hash([0u8; 32]);
        h256.0[(32 - 20)..32].copy_from_slice(&address.0);
        h256
    }
}

#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Hash(#[serde(with = "SerHex::<StrictPfx>")] [u8; 32]);

impl From<[u8; 32]> for Hash {
    fn from(bytes: [u8; 32]) -> Self {
        Hash(bytes)
    }
}

impl From<Hash> for [u8; 32] {
    fn from(s: Hash) -> Self {
        s.0
    }
}

impl From<crate::SecretHash> for Hash {
    fn from(secret_hash: crate::SecretHash) -> Self {
        Hash(secret_hash.into_raw())
    }
}

impl Hash {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl FromStr for Hash {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(strip_hex_prefix(s))
            .map_err(|e| Error::InvalidKey(format!("{} is not valid hex: {}", s, e)))?;

        if bytes.len() != 32 {
            return Err(Error::InvalidKey(format!(
                "expected a 32 byte hash, got {} bytes",
                bytes.len()
            )));
        }

        let mut hash = [0u8; 32];
        hash.copy_from_slice(&bytes);

        Ok(Hash(hash))
    }
}

impl LowerHex for Hash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "0x")?;
        }
        for i in &self.0[..] {
            write!(f, "{:02x}", i)?;
        }
        Ok(())
    }
}

impl Display for Hash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for i in &self.0[0..2] {
            write!(f, "{:02x}", i)?;
        }
        write!(f, "…")?;
        for i in &self.0[32 - 2..32] {
            write!(f, "{:02x}", i)?;
        }
        Ok(())
    }
}

/// Raw contract call data.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bytes(#[serde(with = "SerHexSeq::<StrictPfx>")] pub Vec<u8>);

impl From<Vec<u8>> for Bytes {
    fn from(bytes: Vec<u8>) -> Self {
        Bytes(bytes)
    }
}

impl fmt::Debug for Bytes {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Bytes(0x{})", hex::encode(&self.0))
    }
}

impl LowerHex for Bytes {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "0x")?;
        }
        f.write_str(&hex::encode(&self.0))
    }
}

/// "Receipt" of an executed transaction: details of its execution.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    #[serde(rename = "transactionHash")]
    pub transaction_hash: Hash,
    #[serde(rename = "blockHash")]
    pub block_hash: Hash,
    #[serde(rename = "blockNumber", with = "SerHex::<CompactPfx>")]
    pub block_number: u64,
    /// Logs generated within this transaction.
    pub logs: Vec<Log>,
    /// Status: either 1 (success) or 0 (failure).
    #[serde(with = "SerHex::<CompactPfx>")]
    pub status: u8,
}

impl TransactionReceipt {
    pub fn is_status_ok(&self) -> bool {
        self.status == 1
    }
}

/// A log produced by a transaction, as delivered by a log subscription.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Log {
    /// H160
    pub address: Address,
    /// Topics
    pub topics: Vec<Hash>,
    /// Data
    #[serde(with = "SerHexSeq::<StrictPfx>")]
    pub data: Vec<u8>,
    #[serde(rename = "blockHash")]
    pub block_hash: Hash,
    #[serde(rename = "blockNumber", with = "SerHex::<CompactPfx>")]
    pub block_number: u64,
    #[serde(rename = "transactionHash")]
    pub transaction_hash: Hash,
    #[serde(rename = "logIndex", with = "SerHex::<CompactPfx>")]
    pub log_index: u64,
    /// Set when the log was dropped from the canonical chain by a reorg.
    #[serde(default)]
    pub removed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_string_address_accepts_prefix_and_mixed_case() {
        let lower = Address::from_str("9abbd236e46eae3ae230f3284d40f9df4ddb677f").unwrap();
        let mixed = Address::from_str("0x9ABbD236e46EAE3ae230f3284D40f9DF4ddb677F").unwrap();

        assert_eq!(lower, mixed);
        assert_eq!(
            format!("{:#x}", lower),
            "0x9abbd236e46eae3ae230f3284d40f9df4ddb677f"
        );
    }

    #[test]
    fn short_hash_is_rejected() {
        let result = Hash::from_str("0x3ae3b6ff");

        assert!(matches!(result, Err(Error::InvalidKey(_))));
    }

    #[test]
    fn deserialise_log() {
        let json = r#"
            {
                "address": "0xc5549e335b2786520f4c5d706c76c9ee69d0a028",
                "blockHash": "0x3ae3b6ffb04204f52dee42000e8b971c0f7c2b4aa8dd9455e41a30ee4b31e8a9",
                "blockNumber": "0x856ca0",
                "data": "0x0000000000000000000000000000000000000000000000000000000ba43b7400",
                "logIndex": "0x81",
                "removed": false,
                "topics": [
                    "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef",
                    "0x000000000000000000000000fb303a1fba5b4804863131145bc27256d3ab6692",
                    "0x000000000000000000000000d50fb7d948426633ec126aeea140ce4dd0979682"
                ],
                "transactionHash": "0x5ffd218c617f76c73aa49ee636027440b58eb022778c5e75794563c0d60fcb88",
                "transactionIndex": "0x93"
            }"#;

        let log: Log = serde_json::from_str(json).unwrap();

        assert_eq!(log.block_number, 0x0085_6ca0);
        assert_eq!(log.log_index, 0x81);
        assert!(!log.removed);
    }

    #[test]
    fn deserialize_receipt_with_status_0() {
        let json = r#"
        {
          "transactionHash": "0x5ffd218c617f76c73aa49ee636027440b58eb022778c5e75794563c0d60fcb88",
          "blockHash": "0x3ae3b6ffb04204f52dee42000e8b971c0f7c2b4aa8dd9455e41a30ee4b31e8a9",
          "blockNumber": "0x10",
          "logs": [],
          "status": "0x0"
        }
        "#;

        let receipt = serde_json::from_str::<TransactionReceipt>(json).unwrap();

        assert!(!receipt.is_status_ok());
        assert_eq!(receipt.block_number, 16);
    }
}
