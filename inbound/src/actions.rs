//! Transactions this crate asks an external client to send.

use crate::wanchain::{Address, Bytes, U256};
use serde::Serialize;
use serde_hex::{CompactPfx, SerHex};

/// A contract call on the destination ledger, shaped like the object a web3
/// `eth_sendTransaction` expects.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallContract {
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    #[serde(rename = "gas", with = "SerHex::<CompactPfx>")]
    pub gas_limit: u64,
    pub gas_price: U256,
}
