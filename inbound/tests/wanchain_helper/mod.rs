mod connector_mock;

pub use connector_mock::{WanchainConnectorMock, OutOfSubscriptions};

use inbound::{
    btsieve::WatchPolicy,
    config::{Gas, Signatures, Wanchain},
    export::bitcoin::{hashes::hex::FromHex, Txid},
    wanchain::{Address, Hash, Log, TransactionReceipt},
    Config, Network, RedeemKey, Secret, Storeman, SwapIntent, Timestamp,
};
use std::{str::FromStr, time::Duration};

pub const HTLC_ADDRESS: &str = "0xb248ed04e1f1bb2f4f4ae8e4b1d7ebbc3c2d3f16";
pub const LOCK_EVENT_SIGNATURE: &str =
    "0x35b8a2b3a83f1a9b7e2c5a6d9e4f3b2c1d0e9f8a7b6c5d4e3f2a1b0c9d8e7f6a";

pub fn config(confirmations: u32) -> Config {
    Config {
        network: Network::Test,
        wanchain: Wanchain {
            htlc_address: Address::from_str(HTLC_ADDRESS).unwrap(),
            signatures: Signatures {
                lock_notice: Hash::from([0x2b; 32]),
                redeem: Hash::from([0x7e; 32]),
                lock_event: Hash::from_str(LOCK_EVENT_SIGNATURE).unwrap(),
            },
            gas: Gas::default(),
        },
        watch: WatchPolicy {
            confirmations,
            poll_interval: Duration::from_millis(10),
            max_resubscribes: 2,
            resubscribe_delay: Duration::from_millis(10),
        },
        watch_timeout: None,
    }
}

pub fn secret() -> Secret {
    Secret::from(*b"12345678901234567890123456789012")
}

pub fn intent() -> SwapIntent {
    SwapIntent {
        source_address: "my2rhJmHKnLaERhsQ7WVQDcQ97VsFSf2dx".to_owned(),
        destination_address: Address::from_str("0x9abbd236e46eae3ae230f3284d40f9df4ddb677f")
            .unwrap(),
        value: 100_000,
        storeman: Storeman {
            wan: Address::from_str("0x0a81e8be41b21f651a71aab1a85c6813b8bbccf8").unwrap(),
            btc: [0x1B; 20],
        },
        txid: Txid::from_hex("e7b6a13d3b8a6b2e4a5ea0e4d86bb9c6f0d8a1b8d0e4a9b3f5e6c7d8e9fa0b1c")
            .unwrap(),
        vout: 0,
        lock_timestamp: Timestamp::from(1_600_000_000),
        redeem_key: RedeemKey::from_secret(secret()),
    }
}

pub fn block_hash(number: u64) -> Hash {
    let mut hash = [0u8; 32];
    hash[24..].copy_from_slice(&number.to_be_bytes());
    Hash::from(hash)
}

pub fn receipt(transaction_hash: Hash, block_number: u64) -> TransactionReceipt {
    TransactionReceipt {
        transaction_hash,
        block_hash: block_hash(block_number),
        block_number,
        logs: vec![],
        status: 1,
    }
}

/// The storeman's lock event for the swap's secret hash.
pub fn lock_event(block_number: u64, secret_hash_topic: Hash) -> Log {
    Log {
        address: Address::from_str(HTLC_ADDRESS).unwrap(),
        topics: vec![
            Hash::from_str(LOCK_EVENT_SIGNATURE).unwrap(),
            Hash::from([0xaa; 32]),
            Hash::from([0xbb; 32]),
            secret_hash_topic,
        ],
        data: vec![],
        block_hash: block_hash(block_number),
        block_number,
        transaction_hash: Hash::from([0x5e; 32]),
        log_index: 0,
        removed: false,
    }
}
