use crate::Network;
use config as config_rs;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::{ffi::OsStr, path::Path};

/// This struct aims to represent the configuration file as it appears on disk.
///
/// Most importantly, optional elements of the configuration file are
/// represented as `Option`s` here. This allows us to create a dedicated step
/// for filling in default values for absent configuration options.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct File {
    pub bitcoin: Option<Bitcoin>,
    pub wanchain: Option<Wanchain>,
    pub watch: Option<Watch>,
    pub logging: Option<Logging>,
}

impl File {
    pub fn read<D: AsRef<OsStr>>(config_file: D) -> Result<Self, config_rs::ConfigError> {
        let config_file = Path::new(&config_file);

        let mut config = config_rs::Config::new();
        config.merge(config_rs::File::from(config_file))?;
        config.try_into()
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
pub struct Bitcoin {
    pub network: Option<Network>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Wanchain {
    pub htlc_address: Option<String>,
    pub signatures: Option<Signatures>,
    pub gas: Option<Gas>,
}

/// Hex encoded Keccak-256 hashes, with or without `0x`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Signatures {
    pub lock_notice: Option<String>,
    pub redeem: Option<String>,
    pub lock_event: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Gas {
    pub lock_gas_limit: Option<u64>,
    pub redeem_gas_limit: Option<u64>,
    pub gas_price_gwei: Option<u64>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Watch {
    pub confirmations: Option<u32>,
    pub poll_interval_secs: Option<u64>,
    pub max_resubscribes: Option<u32>,
    pub resubscribe_delay_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
pub struct Logging {
    pub level: Option<LevelFilter>,
    pub structured: Option<bool>,
}
