use crate::{
    btsieve::WatchPolicy,
    config::{file, File, Gas, Signatures, Wanchain},
    wanchain::{Address, Hash, U256, GWEI},
    Network,
};
use anyhow::Context;
use log::LevelFilter;
use std::{str::FromStr, time::Duration};

/// This structs represents the settings as they are used through out the code.
///
/// An optional setting (represented in this struct as an `Option`) has semantic
/// meaning. Contrary to that, many configuration values are optional in the
/// config file but may be replaced by default values when the `Settings` are
/// created from a given `File`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Settings {
    pub network: Network,
    pub wanchain: Wanchain,
    pub watch: Watch,
    pub logging: Logging,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Watch {
    pub policy: WatchPolicy,
    pub timeout: Option<Duration>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Logging {
    pub level: LevelFilter,
    pub structured: bool,
}

impl Default for Logging {
    fn default() -> Self {
        Logging {
            level: LevelFilter::Info,
            structured: false,
        }
    }
}

impl Settings {
    pub fn from_config_file_and_defaults(config_file: File) -> anyhow::Result<Self> {
        let File {
            bitcoin,
            wanchain,
            watch,
            logging,
        } = config_file;

        Ok(Self {
            network: bitcoin
                .and_then(|bitcoin| bitcoin.network)
                .unwrap_or_default(),
            wanchain: wanchain_from_file(wanchain.unwrap_or_default())?,
            watch: {
                let file::Watch {
                    confirmations,
                    poll_interval_secs,
                    max_resubscribes,
                    resubscribe_delay_secs,
                    timeout_secs,
                } = watch.unwrap_or_default();
                let default = WatchPolicy::default();

                Watch {
                    policy: WatchPolicy {
                        confirmations: confirmations.unwrap_or(default.confirmations),
                        poll_interval: poll_interval_secs
                            .map(Duration::from_secs)
                            .unwrap_or(default.poll_interval),
                        max_resubscribes: max_resubscribes.unwrap_or(default.max_resubscribes),
                        resubscribe_delay: resubscribe_delay_secs
                            .map(Duration::from_secs)
                            .unwrap_or(default.resubscribe_delay),
                    },
                    timeout: timeout_secs.map(Duration::from_secs),
                }
            },
            logging: {
                let Logging {
                    level: default_level,
                    structured: default_structured,
                } = Logging::default();
                logging
                    .map(|logging| Logging {
                        level: logging.level.unwrap_or(default_level),
                        structured: logging.structured.unwrap_or(default_structured),
                    })
                    .unwrap_or_default()
            },
        })
    }
}

/// The contract address and signatures are deployment specific, there is no
/// sensible default for them.
fn wanchain_from_file(wanchain: file::Wanchain) -> anyhow::Result<Wanchain> {
    let file::Wanchain {
        htlc_address,
        signatures,
        gas,
    } = wanchain;

    let htlc_address = htlc_address.context("wanchain.htlc_address is not configured")?;
    let htlc_address = Address::from_str(&htlc_address)
        .with_context(|| format!("wanchain.htlc_address {} is invalid", htlc_address))?;

    let file::Signatures {
        lock_notice,
        redeem,
        lock_event,
    } = signatures.unwrap_or_default();
    let signatures = Signatures {
        lock_notice: signature("lock_notice", lock_notice)?,
        redeem: signature("redeem", redeem)?,
        lock_event: signature("lock_event", lock_event)?,
    };

    let default_gas = Gas::default();
    let gas = gas
        .map(|gas| Gas {
            lock_gas_limit: gas.lock_gas_limit.unwrap_or(default_gas.lock_gas_limit),
            redeem_gas_limit: gas.redeem_gas_limit.unwrap_or(default_gas.redeem_gas_limit),
            gas_price: gas
                .gas_price_gwei
                .map(|gwei| U256::from(gwei) * U256::from(GWEI))
                .unwrap_or(default_gas.gas_price),
        })
        .unwrap_or(default_gas);

    Ok(Wanchain {
        htlc_address,
        signatures,
        gas,
    })
}

fn signature(name: &str, value: Option<String>) -> anyhow::Result<Hash> {
    let value = value.with_context(|| format!("wanchain.signatures.{} is not configured", name))?;

    Hash::from_str(&value)
        .with_context(|| format!("wanchain.signatures.{} {} is invalid", name, value))
}

/// The file equivalent of `settings`, every default spelled out.
impl From<Settings> for File {
    fn from(settings: Settings) -> Self {
        let Settings {
            network,
            wanchain:
                Wanchain {
                    htlc_address,
                    signatures,
                    gas,
                },
            watch: Watch { policy, timeout },
            logging: Logging { level, structured },
        } = settings;

        File {
            bitcoin: Some(file::Bitcoin {
                network: Some(network),
            }),
            wanchain: Some(file::Wanchain {
                htlc_address: Some(format!("{:#x}", htlc_address)),
                signatures: Some(file::Signatures {
                    lock_notice: Some(format!("{:#x}", signatures.lock_notice)),
                    redeem: Some(format!("{:#x}", signatures.redeem)),
                    lock_event: Some(format!("{:#x}", signatures.lock_event)),
                }),
                gas: Some(file::Gas {
                    lock_gas_limit: Some(gas.lock_gas_limit),
                    redeem_gas_limit: Some(gas.redeem_gas_limit),
                    gas_price_gwei: Some((gas.gas_price / U256::from(GWEI)).low_u64()),
                }),
            }),
            watch: Some(file::Watch {
                confirmations: Some(policy.confirmations),
                poll_interval_secs: Some(policy.poll_interval.as_secs()),
                max_resubscribes: Some(policy.max_resubscribes),
                resubscribe_delay_secs: Some(policy.resubscribe_delay.as_secs()),
                timeout_secs: timeout.map(|timeout| timeout.as_secs()),
            }),
            logging: Some(file::Logging {
                level: Some(level),
                structured: Some(structured),
            }),
        }
    }
}
