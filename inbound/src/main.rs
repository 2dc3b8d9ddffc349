#![warn(unused_extern_crates, missing_debug_implementations, rust_2018_idioms)]
#![forbid(unsafe_code)]
#![allow(clippy::print_stdout)] // Printing artifacts is what this binary does.

use anyhow::Context;
use inbound::{
    bitcoin::RevokeSigner,
    config::{self, Settings},
    export::bitcoin::{consensus::encode::serialize_hex, Script},
    swap::{build_htlc, build_lock_action, build_redeem_action, build_revoke},
    Config, SwapIntent,
};
use serde::Serialize;
use std::{fs, path::Path};
use structopt::StructOpt;

mod cli;
mod trace;

use cli::Command;

fn main() -> anyhow::Result<()> {
    let options = cli::Options::from_args();

    let config_file = config::File::read(&options.config_file)
        .with_context(|| format!("failed to read {}", options.config_file.display()))?;

    let settings = Settings::from_config_file_and_defaults(config_file)?;

    if options.dump_config {
        println!("{}", toml::to_string(&config::File::from(settings))?);
        return Ok(());
    }

    trace::init_tracing(settings.logging.level, settings.logging.structured)?;

    let config = Config::from(settings);

    match options.cmd {
        None => tracing::info!("configuration is valid"),
        Some(Command::Htlc { intent }) => {
            let intent = read_intent(&intent, &config)?;
            let htlc = build_htlc(&intent, intent.storeman.btc, config.network)?;

            print_json(&HtlcArtifact {
                redeem_script: hex::encode(htlc.script().as_bytes()),
                address: htlc.compute_address(config.network).to_string(),
            })?;
        }
        Some(Command::Lock { intent }) => {
            let intent = read_intent(&intent, &config)?;
            print_json(&build_lock_action(&intent, &config)?)?;
        }
        Some(Command::Redeem { intent }) => {
            let intent = read_intent(&intent, &config)?;
            print_json(&build_redeem_action(&intent, &config)?)?;
        }
        Some(Command::Revoke {
            intent,
            redeem_script,
            wif,
            fee,
            now,
        }) => {
            let intent = read_intent(&intent, &config)?;
            let redeem_script = hex::decode(redeem_script.trim_start_matches("0x"))
                .map(Script::from)
                .context("redeem script is not valid hex")?;
            let signer = RevokeSigner::from_wif(&wif)?;

            let transaction = build_revoke(
                &intent,
                &redeem_script,
                signer,
                fee,
                Command::now(now),
            )?;
            println!("{}", serialize_hex(&transaction));
        }
    }

    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HtlcArtifact {
    redeem_script: String,
    address: String,
}

fn read_intent(path: &Path, config: &Config) -> anyhow::Result<SwapIntent> {
    let file = fs::File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let intent: SwapIntent = serde_json::from_reader(file)
        .with_context(|| format!("{} is not a swap intent", path.display()))?;
    intent.validate(config.network)?;

    Ok(intent)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);

    Ok(())
}
