use inbound::Timestamp;
use std::path::PathBuf;

#[derive(structopt::StructOpt, Debug)]
pub struct Options {
    /// Path to configuration file
    #[structopt(short = "c", long = "config", parse(from_os_str))]
    pub config_file: PathBuf,

    /// Dump the effective configuration and exit
    #[structopt(long = "dump-config")]
    pub dump_config: bool,

    #[structopt(subcommand)]
    pub cmd: Option<Command>,
}

#[derive(structopt::StructOpt, Debug)]
pub enum Command {
    /// Print the source ledger HTLC script and its P2SH address
    Htlc {
        /// Swap intent as a JSON file
        #[structopt(parse(from_os_str))]
        intent: PathBuf,
    },
    /// Print the Wanchain call announcing the source ledger lock
    Lock {
        #[structopt(parse(from_os_str))]
        intent: PathBuf,
    },
    /// Print the Wanchain call revealing the secret
    Redeem {
        #[structopt(parse(from_os_str))]
        intent: PathBuf,
    },
    /// Print a signed transaction revoking the source ledger HTLC
    Revoke {
        #[structopt(parse(from_os_str))]
        intent: PathBuf,

        /// Hex encoded HTLC redeem script
        #[structopt(long = "redeem-script")]
        redeem_script: String,

        /// WIF encoded private key of the revoker
        #[structopt(long = "wif")]
        wif: String,

        /// Fee in satoshi deducted from the HTLC value
        #[structopt(long = "fee")]
        fee: u64,

        /// Median time past of the source ledger, defaults to the local clock
        #[structopt(long = "now")]
        now: Option<u32>,
    },
}

impl Command {
    pub fn now(now: Option<u32>) -> Timestamp {
        now.map(Timestamp::from).unwrap_or_else(Timestamp::now)
    }
}
