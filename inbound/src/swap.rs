//! The inbound BTC to WAN swap: the parameters of one attempt and the pure
//! builders deriving every transaction and filter from them.

use crate::{
    actions::CallContract,
    bitcoin::{self, address_to_hash160, Htlc, PubkeyHash, RevokeSigner, UnsignedRevoke},
    btsieve::wanchain::{LogFilter, Topic},
    config::Config,
    encoding::{bytes20_word, number_word},
    wanchain::{Address, Bytes, Hash},
    Error, Network, RedeemKey, Timestamp,
};
use ::bitcoin::{hashes::Hash as _, OutPoint, Script, Transaction, Txid};
use serde::{Deserialize, Serialize};
use serde_hex::{SerHex, StrictPfx};

/// The counterparty custodying the destination side of the swap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Storeman {
    pub wan: Address,
    #[serde(with = "SerHex::<StrictPfx>")]
    pub btc: PubkeyHash,
}

/// The parameters of one swap attempt, immutable once submitted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapIntent {
    /// P2PKH address that funded the source HTLC and may revoke it.
    pub source_address: String,
    /// Account receiving the wrapped asset on the destination ledger.
    pub destination_address: Address,
    /// Satoshis locked in the source HTLC.
    pub value: u64,
    pub storeman: Storeman,
    /// The source ledger transaction funding the HTLC.
    pub txid: Txid,
    #[serde(default)]
    pub vout: u32,
    pub lock_timestamp: Timestamp,
    pub redeem_key: RedeemKey,
}

impl SwapIntent {
    /// Catches malformed intents before anything touches the network.
    pub fn validate(&self, network: Network) -> Result<(), Error> {
        self.redeem_key.validate()?;
        self.lock_timestamp.ensure_lock_time()?;
        address_to_hash160(&self.source_address, network)?;

        if self.value == 0 {
            return Err(Error::InvalidAmount("cannot swap 0 satoshi".to_owned()));
        }

        Ok(())
    }

    fn txid_in_display_order(&self) -> [u8; 32] {
        let mut txid = self.txid.into_inner();
        txid.reverse();
        txid
    }
}

/// `lock_notice(storeman, from_hash160, xHash, txid, lock_timestamp)` on the
/// destination HTLC contract, announcing the source ledger lock.
pub fn build_lock_action(intent: &SwapIntent, config: &Config) -> Result<CallContract, Error> {
    intent.validate(config.network)?;

    let source_hash160 = address_to_hash160(&intent.source_address, config.network)?;

    let mut data = Vec::with_capacity(4 + 5 * 32);
    data.extend_from_slice(&config.wanchain.signatures.lock_notice_selector());
    data.extend_from_slice(&bytes20_word(intent.storeman.wan.as_bytes()));
    data.extend_from_slice(&bytes20_word(&source_hash160));
    data.extend_from_slice(intent.redeem_key.secret_hash.as_raw());
    data.extend_from_slice(&intent.txid_in_display_order());
    data.extend_from_slice(&number_word(u64::from(intent.lock_timestamp)));

    Ok(CallContract {
        from: intent.destination_address,
        to: config.wanchain.htlc_address,
        data: Bytes(data),
        value: None,
        gas_limit: config.wanchain.gas.lock_gas_limit,
        gas_price: config.wanchain.gas.gas_price,
    })
}

/// `redeem(x)` on the destination HTLC contract, revealing the secret.
pub fn build_redeem_action(intent: &SwapIntent, config: &Config) -> Result<CallContract, Error> {
    let secret = intent.redeem_key.revealed_secret()?;

    let mut data = Vec::with_capacity(4 + 32);
    data.extend_from_slice(&config.wanchain.signatures.redeem_selector());
    data.extend_from_slice(secret.as_raw_secret());

    Ok(CallContract {
        from: intent.destination_address,
        to: config.wanchain.htlc_address,
        data: Bytes(data),
        value: None,
        gas_limit: config.wanchain.gas.redeem_gas_limit,
        gas_price: config.wanchain.gas.gas_price,
    })
}

/// Matches the storeman's reciprocal lock event, indexed by `xHash` in the
/// fourth topic, from the block our own lock notice was mined in.
pub fn build_lock_filter(intent: &SwapIntent, config: &Config, from_block: u64) -> LogFilter {
    LogFilter {
        address: config.wanchain.htlc_address,
        topics: vec![
            Some(Topic(config.wanchain.signatures.lock_event)),
            None,
            None,
            Some(Topic(Hash::from(intent.redeem_key.secret_hash))),
        ],
        from_block,
    }
}

/// The source ledger HTLC the swap's bitcoin are locked in.
pub fn build_htlc(
    intent: &SwapIntent,
    destination: PubkeyHash,
    network: Network,
) -> Result<Htlc, Error> {
    intent.redeem_key.validate()?;
    let revoker = bitcoin::address_to_hash160(&intent.source_address, network)?;

    Htlc::new(
        intent.redeem_key.secret_hash,
        intent.lock_timestamp,
        destination,
        revoker,
    )
}

/// Prepares the revoke of the HTLC described by `redeem_script`, which must
/// commit to the intent's `xHash` and lock timestamp.
pub fn build_unsigned_revoke(
    intent: &SwapIntent,
    redeem_script: &Script,
    fee: u64,
    now: Timestamp,
) -> Result<UnsignedRevoke, Error> {
    let htlc = Htlc::from_script(redeem_script)?;
    intent.redeem_key.verify_commitment(&htlc.secret_hash())?;

    if htlc.lock_timestamp() != intent.lock_timestamp {
        return Err(Error::InvalidScript(format!(
            "htlc is locked until {}, swap until {}",
            htlc.lock_timestamp(),
            intent.lock_timestamp
        )));
    }

    UnsignedRevoke::new(
        htlc,
        OutPoint {
            txid: intent.txid,
            vout: intent.vout,
        },
        intent.value,
        fee,
        now,
    )
}

pub fn build_revoke(
    intent: &SwapIntent,
    redeem_script: &Script,
    signer: RevokeSigner,
    fee: u64,
    now: Timestamp,
) -> Result<Transaction, Error> {
    build_unsigned_revoke(intent, redeem_script, fee, now)?.sign(signer)
}
