use crate::{bitcoin::PubkeyHash, Error, Network, SecretHash, Timestamp};
use bitcoin::{
    blockdata::{opcodes::all::*, script::Builder},
    Address, Script,
};

/// A P2SH hash time locked contract on the source ledger.
///
/// The redeem branch pays the destination key holder presenting `x` with
/// `SHA-256(x) == xHash`, the revoke branch pays the revoker once the absolute
/// lock timestamp has passed (enforced by `OP_CHECKLOCKTIMEVERIFY`).
#[derive(Clone, Debug, PartialEq)]
pub struct Htlc {
    secret_hash: SecretHash,
    lock_timestamp: Timestamp,
    destination: PubkeyHash,
    revoker: PubkeyHash,
    script: Script,
}

impl Htlc {
    pub fn new(
        secret_hash: SecretHash,
        lock_timestamp: Timestamp,
        destination: PubkeyHash,
        revoker: PubkeyHash,
    ) -> Result<Htlc, Error> {
        let lock_timestamp = lock_timestamp.ensure_lock_time()?;
        let script = create_htlc(&secret_hash, lock_timestamp, &destination, &revoker);

        tracing::debug!("bitcoin htlc script: {}", script);

        Ok(Htlc {
            secret_hash,
            lock_timestamp,
            destination,
            revoker,
            script,
        })
    }

    /// Parses a redeem script back into its parameters.
    ///
    /// Only scripts byte-for-byte identical to what [`Htlc::new`] produces are
    /// accepted, a script we did not build could hide a different spending
    /// condition.
    pub fn from_script(script: &Script) -> Result<Htlc, Error> {
        let bytes = script.as_bytes();
        let invalid = || Error::InvalidScript(format!("not an inbound htlc: {}", script));

        // OP_IF OP_SHA256 PUSH32 <xHash> OP_EQUALVERIFY OP_DUP OP_HASH160 PUSH20 <dest>
        // OP_ELSE PUSHn <locktime> ...
        const LOCKTIME_LENGTH_AT: usize = 60;

        let locktime_length = *bytes.get(LOCKTIME_LENGTH_AT).ok_or_else(invalid)? as usize;
        if locktime_length == 0 || locktime_length > 5 {
            return Err(invalid());
        }
        let locktime = bytes
            .get(LOCKTIME_LENGTH_AT + 1..LOCKTIME_LENGTH_AT + 1 + locktime_length)
            .ok_or_else(invalid)?;
        let lock_timestamp = decode_script_number(locktime).ok_or_else(invalid)?;

        let revoker_at = LOCKTIME_LENGTH_AT + 1 + locktime_length + 5;
        let secret_hash = SecretHash::from_vec(bytes.get(3..35).ok_or_else(invalid)?)?;
        let destination = to_pubkey_hash(bytes.get(39..59).ok_or_else(invalid)?);
        let revoker = to_pubkey_hash(bytes.get(revoker_at..revoker_at + 20).ok_or_else(invalid)?);

        let htlc = Htlc::new(secret_hash, lock_timestamp, destination, revoker)?;

        if &htlc.script != script {
            return Err(invalid());
        }

        Ok(htlc)
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn secret_hash(&self) -> SecretHash {
        self.secret_hash
    }

    pub fn lock_timestamp(&self) -> Timestamp {
        self.lock_timestamp
    }

    pub fn destination(&self) -> PubkeyHash {
        self.destination
    }

    pub fn revoker(&self) -> PubkeyHash {
        self.revoker
    }

    pub fn compute_address(&self, network: Network) -> Address {
        Address::p2sh(&self.script, network.into())
    }
}

fn create_htlc(
    secret_hash: &SecretHash,
    lock_timestamp: Timestamp,
    destination: &PubkeyHash,
    revoker: &PubkeyHash,
) -> Script {
    Builder::new()
        .push_opcode(OP_IF)
        .push_opcode(OP_SHA256)
        .push_slice(secret_hash.as_raw())
        .push_opcode(OP_EQUALVERIFY)
        .push_opcode(OP_DUP)
        .push_opcode(OP_HASH160)
        .push_slice(destination)
        .push_opcode(OP_ELSE)
        .push_int(i64::from(lock_timestamp))
        .push_opcode(OP_CLTV)
        .push_opcode(OP_DROP)
        .push_opcode(OP_DUP)
        .push_opcode(OP_HASH160)
        .push_slice(revoker)
        .push_opcode(OP_ENDIF)
        .push_opcode(OP_EQUALVERIFY)
        .push_opcode(OP_CHECKSIG)
        .into_script()
}

/// Decodes a minimally encoded, positive script number that fits a lock time.
fn decode_script_number(bytes: &[u8]) -> Option<Timestamp> {
    let (last, _) = bytes.split_last()?;
    if last & 0x80 != 0 {
        return None;
    }

    let value = bytes
        .iter()
        .rev()
        .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte));

    if value > u64::from(u32::MAX) {
        return None;
    }

    #[allow(clippy::cast_possible_truncation)]
    Some(Timestamp::from(value as u32))
}

fn to_pubkey_hash(bytes: &[u8]) -> PubkeyHash {
    let mut hash = [0u8; 20];
    hash.copy_from_slice(bytes);
    hash
}
