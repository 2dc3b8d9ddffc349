use crate::{
    bitcoin::{p2pkh_script, Htlc},
    Error, Timestamp,
};
use bitcoin::{
    blockdata::{opcodes::all::OP_PUSHBYTES_0, script::Builder},
    hashes::{hash160, Hash},
    secp256k1::{self, Message, Secp256k1, Signature},
    OutPoint, PrivateKey, PublicKey, Script, SigHashType, Transaction, TxIn, TxOut,
};

/// Enables `nLockTime` without opting into replace-by-fee.
pub const SEQUENCE_ALLOW_NTIMELOCK_NO_RBF: u32 = 0xFFFF_FFFE;

/// The two ways of authorising a revoke.
#[derive(Debug, Clone, Copy)]
pub enum RevokeSigner {
    /// A signature produced externally over [`UnsignedRevoke::sighash`].
    Signature {
        signature: Signature,
        public_key: PublicKey,
    },
    PrivateKey(PrivateKey),
}

impl RevokeSigner {
    pub fn from_wif(wif: &str) -> Result<Self, Error> {
        let key = PrivateKey::from_wif(wif)
            .map_err(|e| Error::InvalidKey(format!("invalid WIF private key: {}", e)))?;

        Ok(RevokeSigner::PrivateKey(key))
    }

    /// Parses a DER encoded signature, with or without trailing sighash
    /// type, together with the public key that produced it.
    pub fn from_der(signature: &[u8], public_key: &[u8]) -> Result<Self, Error> {
        let signature = match signature.split_last() {
            Some((sighash_type, der)) if *sighash_type == SigHashType::All.as_u32() as u8 => {
                Signature::from_der(der).or_else(|_| Signature::from_der(signature))
            }
            _ => Signature::from_der(signature),
        }
        .map_err(|e| Error::InvalidSignature(e.to_string()))?;

        let public_key = PublicKey::from_slice(public_key)
            .map_err(|e| Error::InvalidKey(format!("invalid public key: {}", e)))?;

        Ok(RevokeSigner::Signature {
            signature,
            public_key,
        })
    }
}

/// A transaction spending the HTLC through its timelocked branch, lacking
/// only the revoker's signature.
#[derive(Debug, Clone, PartialEq)]
pub struct UnsignedRevoke {
    htlc: Htlc,
    transaction: Transaction,
}

impl UnsignedRevoke {
    /// Builds the revoke of `htlc_output` (holding `value` satoshis) paying
    /// `value - fee` back to the revoker.
    ///
    /// `now` is the current chain time (median time past). The transaction
    /// is only final once it is strictly past the lock timestamp, so any
    /// earlier construction fails with [`Error::TimeoutNotElapsed`].
    pub fn new(
        htlc: Htlc,
        htlc_output: OutPoint,
        value: u64,
        fee: u64,
        now: Timestamp,
    ) -> Result<Self, Error> {
        let lock_timestamp = htlc.lock_timestamp();
        if !lock_timestamp.has_elapsed_at(now) {
            return Err(Error::TimeoutNotElapsed {
                lock_timestamp,
                now,
            });
        }

        if fee >= value {
            return Err(Error::InvalidAmount(format!(
                "fee of {} sat leaves nothing of the {} sat locked",
                fee, value
            )));
        }

        let transaction = Transaction {
            version: 2,
            lock_time: u32::from(lock_timestamp),
            input: vec![TxIn {
                previous_output: htlc_output,
                script_sig: Script::new(),
                sequence: SEQUENCE_ALLOW_NTIMELOCK_NO_RBF,
                witness: Vec::new(),
            }],
            output: vec![TxOut {
                value: value - fee,
                script_pubkey: p2pkh_script(&htlc.revoker()),
            }],
        };

        Ok(UnsignedRevoke { htlc, transaction })
    }

    /// The legacy `SIGHASH_ALL` digest the revoker has to sign.
    pub fn sighash(&self) -> [u8; 32] {
        self.transaction
            .signature_hash(0, self.htlc.script(), SigHashType::All.as_u32())
            .into_inner()
    }

    pub fn sign(self, signer: RevokeSigner) -> Result<Transaction, Error> {
        match signer {
            RevokeSigner::Signature {
                signature,
                public_key,
            } => self.finalize(signature, public_key),
            RevokeSigner::PrivateKey(key) => self.sign_with_private_key(&key),
        }
    }

    pub fn sign_with_private_key(self, key: &PrivateKey) -> Result<Transaction, Error> {
        let secp = Secp256k1::signing_only();
        let message = self.message()?;

        let signature = secp.sign(&message, &key.key);
        let public_key = key.public_key(&secp);

        self.finalize(signature, public_key)
    }

    /// Attaches an externally produced signature.
    ///
    /// The signature is verified against [`UnsignedRevoke::sighash`] and the
    /// public key has to hash to the revoker committed to in the HTLC,
    /// otherwise the script interpreter would reject the spend.
    pub fn finalize(
        mut self,
        signature: Signature,
        public_key: PublicKey,
    ) -> Result<Transaction, Error> {
        let public_key_bytes = public_key.to_bytes();
        let pubkey_hash = hash160::Hash::hash(&public_key_bytes).into_inner();
        if pubkey_hash != self.htlc.revoker() {
            return Err(Error::InvalidKey(format!(
                "public key hashes to {}, htlc revoker is {}",
                hex::encode(pubkey_hash),
                hex::encode(self.htlc.revoker())
            )));
        }

        let secp = Secp256k1::verification_only();
        secp.verify(&self.message()?, &signature, &public_key.key)
            .map_err(|e| Error::InvalidSignature(e.to_string()))?;

        let mut serialized_signature = signature.serialize_der().to_vec();
        serialized_signature.push(SigHashType::All.as_u32() as u8);

        self.transaction.input[0].script_sig = Builder::new()
            .push_slice(&serialized_signature)
            .push_slice(&public_key_bytes)
            .push_opcode(OP_PUSHBYTES_0)
            .push_slice(self.htlc.script().as_bytes())
            .into_script();

        Ok(self.transaction)
    }

    fn message(&self) -> Result<Message, Error> {
        Message::from_slice(&self.sighash())
            .map_err(|e: secp256k1::Error| Error::InvalidSignature(e.to_string()))
    }
}
