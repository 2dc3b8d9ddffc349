use crate::{Error, Secret, SecretHash};
use serde::{Deserialize, Serialize};

/// The `(x, xHash)` pair binding the HTLCs on both ledgers together.
///
/// The secret is optional: the party that did not generate it only knows the
/// commitment until it is revealed on-chain. Nothing here checks that the two
/// halves agree on construction because keys usually arrive from outside
/// (config, RPC, a peer); every builder calls [`RedeemKey::validate`] instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedeemKey {
    #[serde(rename = "x", default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<Secret>,
    #[serde(rename = "xHash")]
    pub secret_hash: SecretHash,
}

impl RedeemKey {
    pub fn from_secret(secret: Secret) -> Self {
        Self {
            secret: Some(secret),
            secret_hash: secret.hash(),
        }
    }

    pub fn from_secret_hash(secret_hash: SecretHash) -> Self {
        Self {
            secret: None,
            secret_hash,
        }
    }

    /// Parses a key from its hex representation, failing before anything
    /// else happens if either half is malformed.
    pub fn from_hex(secret: Option<&str>, secret_hash: &str) -> Result<Self, Error> {
        let secret = secret.map(str::parse::<Secret>).transpose()?;
        let secret_hash = secret_hash.parse::<SecretHash>()?;

        Ok(Self {
            secret,
            secret_hash,
        })
    }

    /// Asserts `H(x) == xHash` if `x` is known.
    pub fn validate(&self) -> Result<(), Error> {
        match self.secret {
            Some(secret) if secret.hash() != self.secret_hash => Err(Error::KeyMismatch {
                expected: self.secret_hash,
                got: secret.hash(),
            }),
            _ => Ok(()),
        }
    }

    /// Asserts that this key belongs to a swap that previously committed to
    /// `committed`.
    pub fn verify_commitment(&self, committed: &SecretHash) -> Result<(), Error> {
        self.validate()?;

        if &self.secret_hash != committed {
            return Err(Error::KeyMismatch {
                expected: *committed,
                got: self.secret_hash,
            });
        }

        Ok(())
    }

    /// Returns `x`, failing if this party does not (yet) know it.
    pub fn revealed_secret(&self) -> Result<Secret, Error> {
        self.validate()?;

        self.secret.ok_or_else(|| {
            Error::InvalidKey(format!(
                "secret for {} is unknown, it cannot be revealed",
                self.secret_hash
            ))
        })
    }
}
