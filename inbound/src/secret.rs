use crate::{encoding::strip_hex_prefix, Error, SecretHash};
use bitcoin::hashes::{sha256, Hash};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

/// The preimage `x` whose hash is committed to on both ledgers.
///
/// Revealing it is what unlocks the HTLCs, hence `Debug` never prints it.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Secret([u8; Self::LENGTH]);

impl Secret {
    pub const LENGTH: usize = 32;

    pub fn from_vec(vec: &[u8]) -> Result<Secret, Error> {
        if vec.len() != Self::LENGTH {
            return Err(Error::InvalidKey(format!(
                "secret must be {} bytes, got {}",
                Self::LENGTH,
                vec.len()
            )));
        }

        let mut data = [0; Self::LENGTH];
        data.copy_from_slice(vec);

        Ok(Secret(data))
    }

    pub fn hash(&self) -> SecretHash {
        SecretHash::from(sha256::Hash::hash(&self.0).into_inner())
    }

    pub fn as_raw_secret(&self) -> &[u8; Self::LENGTH] {
        &self.0
    }

    pub fn into_raw_secret(self) -> [u8; Self::LENGTH] {
        self.0
    }
}

impl From<[u8; Secret::LENGTH]> for Secret {
    fn from(secret: [u8; Secret::LENGTH]) -> Self {
        Secret(secret)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([REDACTED])")
    }
}

impl fmt::LowerHex for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

impl FromStr for Secret {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let vec = hex::decode(strip_hex_prefix(s))
            .map_err(|e| Error::InvalidKey(format!("secret is not valid hex: {}", e)))?;

        Self::from_vec(&vec)
    }
}

impl Serialize for Secret {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{:x}", self))
    }
}

impl<'de> Deserialize<'de> for Secret {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        Secret::from_str(&s).map_err(|_| {
            de::Error::invalid_value(de::Unexpected::Str(&s), &"a hex encoded 32 byte value")
        })
    }
}
