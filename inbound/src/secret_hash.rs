use crate::{encoding::strip_hex_prefix, Error, Secret};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

/// `SHA-256(x)`, the public commitment embedded in both lock transactions.
#[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct SecretHash([u8; Self::LENGTH]);

impl SecretHash {
    pub const LENGTH: usize = 32;

    pub fn from_vec(vec: &[u8]) -> Result<Self, Error> {
        if vec.len() != Self::LENGTH {
            return Err(Error::InvalidKey(format!(
                "secret hash must be {} bytes, got {}",
                Self::LENGTH,
                vec.len()
            )));
        }

        let mut data = [0; Self::LENGTH];
        data.copy_from_slice(vec);

        Ok(SecretHash(data))
    }

    pub fn as_raw(&self) -> &[u8; Self::LENGTH] {
        &self.0
    }

    pub fn into_raw(self) -> [u8; Self::LENGTH] {
        self.0
    }
}

impl From<[u8; SecretHash::LENGTH]> for SecretHash {
    fn from(hash: [u8; SecretHash::LENGTH]) -> Self {
        SecretHash(hash)
    }
}

impl From<Secret> for SecretHash {
    fn from(secret: Secret) -> Self {
        secret.hash()
    }
}

impl fmt::Debug for SecretHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretHash({:x})", self)
    }
}

impl fmt::Display for SecretHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self)
    }
}

impl fmt::LowerHex for SecretHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

impl FromStr for SecretHash {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let vec = hex::decode(strip_hex_prefix(s))
            .map_err(|e| Error::InvalidKey(format!("secret hash is not valid hex: {}", e)))?;

        Self::from_vec(&vec)
    }
}

impl Serialize for SecretHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{:x}", self))
    }
}

impl<'de> Deserialize<'de> for SecretHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        SecretHash::from_str(&s).map_err(|_| {
            de::Error::invalid_value(de::Unexpected::Str(&s), &"a hex encoded 32 byte value")
        })
    }
}
