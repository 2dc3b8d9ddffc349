use crate::Error;
use serde::{Deserialize, Serialize};
use std::{fmt, time::SystemTime};

/// Lock times from here on are unix timestamps, below are block heights.
pub const LOCKTIME_THRESHOLD: u32 = 500_000_000;

/// An exact time and date used to represent absolute timelocks, in seconds
/// since the unix epoch.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Timestamp(u32);

impl Timestamp {
    // This will work for the next 20 years
    #[allow(clippy::cast_possible_truncation)]
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|duration| duration.as_secs())
            .unwrap_or_default();

        Timestamp(secs as u32)
    }

    pub fn plus(self, seconds: u32) -> Self {
        Self(self.0.saturating_add(seconds))
    }

    pub fn minus(self, seconds: u32) -> Self {
        Self(self.0.saturating_sub(seconds))
    }

    /// Rejects values bitcoin would not read as a unix timestamp.
    ///
    /// `nLockTime` and `OP_CHECKLOCKTIMEVERIFY` operands below
    /// [`LOCKTIME_THRESHOLD`] are block heights. Lock times are never
    /// clamped, a caller that computed such a value has a bug.
    pub fn ensure_lock_time(self) -> Result<Self, Error> {
        if self.0 < LOCKTIME_THRESHOLD {
            return Err(Error::InvalidTimestamp(format!(
                "lock timestamp {} is below {} and would be read as a block height",
                self.0, LOCKTIME_THRESHOLD
            )));
        }

        Ok(self)
    }

    /// Whether a transaction with this lock time is final at chain time
    /// `now`. Consensus requires the lock time to be strictly below the
    /// median time past.
    pub fn has_elapsed_at(self, now: Timestamp) -> bool {
        now.0 > self.0
    }
}

/// The u32 input is the number of seconds since epoch
impl From<u32> for Timestamp {
    fn from(item: u32) -> Self {
        Self(item)
    }
}

/// The u32 returned is the number of seconds since epoch
impl From<Timestamp> for u32 {
    fn from(item: Timestamp) -> Self {
        item.0
    }
}

/// The i64 returned is the number of seconds since epoch
impl From<Timestamp> for i64 {
    fn from(item: Timestamp) -> Self {
        i64::from(item.0)
    }
}

impl From<Timestamp> for u64 {
    fn from(item: Timestamp) -> Self {
        u64::from(item.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
