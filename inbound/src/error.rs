use crate::{coordinator::SwapState, timestamp::Timestamp, SecretHash};

/// Coarse classification of everything that can go wrong during a swap
/// attempt.
///
/// Every terminal failure notification carries one of these so callers can
/// decide on a policy (retry, revoke, alert) without matching on the full
/// error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    KeyMismatch,
    SubmissionFailure,
    WatchTimeout,
    WatchFailure,
    TimeoutNotElapsed,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid key: {0}")]
    InvalidKey(String),
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    #[error("invalid script: {0}")]
    InvalidScript(String),
    #[error("invalid signature: {0}")]
    InvalidSignature(String),
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    #[error("secret hash mismatch: expected {expected:x}, got {got:x}")]
    KeyMismatch {
        expected: SecretHash,
        got: SecretHash,
    },
    #[error("transaction submission failed")]
    SubmissionFailure(#[source] anyhow::Error),
    #[error("no matching event observed within {0:?}")]
    WatchTimeout(std::time::Duration),
    #[error("watching for event failed")]
    WatchFailure(#[source] anyhow::Error),
    #[error("timelock {lock_timestamp} has not elapsed, chain time is {now}")]
    TimeoutNotElapsed {
        lock_timestamp: Timestamp,
        now: Timestamp,
    },
    #[error("illegal transition from {from} to {to}")]
    IllegalTransition { from: SwapState, to: SwapState },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidKey(_)
            | Error::InvalidTimestamp(_)
            | Error::InvalidAddress(_)
            | Error::InvalidScript(_)
            | Error::InvalidSignature(_)
            | Error::InvalidAmount(_)
            | Error::IllegalTransition { .. } => ErrorKind::Validation,
            Error::KeyMismatch { .. } => ErrorKind::KeyMismatch,
            Error::SubmissionFailure(_) => ErrorKind::SubmissionFailure,
            Error::WatchTimeout(_) => ErrorKind::WatchTimeout,
            Error::WatchFailure(_) => ErrorKind::WatchFailure,
            Error::TimeoutNotElapsed { .. } => ErrorKind::TimeoutNotElapsed,
        }
    }
}
