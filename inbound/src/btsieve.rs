//! Watching a ledger for the counterparty's side of the swap.

pub mod wanchain;

use async_trait::async_trait;
use std::time::Duration;

/// Access to the current tip of a ledger, used to decide whether an
/// observed event is buried deep enough to be considered final.
#[async_trait]
pub trait ChainHead: Send + Sync + 'static {
    type BlockHash;

    async fn latest_block_number(&self) -> anyhow::Result<u64>;

    /// The hash of the canonical block at `number`, `None` if the chain is
    /// not (or no longer) that long.
    async fn block_hash(&self, number: u64) -> anyhow::Result<Option<Self::BlockHash>>;
}

/// How long to wait for an event to settle and how to deal with a dropped
/// subscription.
///
/// Carries no timeout, callers race the watch against their own deadline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WatchPolicy {
    /// Blocks that must be mined on top of the event's block. Zero accepts
    /// the first matching log as soon as it is reported, which is not safe
    /// against reorgs and only meant for low value swaps.
    pub confirmations: u32,
    /// How often the chain head is polled while candidates are pending.
    pub poll_interval: Duration,
    /// Number of times in a row a failed or ended subscription is
    /// re-established before the watch fails. Any subscription delivering a
    /// new candidate log starts the count afresh.
    pub max_resubscribes: u32,
    pub resubscribe_delay: Duration,
}

impl Default for WatchPolicy {
    fn default() -> Self {
        Self {
            confirmations: 1,
            poll_interval: Duration::from_secs(10),
            max_resubscribes: 5,
            resubscribe_delay: Duration::from_secs(5),
        }
    }
}
