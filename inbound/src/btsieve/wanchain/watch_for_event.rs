use crate::{
    btsieve::{
        wanchain::{LogFilter, SubscribeLogs},
        ChainHead, WatchPolicy,
    },
    wanchain::{Hash, Log},
};
use anyhow::{anyhow, Context, Result};
use futures::{stream::BoxStream, StreamExt};
use tracing_futures::Instrument;

/// Resolves with the first log matching `filter` that is final according to
/// `policy`.
///
/// Logs are followed through a subscription. A log becomes final once
/// `policy.confirmations` blocks were mined on top of it and its block is
/// still part of the canonical chain. Logs reported as `removed` are
/// forgotten. A subscription that fails or ends is re-established from the
/// highest block observed so far, at most `policy.max_resubscribes` times in
/// a row. A subscription that delivered a new candidate resets the count.
pub async fn watch_for_event<C>(connector: &C, filter: LogFilter, policy: &WatchPolicy) -> Result<Log>
where
    C: SubscribeLogs + ChainHead<BlockHash = Hash>,
{
    let mut candidates = Candidates::default();
    let mut from_block = filter.from_block;
    let mut resubscribes = 0;

    loop {
        let mut progressed = false;
        let outcome = match connector
            .subscribe_logs(&LogFilter {
                from_block,
                ..filter.clone()
            })
            .await
        {
            Ok(subscription) => {
                let span = tracing::debug_span!("subscription", %from_block);
                follow(
                    connector,
                    &filter,
                    policy,
                    subscription,
                    &mut candidates,
                    &mut from_block,
                    &mut progressed,
                )
                .instrument(span)
                .await
            }
            Err(e) => Err(e),
        };

        let reason = match outcome {
            Ok(Some(log)) => return Ok(log),
            Ok(None) => anyhow!("log subscription ended"),
            Err(e) => e,
        };

        if progressed {
            resubscribes = 0;
        }

        if resubscribes >= policy.max_resubscribes {
            return Err(reason).with_context(|| {
                format!("log subscription dropped after {} resubscriptions", resubscribes)
            });
        }
        resubscribes += 1;

        tracing::warn!(
            "log subscription dropped ({:#}), resubscribing from block {} ({}/{})",
            reason,
            from_block,
            resubscribes,
            policy.max_resubscribes
        );
        tokio::time::sleep(policy.resubscribe_delay).await;
    }
}

/// Follows a single subscription. Returns `Ok(None)` if it ended.
async fn follow<C>(
    connector: &C,
    filter: &LogFilter,
    policy: &WatchPolicy,
    mut subscription: BoxStream<'static, Result<Log>>,
    candidates: &mut Candidates,
    from_block: &mut u64,
    progressed: &mut bool,
) -> Result<Option<Log>>
where
    C: ChainHead<BlockHash = Hash>,
{
    let mut head_poll = tokio::time::interval(policy.poll_interval);

    loop {
        tokio::select! {
            item = subscription.next() => {
                let log = match item {
                    Some(Ok(log)) => log,
                    Some(Err(e)) => return Err(e),
                    None => return Ok(None),
                };

                if !filter.matches(&log) {
                    tracing::trace!("ignoring log not matching the filter");
                    continue;
                }

                if log.removed {
                    tracing::info!(block = log.block_number, "candidate log removed by reorg");
                    candidates.remove(&log);
                    continue;
                }

                if policy.confirmations == 0 {
                    tracing::info!(block = log.block_number, "log matched");
                    return Ok(Some(log));
                }

                *from_block = (*from_block).max(log.block_number);
                if candidates.insert(log) {
                    *progressed = true;
                }

                if let Some(log) = candidates.take_final(connector, policy.confirmations).await? {
                    return Ok(Some(log));
                }
            }
            _ = head_poll.tick(), if !candidates.is_empty() => {
                if let Some(log) = candidates.take_final(connector, policy.confirmations).await? {
                    return Ok(Some(log));
                }
            }
        }
    }
}

/// Matching logs waiting for enough confirmations, ordered by their position
/// in the chain.
#[derive(Debug, Default)]
struct Candidates(Vec<Log>);

impl Candidates {
    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns whether `log` was not known yet.
    fn insert(&mut self, log: Log) -> bool {
        if self.0.iter().any(|candidate| same_log(candidate, &log)) {
            return false;
        }

        self.0.push(log);
        self.0
            .sort_by_key(|candidate| (candidate.block_number, candidate.log_index));

        true
    }

    fn remove(&mut self, log: &Log) {
        self.0.retain(|candidate| !same_log(candidate, log));
    }

    /// Takes the earliest candidate that is deep enough and still canonical.
    /// Deep candidates whose block got replaced are dropped on the way.
    async fn take_final<C>(&mut self, connector: &C, confirmations: u32) -> Result<Option<Log>>
    where
        C: ChainHead<BlockHash = Hash>,
    {
        let head = connector.latest_block_number().await?;

        while let Some(candidate) = self.0.first() {
            if head.saturating_sub(candidate.block_number) < u64::from(confirmations) {
                return Ok(None);
            }

            let canonical = connector.block_hash(candidate.block_number).await?;
            let candidate = self.0.remove(0);

            if canonical == Some(candidate.block_hash) {
                tracing::info!(block = candidate.block_number, head, "log matched and confirmed");
                return Ok(Some(candidate));
            }

            tracing::info!(
                block = candidate.block_number,
                "candidate block is no longer canonical"
            );
        }

        Ok(None)
    }
}

fn same_log(left: &Log, right: &Log) -> bool {
    left.transaction_hash == right.transaction_hash
        && left.log_index == right.log_index
        && left.block_hash == right.block_hash
}
