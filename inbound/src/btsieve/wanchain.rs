mod watch_for_event;

pub use self::watch_for_event::watch_for_event;
use crate::wanchain::{Address, Hash, Log};
use anyhow::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// A log subscription as offered by web3 clients (`eth_subscribe("logs")`).
#[async_trait]
pub trait SubscribeLogs: Send + Sync + 'static {
    /// Reports historical logs from `filter.from_block` on and then follows
    /// the chain. Logs invalidated by a reorg are reported again with
    /// `removed` set.
    async fn subscribe_logs(&self, filter: &LogFilter) -> Result<BoxStream<'static, Result<Log>>>;
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Topic(pub Hash);

/// LogFilter works similar to web3 filters:
/// https://web3js.readthedocs.io/en/1.0/web3-eth-subscribe.html?highlight=filter#subscribe-logs
/// A `None` topic matches anything.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LogFilter {
    pub address: Address,
    pub topics: Vec<Option<Topic>>,
    pub from_block: u64,
}

impl LogFilter {
    pub fn matches(&self, log: &Log) -> bool {
        if self.topics.is_empty() || self.address != log.address {
            return false;
        }

        if log.block_number < self.from_block || log.topics.len() != self.topics.len() {
            return false;
        }

        log.topics.iter().zip(&self.topics).all(|(log_topic, topic)| {
            topic
                .as_ref()
                .map_or(true, |topic| log_topic == &topic.0)
        })
    }
}
