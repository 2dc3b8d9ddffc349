use async_trait::async_trait;
use futures::{
    stream::{self, BoxStream},
    StreamExt,
};
use inbound::{
    actions::CallContract,
    btsieve::{
        wanchain::{LogFilter, SubscribeLogs},
        ChainHead,
    },
    submit::{ClientEvent, SendTransaction},
    wanchain::{Hash, Log},
};
use std::{
    collections::{HashMap, VecDeque},
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex,
    },
};

/// What a single log subscription reports.
#[derive(Debug, Clone)]
pub struct Subscription {
    pub logs: Vec<Log>,
    /// Whether the subscription ends after its logs instead of waiting for
    /// more.
    pub ends: bool,
}

/// An in-memory Wanchain node.
///
/// Every sent transaction consumes the next scripted client response, every
/// subscription the next scripted log stream. The chain head and its
/// canonical blocks can be changed while a test runs.
#[derive(Debug, Default)]
pub struct WanchainConnectorMock {
    responses: Mutex<VecDeque<Vec<Result<ClientEvent, String>>>>,
    subscriptions: Mutex<VecDeque<Subscription>>,
    sent: Mutex<Vec<CallContract>>,
    filters: Mutex<Vec<LogFilter>>,
    head: AtomicU64,
    canonical: Mutex<HashMap<u64, Hash>>,
}

#[derive(Debug, thiserror::Error)]
#[error("no more subscriptions scripted, either your implementation is buggy or you need a better test setup")]
pub struct OutOfSubscriptions;

impl WanchainConnectorMock {
    pub fn new(head: u64) -> Self {
        let mock = Self::default();
        mock.set_head(head);

        mock
    }

    pub fn respond_to_next_transaction(&self, events: Vec<Result<ClientEvent, String>>) {
        self.responses.lock().unwrap().push_back(events);
    }

    pub fn add_subscription(&self, logs: Vec<Log>, ends: bool) {
        self.subscriptions
            .lock()
            .unwrap()
            .push_back(Subscription { logs, ends });
    }

    /// Moves the head to `number`, making every block up to it canonical.
    pub fn set_head(&self, number: u64) {
        let mut canonical = self.canonical.lock().unwrap();
        for block in 0..=number {
            canonical
                .entry(block)
                .or_insert_with(|| super::block_hash(block));
        }

        self.head.store(number, Ordering::SeqCst);
    }

    pub fn replace_block(&self, number: u64, hash: Hash) {
        self.canonical.lock().unwrap().insert(number, hash);
    }

    pub fn sent_transactions(&self) -> Vec<CallContract> {
        self.sent.lock().unwrap().clone()
    }

    pub fn subscribed_filters(&self) -> Vec<LogFilter> {
        self.filters.lock().unwrap().clone()
    }
}

impl SendTransaction for WanchainConnectorMock {
    fn send_transaction(
        &self,
        transaction: CallContract,
    ) -> BoxStream<'static, anyhow::Result<ClientEvent>> {
        self.sent.lock().unwrap().push(transaction);

        let events = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default()
            .into_iter()
            .map(|event| event.map_err(|e| anyhow::anyhow!(e)))
            .collect::<Vec<_>>();

        stream::iter(events).boxed()
    }
}

#[async_trait]
impl SubscribeLogs for WanchainConnectorMock {
    async fn subscribe_logs(
        &self,
        filter: &LogFilter,
    ) -> anyhow::Result<BoxStream<'static, anyhow::Result<Log>>> {
        self.filters.lock().unwrap().push(filter.clone());

        let Subscription { logs, ends } = self
            .subscriptions
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(OutOfSubscriptions)?;

        let logs = stream::iter(logs.into_iter().map(Ok));

        if ends {
            Ok(logs.boxed())
        } else {
            Ok(logs.chain(stream::pending()).boxed())
        }
    }
}

#[async_trait]
impl ChainHead for WanchainConnectorMock {
    type BlockHash = Hash;

    async fn latest_block_number(&self) -> anyhow::Result<u64> {
        Ok(self.head.load(Ordering::SeqCst))
    }

    async fn block_hash(&self, number: u64) -> anyhow::Result<Option<Hash>> {
        if number > self.head.load(Ordering::SeqCst) {
            return Ok(None);
        }

        Ok(self.canonical.lock().unwrap().get(&number).copied())
    }
}
