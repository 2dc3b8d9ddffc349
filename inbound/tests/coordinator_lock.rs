pub mod wanchain_helper;

use inbound::{
    submit::ClientEvent,
    wanchain::{Hash, TransactionReceipt},
    Coordinator, Error, ErrorKind, Notification, RedeemKey, SecretHash, SwapState,
};
use spectral::prelude::*;
use std::{sync::Arc, time::Duration};
use tokio::sync::mpsc;
use wanchain_helper::{config, intent, lock_event, receipt, WanchainConnectorMock};

const LOCK_TX: [u8; 32] = [0x10; 32];

fn secret_hash_topic() -> Hash {
    Hash::from(intent().redeem_key.secret_hash)
}

fn labels(notifications: &[Notification]) -> Vec<String> {
    notifications.iter().map(ToString::to_string).collect()
}

async fn drain(mut receiver: mpsc::UnboundedReceiver<Notification>) -> Vec<Notification> {
    let mut notifications = Vec::new();
    while let Some(notification) = receiver.recv().await {
        notifications.push(notification);
    }

    notifications
}

fn mined_lock(connector: &WanchainConnectorMock) {
    connector.respond_to_next_transaction(vec![
        Ok(ClientEvent::TransactionHash(Hash::from(LOCK_TX))),
        Ok(ClientEvent::Receipt(receipt(Hash::from(LOCK_TX), 10))),
    ]);
}

#[tokio::test]
async fn lock_resolves_once_storeman_locked() {
    let connector = Arc::new(WanchainConnectorMock::new(12));
    mined_lock(&connector);
    connector.add_subscription(vec![lock_event(11, secret_hash_topic())], false);

    let coordinator = Coordinator::new(Arc::clone(&connector), config(1));
    let (sender, receiver) = mpsc::unbounded_channel();

    let log = coordinator.lock(intent(), sender).await.unwrap();
    let notifications = drain(receiver).await;

    assert_eq!(log, lock_event(11, secret_hash_topic()));
    assert_eq!(labels(&notifications), vec!["starting", "lockHash", "locked"]);
    assert_eq!(notifications[0], Notification::Starting {
        secret_hash: intent().redeem_key.secret_hash
    });
    assert_eq!(notifications[1], Notification::LockHash {
        hash: Hash::from(LOCK_TX)
    });
    assert_eq!(notifications[2], Notification::Locked {
        receipt: receipt(Hash::from(LOCK_TX), 10)
    });
}

#[tokio::test]
async fn watch_starts_at_the_lock_receipt_block_and_filters_on_secret_hash() {
    let connector = Arc::new(WanchainConnectorMock::new(12));
    mined_lock(&connector);
    connector.add_subscription(vec![lock_event(11, secret_hash_topic())], false);

    let coordinator = Coordinator::new(Arc::clone(&connector), config(1));
    let (sender, _receiver) = mpsc::unbounded_channel();
    coordinator.lock(intent(), sender).await.unwrap();

    let filters = connector.subscribed_filters();
    assert_that(&filters).has_length(1);
    assert_eq!(filters[0].from_block, 10);
    assert_eq!(filters[0].topics[1], None);
    assert_eq!(filters[0].topics[2], None);
    assert_eq!(filters[0].topics[3].map(|topic| topic.0), Some(secret_hash_topic()));
}

#[tokio::test]
async fn lock_events_of_other_swaps_are_ignored() {
    let connector = Arc::new(WanchainConnectorMock::new(20));
    mined_lock(&connector);
    let other_swap = lock_event(11, Hash::from([0xee; 32]));
    let our_swap = lock_event(12, secret_hash_topic());
    connector.add_subscription(vec![other_swap, our_swap.clone()], false);

    let coordinator = Coordinator::new(Arc::clone(&connector), config(1));
    let (sender, _receiver) = mpsc::unbounded_channel();

    let log = coordinator.lock(intent(), sender).await.unwrap();

    assert_eq!(log, our_swap);
}

#[tokio::test]
async fn rejected_lock_fails_once_and_never_watches() {
    let connector = Arc::new(WanchainConnectorMock::new(12));
    connector.respond_to_next_transaction(vec![Err("nonce too low".to_owned())]);

    let coordinator = Coordinator::new(Arc::clone(&connector), config(1));
    let (sender, receiver) = mpsc::unbounded_channel();

    let result = coordinator.lock(intent(), sender).await;
    let notifications = drain(receiver).await;

    assert!(matches!(result, Err(Error::SubmissionFailure(_))));
    assert_eq!(labels(&notifications), vec!["starting", "error"]);
    match &notifications[1] {
        Notification::Error {
            kind,
            state,
            message,
        } => {
            assert_eq!(*kind, ErrorKind::SubmissionFailure);
            assert_eq!(*state, SwapState::LockSubmitted);
            assert!(message.contains("nonce too low"));
        }
        other => panic!("expected an error notification, got {:?}", other),
    }
    assert_that(&connector.subscribed_filters()).is_empty();
    assert_that(&connector.sent_transactions()).has_length(1);
}

#[tokio::test]
async fn reverted_lock_is_a_submission_failure() {
    let connector = Arc::new(WanchainConnectorMock::new(12));
    connector.respond_to_next_transaction(vec![Ok(ClientEvent::Receipt(TransactionReceipt {
        status: 0,
        ..receipt(Hash::from(LOCK_TX), 10)
    }))]);

    let coordinator = Coordinator::new(Arc::clone(&connector), config(1));
    let handle = coordinator.spawn_lock(intent());
    let state = handle.state.clone();

    let result = handle.outcome().await.unwrap();

    assert!(matches!(result, Err(Error::SubmissionFailure(_))));
    assert_eq!(*state.borrow(), SwapState::Failed);
    assert_that(&connector.subscribed_filters()).is_empty();
}

#[tokio::test]
async fn mismatching_key_fails_before_anything_is_sent() {
    let connector = Arc::new(WanchainConnectorMock::new(12));
    let mut intent = intent();
    intent.redeem_key = RedeemKey {
        secret: intent.redeem_key.secret,
        secret_hash: SecretHash::from([0x42; 32]),
    };

    let coordinator = Coordinator::new(Arc::clone(&connector), config(1));
    let (sender, receiver) = mpsc::unbounded_channel();

    let result = coordinator.lock(intent, sender).await;
    let notifications = drain(receiver).await;

    assert!(matches!(result, Err(Error::KeyMismatch { .. })));
    assert_eq!(labels(&notifications), vec!["error"]);
    assert_that(&connector.sent_transactions()).is_empty();
}

#[tokio::test]
async fn lock_fails_with_watch_timeout_if_storeman_never_locks() {
    let connector = Arc::new(WanchainConnectorMock::new(12));
    mined_lock(&connector);
    connector.add_subscription(vec![], false);

    let config = inbound::Config {
        watch_timeout: Some(Duration::from_millis(50)),
        ..config(1)
    };
    let coordinator = Coordinator::new(Arc::clone(&connector), config);
    let (sender, receiver) = mpsc::unbounded_channel();

    let result = coordinator.lock(intent(), sender).await;
    let notifications = drain(receiver).await;

    assert!(matches!(result, Err(Error::WatchTimeout(_))));
    assert_eq!(labels(&notifications), vec![
        "starting", "lockHash", "locked", "error"
    ]);
    assert!(matches!(
        notifications[3],
        Notification::Error {
            kind: ErrorKind::WatchTimeout,
            state: SwapState::LockConfirmed,
            ..
        }
    ));
}

#[tokio::test]
async fn lock_fails_with_watch_failure_once_resubscribes_are_exhausted() {
    let connector = Arc::new(WanchainConnectorMock::new(12));
    mined_lock(&connector);
    for _ in 0..3 {
        connector.add_subscription(vec![], true);
    }

    let coordinator = Coordinator::new(Arc::clone(&connector), config(1));
    let (sender, receiver) = mpsc::unbounded_channel();

    let result = coordinator.lock(intent(), sender).await;
    let notifications = drain(receiver).await;

    assert!(matches!(result, Err(Error::WatchFailure(_))));
    assert_eq!(labels(&notifications), vec![
        "starting", "lockHash", "locked", "error"
    ]);
    assert!(matches!(
        notifications[3],
        Notification::Error {
            kind: ErrorKind::WatchFailure,
            state: SwapState::LockConfirmed,
            ..
        }
    ));
    assert_that(&connector.subscribed_filters()).has_length(3);
}

#[tokio::test]
async fn aborting_stops_watching_but_keeps_the_lock_submitted() {
    let connector = Arc::new(WanchainConnectorMock::new(12));
    mined_lock(&connector);
    connector.add_subscription(vec![], false);

    let coordinator = Coordinator::new(Arc::clone(&connector), config(1));
    let mut handle = coordinator.spawn_lock(intent());

    while *handle.state.borrow() != SwapState::LockConfirmed {
        handle.state.changed().await.unwrap();
    }
    handle.abort();

    assert!(handle.outcome().await.is_none());
    assert_that(&connector.sent_transactions()).has_length(1);
}

#[tokio::test]
async fn concurrent_swaps_do_not_interfere() {
    let connector = Arc::new(WanchainConnectorMock::new(12));
    mined_lock(&connector);
    mined_lock(&connector);
    connector.add_subscription(vec![lock_event(11, secret_hash_topic())], false);
    connector.add_subscription(vec![lock_event(11, secret_hash_topic())], false);

    let coordinator = Coordinator::new(Arc::clone(&connector), config(1));
    let first = coordinator.spawn_lock(intent());
    let second = coordinator.spawn_lock(intent());

    let (first, second) = futures::join!(first.outcome(), second.outcome());

    assert_that(&first.unwrap()).is_ok();
    assert_that(&second.unwrap()).is_ok();
    assert_that(&connector.sent_transactions()).has_length(2);
}
