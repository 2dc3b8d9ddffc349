//! Sending transactions to the destination ledger and normalising whatever
//! the client reports into a well-behaved lifecycle.

use crate::{
    actions::CallContract,
    wanchain::{Hash, TransactionReceipt},
};
use futures::{stream::BoxStream, Stream, StreamExt};
use genawaiter::sync::Gen;

/// What a web3 style client reports about a transaction it sent.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    TransactionHash(Hash),
    Receipt(TransactionReceipt),
}

/// A destination ledger client able to sign and send transactions.
pub trait SendTransaction: Send + Sync + 'static {
    fn send_transaction(
        &self,
        transaction: CallContract,
    ) -> BoxStream<'static, anyhow::Result<ClientEvent>>;
}

/// The lifecycle of one submitted transaction.
///
/// `HashKnown` is emitted at most once and always before `Confirmed`. Every
/// lifecycle ends with exactly one `Confirmed` or `Failed`.
#[derive(Debug, strum_macros::Display)]
pub enum TransactionEvent {
    HashKnown(Hash),
    Confirmed(TransactionReceipt),
    Failed(anyhow::Error),
}

/// Submits `transaction` once. Nothing is ever resent, whatever goes wrong
/// ends up as the single terminal `Failed` event.
pub fn submit<C>(client: &C, transaction: CallContract) -> impl Stream<Item = TransactionEvent> + '_
where
    C: SendTransaction,
{
    Gen::new(move |co| async move {
        let mut events = client.send_transaction(transaction);
        let mut known_hash = None;

        loop {
            match events.next().await {
                Some(Ok(ClientEvent::TransactionHash(hash))) => match known_hash {
                    None => {
                        known_hash = Some(hash);
                        co.yield_(TransactionEvent::HashKnown(hash)).await;
                    }
                    Some(known) if known != hash => {
                        tracing::warn!("client reported a second hash {:x}, ignoring it", hash);
                    }
                    Some(_) => {}
                },
                Some(Ok(ClientEvent::Receipt(receipt))) => {
                    if known_hash.is_none() {
                        co.yield_(TransactionEvent::HashKnown(receipt.transaction_hash))
                            .await;
                    }

                    if receipt.is_status_ok() {
                        co.yield_(TransactionEvent::Confirmed(receipt)).await;
                    } else {
                        co.yield_(TransactionEvent::Failed(anyhow::anyhow!(
                            "transaction {:x} was mined in block {} but failed",
                            receipt.transaction_hash,
                            receipt.block_number
                        )))
                        .await;
                    }
                    return;
                }
                Some(Err(e)) => {
                    co.yield_(TransactionEvent::Failed(e)).await;
                    return;
                }
                None => {
                    co.yield_(TransactionEvent::Failed(anyhow::anyhow!(
                        "client stopped reporting before the transaction was mined"
                    )))
                    .await;
                    return;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wanchain::{Address, Bytes, U256};
    use futures::stream;

    struct ScriptedClient(Vec<anyhow::Result<ClientEvent>>);

    impl SendTransaction for ScriptedClient {
        fn send_transaction(
            &self,
            _: CallContract,
        ) -> BoxStream<'static, anyhow::Result<ClientEvent>> {
            let events = self
                .0
                .iter()
                .map(|event| match event {
                    Ok(event) => Ok(event.clone()),
                    Err(e) => Err(anyhow::anyhow!("{}", e)),
                })
                .collect::<Vec<_>>();

            stream::iter(events).boxed()
        }
    }

    fn transaction() -> CallContract {
        CallContract {
            from: Address::from([1u8; 20]),
            to: Address::from([2u8; 20]),
            data: Bytes(vec![]),
            value: None,
            gas_limit: 21_000,
            gas_price: U256::from(1),
        }
    }

    fn receipt(status: u8) -> TransactionReceipt {
        TransactionReceipt {
            transaction_hash: Hash::from([7u8; 32]),
            block_number: 5,
            status,
            ..TransactionReceipt::default()
        }
    }

    async fn run(events: Vec<anyhow::Result<ClientEvent>>) -> Vec<String> {
        let client = ScriptedClient(events);

        submit(&client, transaction())
            .map(|event| event.to_string())
            .collect()
            .await
    }

    #[tokio::test]
    async fn hash_precedes_confirmation() {
        let events = run(vec![
            Ok(ClientEvent::TransactionHash(Hash::from([7u8; 32]))),
            Ok(ClientEvent::Receipt(receipt(1))),
        ])
        .await;

        assert_eq!(events, vec!["HashKnown", "Confirmed"]);
    }

    #[tokio::test]
    async fn missing_hash_is_taken_from_receipt() {
        let events = run(vec![Ok(ClientEvent::Receipt(receipt(1)))]).await;

        assert_eq!(events, vec!["HashKnown", "Confirmed"]);
    }

    #[tokio::test]
    async fn repeated_hash_is_reported_once() {
        let events = run(vec![
            Ok(ClientEvent::TransactionHash(Hash::from([7u8; 32]))),
            Ok(ClientEvent::TransactionHash(Hash::from([7u8; 32]))),
            Ok(ClientEvent::Receipt(receipt(1))),
        ])
        .await;

        assert_eq!(events, vec!["HashKnown", "Confirmed"]);
    }

    #[tokio::test]
    async fn reverted_transaction_fails() {
        let events = run(vec![
            Ok(ClientEvent::TransactionHash(Hash::from([7u8; 32]))),
            Ok(ClientEvent::Receipt(receipt(0))),
        ])
        .await;

        assert_eq!(events, vec!["HashKnown", "Failed"]);
    }

    #[tokio::test]
    async fn nothing_is_reported_after_terminal_event() {
        let events = run(vec![
            Ok(ClientEvent::TransactionHash(Hash::from([7u8; 32]))),
            Err(anyhow::anyhow!("connection reset")),
            Ok(ClientEvent::Receipt(receipt(1))),
        ])
        .await;

        assert_eq!(events, vec!["HashKnown", "Failed"]);
    }

    #[tokio::test]
    async fn rejected_submission_fails_without_hash() {
        let events = run(vec![Err(anyhow::anyhow!("insufficient funds for gas"))]).await;

        assert_eq!(events, vec!["Failed"]);
    }

    #[tokio::test]
    async fn stream_ending_early_fails() {
        let events = run(vec![Ok(ClientEvent::TransactionHash(Hash::from([7u8; 32])))]).await;

        assert_eq!(events, vec!["HashKnown", "Failed"]);
    }
}
