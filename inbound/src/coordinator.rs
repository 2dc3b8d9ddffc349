//! Drives one swap attempt through its states, reporting progress as typed
//! notifications.

use crate::{
    bitcoin::RevokeSigner,
    btsieve::{
        wanchain::{watch_for_event, SubscribeLogs},
        ChainHead,
    },
    config::Config,
    submit::{submit, SendTransaction, TransactionEvent},
    swap::{build_lock_action, build_lock_filter, build_redeem_action, build_revoke, SwapIntent},
    wanchain::{Hash, Log, TransactionReceipt},
    Error, ErrorKind, SecretHash, Timestamp,
};
use ::bitcoin::{Script, Transaction, Txid};
use async_trait::async_trait;
use futures::StreamExt;
use std::{fmt, sync::Arc};
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tracing_futures::Instrument;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SwapState {
    Start,
    LockSubmitted,
    LockConfirmed,
    RedeemSubmitted,
    Redeemed,
    Timeout,
    RevokeSubmitted,
    Revoked,
    Done,
    Failed,
}

impl SwapState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SwapState::Done | SwapState::Failed)
    }

    /// The legal edges of the swap state machine.
    ///
    /// Revocation is never automatic: `Timeout` is entered explicitly by a
    /// caller who observed the lock timestamp passing. A settled redeem or
    /// revoke can only move on to `Done`.
    pub fn transition(self, to: SwapState) -> Result<SwapState, Error> {
        use SwapState::*;

        let legal = match (self, to) {
            (Start, LockSubmitted)
            | (LockSubmitted, LockConfirmed)
            | (LockConfirmed, RedeemSubmitted)
            | (RedeemSubmitted, Redeemed)
            | (LockSubmitted, Timeout)
            | (LockConfirmed, Timeout)
            | (Timeout, RevokeSubmitted)
            | (RevokeSubmitted, Revoked)
            | (Redeemed, Done)
            | (Revoked, Done) => true,
            (Redeemed, Failed) | (Revoked, Failed) => false,
            (from, Failed) => !from.is_terminal(),
            _ => false,
        };

        if legal {
            Ok(to)
        } else {
            Err(Error::IllegalTransition { from: self, to })
        }
    }
}

/// Progress of a swap attempt, in the order it happens.
#[derive(Clone, Debug, PartialEq, strum_macros::Display)]
pub enum Notification {
    #[strum(serialize = "starting")]
    Starting { secret_hash: SecretHash },
    #[strum(serialize = "lockHash")]
    LockHash { hash: Hash },
    #[strum(serialize = "locked")]
    Locked { receipt: TransactionReceipt },
    #[strum(serialize = "redeemHash")]
    RedeemHash { hash: Hash },
    #[strum(serialize = "redeemed")]
    Redeemed { receipt: TransactionReceipt },
    #[strum(serialize = "error")]
    Error {
        kind: ErrorKind,
        state: SwapState,
        message: String,
    },
}

/// A source ledger client able to relay a signed transaction.
#[async_trait]
pub trait BroadcastTransaction: Send + Sync + 'static {
    async fn broadcast(&self, transaction: Transaction) -> anyhow::Result<Txid>;
}

/// A swap attempt running in the background.
///
/// Aborting only stops observing, a transaction that was already submitted
/// stays submitted.
#[derive(Debug)]
pub struct SwapHandle<T> {
    pub notifications: mpsc::UnboundedReceiver<Notification>,
    pub state: watch::Receiver<SwapState>,
    pub join: JoinHandle<Result<T, Error>>,
}

impl<T> SwapHandle<T> {
    pub fn abort(&self) {
        self.join.abort();
    }

    /// Waits for the attempt to finish, `None` if it was aborted.
    pub async fn outcome(self) -> Option<Result<T, Error>> {
        match self.join.await {
            Ok(outcome) => Some(outcome),
            Err(e) if e.is_cancelled() => None,
            Err(e) => std::panic::resume_unwind(e.into_panic()),
        }
    }
}

/// Runs swap attempts against shared destination ledger clients.
///
/// Attempts share nothing but the read-only client and configuration, any
/// number of them can run concurrently.
pub struct Coordinator<C> {
    client: Arc<C>,
    config: Arc<Config>,
}

impl<C> Clone for Coordinator<C> {
    fn clone(&self) -> Self {
        Coordinator {
            client: Arc::clone(&self.client),
            config: Arc::clone(&self.config),
        }
    }
}

impl<C> fmt::Debug for Coordinator<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coordinator")
            .field("config", &self.config)
            .finish()
    }
}

impl<C> Coordinator<C> {
    pub fn new(client: Arc<C>, config: Config) -> Self {
        Coordinator {
            client,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Builds the signed revoke of the source ledger HTLC.
    ///
    /// `now` is the source ledger's current median time past, the revoke is
    /// refused unless it is past the intent's lock timestamp.
    pub fn build_revoke_transaction(
        &self,
        intent: &SwapIntent,
        redeem_script: &Script,
        signer: RevokeSigner,
        fee: u64,
        now: Timestamp,
    ) -> Result<Transaction, Error> {
        intent.validate(self.config.network)?;

        build_revoke(intent, redeem_script, signer, fee, now)
    }

    /// Takes the source ledger funds back after the timelock expired.
    ///
    /// Returns once the broadcast was accepted, following the revoke until
    /// it is buried is left to the caller.
    pub async fn revoke<B>(
        &self,
        broadcaster: &B,
        intent: &SwapIntent,
        redeem_script: &Script,
        signer: RevokeSigner,
        fee: u64,
        now: Timestamp,
    ) -> Result<Txid, Error>
    where
        B: BroadcastTransaction,
    {
        let mut attempt = Attempt::new(SwapState::Timeout, None, None);
        let span = tracing::info_span!("revoke", secret_hash = %intent.redeem_key.secret_hash);

        let outcome = async {
            let transaction =
                self.build_revoke_transaction(intent, redeem_script, signer, fee, now)?;
            attempt.advance(SwapState::RevokeSubmitted)?;

            let txid = broadcaster
                .broadcast(transaction)
                .await
                .map_err(Error::SubmissionFailure)?;
            tracing::info!("revoke transaction {} broadcast", txid);

            attempt.advance(SwapState::Revoked)?;
            attempt.advance(SwapState::Done)?;

            Ok::<_, Error>(txid)
        }
        .instrument(span)
        .await;

        outcome.map_err(|e| attempt.fail(e))
    }
}

impl<C> Coordinator<C>
where
    C: SendTransaction + SubscribeLogs + ChainHead<BlockHash = Hash>,
{
    /// Announces the source ledger lock on the destination ledger and waits
    /// for the storeman's reciprocal lock.
    ///
    /// Emits `starting`, `lockHash` and `locked`, then resolves with the
    /// storeman's lock event.
    pub async fn lock(
        &self,
        intent: SwapIntent,
        notifications: mpsc::UnboundedSender<Notification>,
    ) -> Result<Log, Error> {
        self.run_lock(intent, Attempt::new(SwapState::Start, Some(notifications), None))
            .await
    }

    /// Reveals the secret on the destination ledger, assuming the storeman's
    /// lock was already observed.
    ///
    /// Emits `starting`, `redeemHash` and `redeemed`.
    pub async fn redeem(
        &self,
        intent: SwapIntent,
        notifications: mpsc::UnboundedSender<Notification>,
    ) -> Result<TransactionReceipt, Error> {
        self.run_redeem(
            intent,
            Attempt::new(SwapState::LockConfirmed, Some(notifications), None),
        )
        .await
    }

    pub fn spawn_lock(&self, intent: SwapIntent) -> SwapHandle<Log> {
        let coordinator = self.clone();

        spawn(SwapState::Start, move |attempt| async move {
            coordinator.run_lock(intent, attempt).await
        })
    }

    pub fn spawn_redeem(&self, intent: SwapIntent) -> SwapHandle<TransactionReceipt> {
        let coordinator = self.clone();

        spawn(SwapState::LockConfirmed, move |attempt| async move {
            coordinator.run_redeem(intent, attempt).await
        })
    }

    async fn run_lock(&self, intent: SwapIntent, mut attempt: Attempt) -> Result<Log, Error> {
        let span = tracing::info_span!("lock", secret_hash = %intent.redeem_key.secret_hash);

        let outcome = async {
            let action = build_lock_action(&intent, &self.config)?;

            attempt.advance(SwapState::LockSubmitted)?;
            attempt.notify(Notification::Starting {
                secret_hash: intent.redeem_key.secret_hash,
            });

            let receipt = self
                .submit(
                    action,
                    &mut attempt,
                    |hash| Notification::LockHash { hash },
                    |receipt| Notification::Locked { receipt },
                    SwapState::LockConfirmed,
                )
                .await?;

            let filter = build_lock_filter(&intent, &self.config, receipt.block_number);
            let log = self.watch(filter).await?;
            tracing::info!(
                "storeman locked in transaction {:x}",
                log.transaction_hash
            );

            Ok::<_, Error>(log)
        }
        .instrument(span)
        .await;

        outcome.map_err(|e| attempt.fail(e))
    }

    async fn run_redeem(
        &self,
        intent: SwapIntent,
        mut attempt: Attempt,
    ) -> Result<TransactionReceipt, Error> {
        let span = tracing::info_span!("redeem", secret_hash = %intent.redeem_key.secret_hash);

        let outcome = async {
            let action = build_redeem_action(&intent, &self.config)?;

            attempt.advance(SwapState::RedeemSubmitted)?;
            attempt.notify(Notification::Starting {
                secret_hash: intent.redeem_key.secret_hash,
            });

            let receipt = self
                .submit(
                    action,
                    &mut attempt,
                    |hash| Notification::RedeemHash { hash },
                    |receipt| Notification::Redeemed { receipt },
                    SwapState::Redeemed,
                )
                .await?;
            attempt.advance(SwapState::Done)?;

            Ok::<_, Error>(receipt)
        }
        .instrument(span)
        .await;

        outcome.map_err(|e| attempt.fail(e))
    }

    async fn submit(
        &self,
        action: crate::actions::CallContract,
        attempt: &mut Attempt,
        hash_known: fn(Hash) -> Notification,
        confirmed: fn(TransactionReceipt) -> Notification,
        confirmed_state: SwapState,
    ) -> Result<TransactionReceipt, Error> {
        let events = submit(self.client.as_ref(), action);
        futures::pin_mut!(events);

        while let Some(event) = events.next().await {
            match event {
                TransactionEvent::HashKnown(hash) => {
                    tracing::info!("transaction {:x} submitted", hash);
                    attempt.notify(hash_known(hash));
                }
                TransactionEvent::Confirmed(receipt) => {
                    tracing::info!(
                        "transaction {:x} mined in block {}",
                        receipt.transaction_hash,
                        receipt.block_number
                    );
                    attempt.advance(confirmed_state)?;
                    attempt.notify(confirmed(receipt.clone()));

                    return Ok(receipt);
                }
                TransactionEvent::Failed(e) => return Err(Error::SubmissionFailure(e)),
            }
        }

        Err(Error::SubmissionFailure(anyhow::anyhow!(
            "transaction lifecycle ended without an outcome"
        )))
    }

    async fn watch(&self, filter: crate::btsieve::wanchain::LogFilter) -> Result<Log, Error> {
        let span = tracing::debug_span!("watch", from_block = filter.from_block);
        let watch = watch_for_event(self.client.as_ref(), filter, &self.config.watch)
            .instrument(span);

        let outcome = match self.config.watch_timeout {
            Some(timeout) => tokio::time::timeout(timeout, watch)
                .await
                .map_err(|_| Error::WatchTimeout(timeout))?,
            None => watch.await,
        };

        outcome.map_err(Error::WatchFailure)
    }
}

fn spawn<T, F, Fut>(initial: SwapState, run: F) -> SwapHandle<T>
where
    T: Send + 'static,
    F: FnOnce(Attempt) -> Fut,
    Fut: std::future::Future<Output = Result<T, Error>> + Send + 'static,
{
    let (notifications_sender, notifications) = mpsc::unbounded_channel();
    let (state_sender, state) = watch::channel(initial);

    let attempt = Attempt::new(initial, Some(notifications_sender), Some(state_sender));
    let join = tokio::spawn(run(attempt).in_current_span());

    SwapHandle {
        notifications,
        state,
        join,
    }
}

/// The mutable state owned by exactly one swap attempt.
#[derive(Debug)]
struct Attempt {
    state: SwapState,
    notifications: Option<mpsc::UnboundedSender<Notification>>,
    states: Option<watch::Sender<SwapState>>,
}

impl Attempt {
    fn new(
        state: SwapState,
        notifications: Option<mpsc::UnboundedSender<Notification>>,
        states: Option<watch::Sender<SwapState>>,
    ) -> Self {
        Attempt {
            state,
            notifications,
            states,
        }
    }

    fn advance(&mut self, to: SwapState) -> Result<(), Error> {
        self.state = self.state.transition(to)?;
        tracing::debug!("swap state is now {}", self.state);

        if let Some(states) = &self.states {
            // Nobody observing the state is fine.
            let _ = states.send(self.state);
        }

        Ok(())
    }

    fn notify(&self, notification: Notification) {
        if let Some(notifications) = &self.notifications {
            let _ = notifications.send(notification);
        }
    }

    /// Reports `error` as the attempt's single terminal failure.
    fn fail(&mut self, error: Error) -> Error {
        tracing::error!("swap failed in state {}: {}", self.state, describe(&error));

        self.notify(Notification::Error {
            kind: error.kind(),
            state: self.state,
            message: describe(&error),
        });

        if self.advance(SwapState::Failed).is_err() {
            tracing::warn!("cannot fail a swap in state {}", self.state);
        }

        error
    }
}

fn describe(error: &Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);

    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    message
}
