//! The deck session: drives the state machine with remote calls.
//!
//! All operations take `&self`. The state sits behind a mutex that is held
//! only while an event is applied, never across a remote call. An operation
//! first moves the session into `Loading` or `Busy`; anything started while
//! the session is there is rejected before it reaches the provider.
//! An operation dropped before its call returns fails with a transport error,
//! so the session never stays in flight without a call outstanding.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::machine::{ErrorInfo, InvalidTransition, SessionEvent, SessionState};
use super::snapshot::Snapshot;
use crate::config::SessionConfig;
use crate::remote::{RemoteDeckClient, RemoteOutcome};

/// Error returned by session operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The current state does not allow the operation. No remote call was made.
    #[error("operation rejected: {0}")]
    Rejected(#[from] InvalidTransition),
}

/// Turn a remote outcome into the event that settles the pending operation.
fn settle_event<T>(
    outcome: RemoteOutcome<T>,
    on_ok: impl FnOnce(T) -> SessionEvent,
    on_depleted: impl FnOnce() -> SessionEvent,
) -> SessionEvent {
    match outcome {
        RemoteOutcome::Ok(value) => on_ok(value),
        RemoteOutcome::Depleted => on_depleted(),
        RemoteOutcome::TransportError(detail) => {
            SessionEvent::CallFailed(ErrorInfo::transport(detail))
        }
        RemoteOutcome::RemoteError(detail) => SessionEvent::CallFailed(ErrorInfo::remote(detail)),
    }
}

/// An operation between `begin` and `settle`.
///
/// Dropping it unsettled, when the caller's future is cancelled or a client
/// panics, fails the operation so the session does not stay in flight.
struct InFlight<'a, C: RemoteDeckClient> {
    session: &'a DeckSession<C>,
    op: &'static str,
    state: SessionState,
    settled: bool,
}

impl<C: RemoteDeckClient> InFlight<'_, C> {
    fn settle(mut self, event: SessionEvent) -> Snapshot {
        self.settled = true;
        self.session.settle(event)
    }
}

impl<C: RemoteDeckClient> Drop for InFlight<'_, C> {
    fn drop(&mut self) {
        if !self.settled {
            warn!(op = self.op, "operation dropped before its call settled");
            self.session.settle(SessionEvent::CallFailed(ErrorInfo::transport(
                "operation cancelled",
            )));
        }
    }
}

/// Owner of one remote deck and the cards drawn from it.
#[derive(Debug)]
pub struct DeckSession<C> {
    client: C,
    config: SessionConfig,
    state: Mutex<SessionState>,
    updates: watch::Sender<Snapshot>,
}

impl<C: RemoteDeckClient> DeckSession<C> {
    pub fn new(client: C) -> Self {
        Self::with_config(client, SessionConfig::default())
    }

    pub fn with_config(client: C, config: SessionConfig) -> Self {
        let state = SessionState::default();
        let (updates, _) = watch::channel(Snapshot::from(&state));
        Self {
            client,
            config,
            state: Mutex::new(state),
            updates,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Owned copy of the current state.
    pub fn current_state(&self) -> SessionState {
        self.lock().clone()
    }

    pub fn current_snapshot(&self) -> Snapshot {
        Snapshot::from(&*self.lock())
    }

    /// Receive a snapshot after every state change.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.updates.subscribe()
    }

    /// Create the remote deck.
    ///
    /// Allowed before the first deck exists, including after a failed attempt.
    pub async fn initialize(&self) -> Result<Snapshot, SessionError> {
        let in_flight = self.begin(&SessionEvent::Initialize)?;
        info!("creating shuffled deck");

        let outcome = self
            .bounded("initialize", self.client.create_shuffled_deck())
            .await;
        let event = settle_event(outcome, SessionEvent::DeckCreated, || {
            SessionEvent::CallFailed(ErrorInfo::remote("new deck reported empty"))
        });
        Ok(in_flight.settle(event))
    }

    /// Draw one card from the deck.
    pub async fn draw(&self) -> Result<Snapshot, SessionError> {
        let in_flight = self.begin(&SessionEvent::Draw)?;

        let outcome = match in_flight.state.deck() {
            Some(deck) => self.bounded("draw", self.client.draw_one(&deck.id)).await,
            None => RemoteOutcome::RemoteError("no deck handle".to_string()),
        };
        let event = settle_event(
            outcome,
            |drawn| SessionEvent::CardDrawn {
                card: drawn.card,
                remaining: drawn.remaining,
            },
            || SessionEvent::DeckDepleted,
        );
        Ok(in_flight.settle(event))
    }

    /// Shuffle every card back into the deck.
    ///
    /// The drawn history is cleared only once the provider confirms.
    pub async fn reshuffle(&self) -> Result<Snapshot, SessionError> {
        let in_flight = self.begin(&SessionEvent::Reshuffle)?;

        let outcome = match in_flight.state.deck() {
            Some(deck) => self.bounded("reshuffle", self.client.shuffle(&deck.id)).await,
            None => RemoteOutcome::RemoteError("no deck handle".to_string()),
        };
        let event = settle_event(
            outcome,
            |shuffled| SessionEvent::DeckShuffled {
                remaining: shuffled.remaining,
            },
            || SessionEvent::CallFailed(ErrorInfo::remote("shuffle reported an empty deck")),
        );
        Ok(in_flight.settle(event))
    }

    /// Check-and-set into `Loading`/`Busy`.
    fn begin(&self, event: &SessionEvent) -> Result<InFlight<'_, C>, SessionError> {
        let mut state = self.lock();
        if let Err(err) = state.apply_mut(event) {
            warn!(op = event.name(), status = %err.from, reason = err.reason, "operation rejected");
            return Err(err.into());
        }
        let current: &SessionState = &state;
        debug!(op = event.name(), state = %current, "operation started");
        self.updates.send_replace(Snapshot::from(&*state));
        Ok(InFlight {
            session: self,
            op: event.name(),
            state: state.clone(),
            settled: false,
        })
    }

    /// Apply the outcome of the outstanding call and publish the result.
    fn settle(&self, event: SessionEvent) -> Snapshot {
        let mut state = self.lock();
        match state.apply_mut(&event) {
            Ok(()) => match &*state {
                SessionState::Failed { error, .. } => {
                    warn!(event = event.name(), %error, "deck operation failed")
                }
                SessionState::Exhausted { deck, history } => {
                    info!(deck_id = %deck.id, drawn = history.len(), "deck exhausted")
                }
                other => debug!(event = event.name(), state = %other, "operation settled"),
            },
            Err(err) => error!(%err, "remote outcome did not match session state"),
        }

        let snapshot = Snapshot::from(&*state);
        self.updates.send_replace(snapshot.clone());
        snapshot
    }

    /// Run a remote call, bounded by the configured operation timeout.
    async fn bounded<T>(
        &self,
        op: &'static str,
        call: impl Future<Output = RemoteOutcome<T>>,
    ) -> RemoteOutcome<T> {
        let Some(limit) = self.config.operation_timeout else {
            return call.await;
        };
        match tokio::time::timeout(limit, call).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(op, ?limit, "deck operation timed out");
                RemoteOutcome::TransportError(format!("no response within {:?}", limit))
            }
        }
    }
}
