//! Deck session state machine.
//!
//! Pure transition logic: no I/O happens here. [`DeckSession`] feeds events
//! in as operations start and remote responses arrive.
//!
//! # State Diagram
//!
//! ```text
//! ┌───────────────┐ initialize ┌─────────┐  created   ┌─────────┐
//! │ Uninitialized │───────────▶│ Loading │───────────▶│  Ready  │◀─────────┐
//! └───────────────┘            └────┬────┘            └──┬───┬──┘          │
//!         ▲                         │ failed       draw  │   │ reshuffle   │
//!         │                         ▼                    ▼   ▼             │
//!         │                   ┌───────────┐         ┌──────────────┐ drawn │
//!         └───────────────────│  Failed   │◀────────│ Busy(op)     │───────┤
//!            (retry resumes   │(last_good)│ failed  └──────┬───────┘       │
//!             from last_good) └───────────┘                │ depleted      │
//!                                                          ▼               │
//!                                                   ┌───────────┐ shuffled │
//!                                                   │ Exhausted │──────────┘
//!                                                   └───────────┘ (via Busy)
//! ```
//!
//! [`DeckSession`]: super::session::DeckSession

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use super::card::{Card, Deck, DrawnHistory};

/// The remote operation a busy session is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingOp {
    Draw,
    Shuffle,
}

impl PendingOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draw => "draw",
            Self::Shuffle => "shuffle",
        }
    }
}

/// How a failed remote call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Network or connectivity failure, including timeouts
    Transport,
    /// The service answered with a failure, or with something unreadable
    Remote,
}

/// Details of the last failed remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl ErrorInfo {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transport, message)
    }

    pub fn remote(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Remote, message)
    }

    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            at: Utc::now(),
        }
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ErrorKind::Transport => write!(f, "transport error: {}", self.message),
            ErrorKind::Remote => write!(f, "remote error: {}", self.message),
        }
    }
}

/// Status tag of a [`SessionState`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Uninitialized,
    Loading,
    Ready,
    Busy,
    Exhausted,
    Failed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Busy => "busy",
            Self::Exhausted => "exhausted",
            Self::Failed => "failed",
        }
    }

    /// Check if a remote call is outstanding.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Loading | Self::Busy)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the session knows, as one tagged value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No deck requested yet
    #[default]
    Uninitialized,

    /// Deck creation in flight
    Loading,

    /// Deck available for drawing
    Ready { deck: Deck, history: DrawnHistory },

    /// A draw or shuffle is in flight
    Busy {
        deck: Deck,
        history: DrawnHistory,
        pending: PendingOp,
        /// Whether the deck was depleted when the operation started
        from_exhausted: bool,
    },

    /// Provider reported no cards left
    Exhausted { deck: Deck, history: DrawnHistory },

    /// Last call failed; `last_good` is where a retry resumes from
    Failed {
        last_good: Box<SessionState>,
        error: ErrorInfo,
    },
}

/// Inputs to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    // Operations requested by the caller
    Initialize,
    Draw,
    Reshuffle,

    // Outcomes of the outstanding remote call
    DeckCreated(Deck),
    CardDrawn { card: Card, remaining: u32 },
    DeckDepleted,
    DeckShuffled { remaining: u32 },
    CallFailed(ErrorInfo),
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::Draw => "draw",
            Self::Reshuffle => "reshuffle",
            Self::DeckCreated(_) => "deck_created",
            Self::CardDrawn { .. } => "card_drawn",
            Self::DeckDepleted => "deck_depleted",
            Self::DeckShuffled { .. } => "deck_shuffled",
            Self::CallFailed(_) => "call_failed",
        }
    }
}

/// Error when an event is not allowed in the current state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition from {from} via {event}: {reason}")]
pub struct InvalidTransition {
    pub from: SessionStatus,
    pub event: &'static str,
    pub reason: &'static str,
}

impl SessionState {
    pub fn status(&self) -> SessionStatus {
        match self {
            Self::Uninitialized => SessionStatus::Uninitialized,
            Self::Loading => SessionStatus::Loading,
            Self::Ready { .. } => SessionStatus::Ready,
            Self::Busy { .. } => SessionStatus::Busy,
            Self::Exhausted { .. } => SessionStatus::Exhausted,
            Self::Failed { .. } => SessionStatus::Failed,
        }
    }

    /// Apply an event, returning the new state or an error.
    pub fn apply(&self, event: &SessionEvent) -> Result<Self, InvalidTransition> {
        use SessionEvent::*;
        use SessionState::*;

        let invalid = |reason: &'static str| InvalidTransition {
            from: self.status(),
            event: event.name(),
            reason,
        };

        match (self, event) {
            // Failed is a checkpoint: operations behave as in last_good
            (Failed { last_good, .. }, Initialize | SessionEvent::Draw | Reshuffle) => {
                last_good.apply(event)
            }

            // Busy guard
            (Loading | Busy { .. }, Initialize | SessionEvent::Draw | Reshuffle) => {
                Err(invalid("Another operation is in flight"))
            }

            // Initialize: Uninitialized -> Loading
            (Uninitialized, Initialize) => Ok(Loading),
            (_, Initialize) => Err(invalid("Deck already initialized")),

            // Draw: Ready -> Busy(Draw)
            (Ready { deck, history }, SessionEvent::Draw) => Ok(Busy {
                deck: deck.clone(),
                history: history.clone(),
                pending: PendingOp::Draw,
                from_exhausted: false,
            }),
            (Exhausted { .. }, SessionEvent::Draw) => Err(invalid("Deck is exhausted")),
            (_, SessionEvent::Draw) => Err(invalid("Deck not initialized")),

            // Reshuffle: Ready/Exhausted -> Busy(Shuffle)
            (Ready { deck, history }, Reshuffle) => Ok(Busy {
                deck: deck.clone(),
                history: history.clone(),
                pending: PendingOp::Shuffle,
                from_exhausted: false,
            }),
            (Exhausted { deck, history }, Reshuffle) => Ok(Busy {
                deck: deck.clone(),
                history: history.clone(),
                pending: PendingOp::Shuffle,
                from_exhausted: true,
            }),
            (_, Reshuffle) => Err(invalid("Deck not initialized")),

            // Loading completes
            (Loading, DeckCreated(deck)) => Ok(Ready {
                deck: deck.clone(),
                history: DrawnHistory::new(),
            }),
            (Loading, CallFailed(error)) => Ok(Failed {
                last_good: Box::new(Uninitialized),
                error: error.clone(),
            }),

            // Draw completes
            (
                Busy {
                    deck,
                    history,
                    pending: PendingOp::Draw,
                    ..
                },
                CardDrawn { card, remaining },
            ) => Ok(Ready {
                deck: deck.with_remaining(*remaining),
                history: history.appended(card.clone()),
            }),
            (
                Busy {
                    deck,
                    history,
                    pending: PendingOp::Draw,
                    ..
                },
                DeckDepleted,
            ) => Ok(Exhausted {
                deck: deck.with_remaining(0),
                history: history.clone(),
            }),

            // Shuffle completes
            (
                Busy {
                    deck,
                    pending: PendingOp::Shuffle,
                    ..
                },
                DeckShuffled { remaining },
            ) => Ok(Ready {
                deck: deck.reshuffled(*remaining),
                history: DrawnHistory::new(),
            }),

            // Any call fails: keep the state from before the call
            (Busy { .. }, CallFailed(error)) => Ok(Failed {
                last_good: Box::new(self.settled()),
                error: error.clone(),
            }),

            (_, DeckCreated(_) | CardDrawn { .. } | DeckDepleted | DeckShuffled { .. } | CallFailed(_)) => {
                Err(invalid("No matching operation in flight"))
            }
        }
    }

    /// Apply an event in place, returning error if invalid.
    pub fn apply_mut(&mut self, event: &SessionEvent) -> Result<(), InvalidTransition> {
        *self = self.apply(event)?;
        Ok(())
    }

    /// The state a busy session returns to if its call fails.
    fn settled(&self) -> Self {
        match self {
            Self::Busy {
                deck,
                history,
                from_exhausted: true,
                ..
            } => Self::Exhausted {
                deck: deck.clone(),
                history: history.clone(),
            },
            Self::Busy { deck, history, .. } => Self::Ready {
                deck: deck.clone(),
                history: history.clone(),
            },
            other => other.clone(),
        }
    }

    /// The state operations are judged against (`last_good` when failed).
    pub fn effective(&self) -> &Self {
        match self {
            Self::Failed { last_good, .. } => last_good.effective(),
            other => other,
        }
    }

    pub fn deck(&self) -> Option<&Deck> {
        match self.effective() {
            Self::Ready { deck, .. } | Self::Busy { deck, .. } | Self::Exhausted { deck, .. } => {
                Some(deck)
            }
            _ => None,
        }
    }

    /// Drawn cards, empty before the first deck.
    pub fn history(&self) -> &[Card] {
        match self.effective() {
            Self::Ready { history, .. }
            | Self::Busy { history, .. }
            | Self::Exhausted { history, .. } => history.cards(),
            _ => &[],
        }
    }

    pub fn pending(&self) -> Option<PendingOp> {
        match self {
            Self::Busy { pending, .. } => Some(*pending),
            _ => None,
        }
    }

    pub fn last_error(&self) -> Option<&ErrorInfo> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn can_draw(&self) -> bool {
        matches!(self.effective(), Self::Ready { .. })
    }

    pub fn can_shuffle(&self) -> bool {
        matches!(self.effective(), Self::Ready { .. } | Self::Exhausted { .. })
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "Uninitialized"),
            Self::Loading => write!(f, "Loading"),
            Self::Ready { deck, history } => {
                write!(f, "Ready({}, {} drawn)", deck.id, history.len())
            }
            Self::Busy { deck, pending, .. } => {
                write!(f, "Busy({}, {})", deck.id, pending.as_str())
            }
            Self::Exhausted { deck, history } => {
                write!(f, "Exhausted({}, {} drawn)", deck.id, history.len())
            }
            Self::Failed { last_good, error } => write!(f, "Failed({}, {})", last_good, error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::card::DeckId;
    use pretty_assertions::assert_eq;

    fn ready(drawn: usize) -> SessionState {
        let mut history = DrawnHistory::new();
        for i in 0..drawn {
            history = history.appended(Card::new(format!("C{}", i), "CLUBS X", ""));
        }
        SessionState::Ready {
            deck: Deck::new(DeckId::new("abc"), 52 - drawn as u32),
            history,
        }
    }

    fn card(code: &str) -> Card {
        Card::new(code, "SPADES ACE", "img")
    }

    #[test]
    fn test_initial_state() {
        let state = SessionState::default();
        assert_eq!(state.status(), SessionStatus::Uninitialized);
        assert!(!state.can_draw());
        assert!(!state.can_shuffle());
        assert!(state.history().is_empty());
    }

    #[test]
    fn test_initialize_flow() {
        let mut state = SessionState::default();
        state.apply_mut(&SessionEvent::Initialize).unwrap();
        assert_eq!(state.status(), SessionStatus::Loading);

        let deck = Deck::new(DeckId::new("abc"), 52);
        state.apply_mut(&SessionEvent::DeckCreated(deck.clone())).unwrap();
        assert_eq!(state.status(), SessionStatus::Ready);
        assert_eq!(state.deck(), Some(&deck));
        assert!(state.can_draw());
    }

    #[test]
    fn test_initialize_failure_resumes_from_uninitialized() {
        let mut state = SessionState::Loading;
        state
            .apply_mut(&SessionEvent::CallFailed(ErrorInfo::transport("down")))
            .unwrap();
        assert_eq!(state.status(), SessionStatus::Failed);
        assert!(!state.can_draw());

        // Retry is allowed
        state.apply_mut(&SessionEvent::Initialize).unwrap();
        assert_eq!(state.status(), SessionStatus::Loading);
    }

    #[test]
    fn test_draw_appends_and_refreshes_remaining() {
        let mut state = ready(2);
        state.apply_mut(&SessionEvent::Draw).unwrap();
        assert_eq!(state.pending(), Some(PendingOp::Draw));
        assert!(!state.can_draw());

        state
            .apply_mut(&SessionEvent::CardDrawn {
                card: card("AS"),
                remaining: 49,
            })
            .unwrap();
        assert_eq!(state.status(), SessionStatus::Ready);
        assert_eq!(state.history().len(), 3);
        assert_eq!(state.history()[2].code, "AS");
        assert_eq!(state.deck().map(|d| d.remaining), Some(49));
    }

    #[test]
    fn test_depletion_is_not_failure() {
        let mut state = ready(3);
        state.apply_mut(&SessionEvent::Draw).unwrap();
        state.apply_mut(&SessionEvent::DeckDepleted).unwrap();

        assert_eq!(state.status(), SessionStatus::Exhausted);
        assert_eq!(state.history().len(), 3);
        assert!(state.last_error().is_none());
        assert!(!state.can_draw());
        assert!(state.can_shuffle());

        let err = state.apply(&SessionEvent::Draw).unwrap_err();
        assert_eq!(err.reason, "Deck is exhausted");
    }

    #[test]
    fn test_shuffle_clears_history() {
        let mut state = ready(5);
        state.apply_mut(&SessionEvent::Reshuffle).unwrap();
        state
            .apply_mut(&SessionEvent::DeckShuffled { remaining: 52 })
            .unwrap();
        assert_eq!(state.status(), SessionStatus::Ready);
        assert!(state.history().is_empty());
        assert_eq!(state.deck().map(|d| d.remaining), Some(52));
    }

    #[test]
    fn test_failed_shuffle_from_exhausted_restores_exhausted() {
        let deck = Deck::new(DeckId::new("abc"), 0);
        let history = DrawnHistory::new().appended(card("AS"));
        let mut state = SessionState::Exhausted { deck, history };

        state.apply_mut(&SessionEvent::Reshuffle).unwrap();
        state
            .apply_mut(&SessionEvent::CallFailed(ErrorInfo::remote("boom")))
            .unwrap();

        assert_eq!(state.status(), SessionStatus::Failed);
        assert_eq!(state.effective().status(), SessionStatus::Exhausted);
        assert_eq!(state.history().len(), 1);
        assert!(!state.can_draw());
        assert!(state.can_shuffle());
    }

    #[test]
    fn test_failed_draw_keeps_history_and_allows_retry() {
        let mut state = ready(3);
        state.apply_mut(&SessionEvent::Draw).unwrap();
        state
            .apply_mut(&SessionEvent::CallFailed(ErrorInfo::transport("reset")))
            .unwrap();

        assert_eq!(state.status(), SessionStatus::Failed);
        assert_eq!(state.history().len(), 3);
        assert_eq!(
            state.last_error().map(|e| e.to_string()),
            Some("transport error: reset".to_string())
        );

        state.apply_mut(&SessionEvent::Draw).unwrap();
        assert_eq!(state.status(), SessionStatus::Busy);
        assert_eq!(state.history().len(), 3);
    }

    #[test]
    fn test_busy_guard() {
        let busy = ready(0).apply(&SessionEvent::Draw).unwrap();
        for event in [
            SessionEvent::Draw,
            SessionEvent::Reshuffle,
            SessionEvent::Initialize,
        ] {
            let err = busy.apply(&event).unwrap_err();
            assert_eq!(err.from, SessionStatus::Busy);
            assert_eq!(err.reason, "Another operation is in flight");
        }

        let err = SessionState::Loading.apply(&SessionEvent::Draw).unwrap_err();
        assert_eq!(err.from, SessionStatus::Loading);
    }

    #[test]
    fn test_invalid_transitions() {
        let state = SessionState::Uninitialized;
        assert!(state.apply(&SessionEvent::Draw).is_err());
        assert!(state.apply(&SessionEvent::Reshuffle).is_err());
        assert!(state.apply(&SessionEvent::DeckDepleted).is_err());

        // Initialize only once a deck exists
        assert!(ready(0).apply(&SessionEvent::Initialize).is_err());

        // Shuffle completion while drawing
        let drawing = ready(0).apply(&SessionEvent::Draw).unwrap();
        assert!(drawing
            .apply(&SessionEvent::DeckShuffled { remaining: 52 })
            .is_err());
    }

    #[test]
    fn test_display() {
        let state = ready(2).apply(&SessionEvent::Reshuffle).unwrap();
        assert_eq!(format!("{}", state), "Busy(abc, shuffle)");

        let err = SessionState::Uninitialized
            .apply(&SessionEvent::Draw)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid transition from uninitialized via draw: Deck not initialized"
        );
    }
}
