//! Deck Session Library
//!
//! This crate manages a session against a remote, stateful deck of cards: it
//! creates a shuffled deck, draws cards one at a time and reshuffles on
//! demand, keeping the drawn cards in order for display.
//!
//! # Overview
//!
//! - **Session State Machine** - One tagged `SessionState` decides what may
//!   happen next. Invalid operations are rejected before any remote call.
//!
//! - **Busy Guard** - At most one draw or shuffle is in flight. A second
//!   operation started meanwhile is rejected, not queued.
//!
//! - **Remote Client** - `RemoteDeckClient` maps every provider response into
//!   a closed outcome: success, depleted deck, transport error or remote error.
//!
//! - **Snapshots** - Immutable views with derived `can_draw`/`can_shuffle`,
//!   published to subscribers on every change.
//!
//! # Design Principles
//!
//! 1. **An empty deck is not an error** - Depletion moves the session to
//!    `Exhausted`; only failed calls move it to `Failed`.
//!
//! 2. **Failures keep good state** - `Failed` remembers the state before the
//!    call, and retrying resumes from there without losing drawn cards.
//!
//! 3. **Serialization-ready** - Snapshots serialize to JSON for clients.
//!
//! # Example
//!
//! ```rust
//! use deck_session::state::{Card, Deck, DeckId, SessionEvent, SessionState, SessionStatus};
//!
//! let mut state = SessionState::default();
//! state.apply_mut(&SessionEvent::Initialize).unwrap();
//! state
//!     .apply_mut(&SessionEvent::DeckCreated(Deck::new(DeckId::new("abc"), 52)))
//!     .unwrap();
//!
//! state.apply_mut(&SessionEvent::Draw).unwrap();
//! state
//!     .apply_mut(&SessionEvent::CardDrawn {
//!         card: Card::from_parts("AS", "SPADES", "ACE", "https://deckofcardsapi.com/static/img/AS.png"),
//!         remaining: 51,
//!     })
//!     .unwrap();
//!
//! assert_eq!(state.status(), SessionStatus::Ready);
//! assert_eq!(state.history()[0].label, "SPADES ACE");
//!
//! // A depleted deck can be reshuffled but not drawn from
//! state.apply_mut(&SessionEvent::Draw).unwrap();
//! state.apply_mut(&SessionEvent::DeckDepleted).unwrap();
//! assert!(!state.can_draw());
//! assert!(state.can_shuffle());
//! ```

pub mod config;
pub mod remote;
pub mod state;

// Re-export everything from state module at crate root
pub use state::*;

pub use config::{ClientConfig, SessionConfig};
pub use remote::{HttpDeckClient, RemoteDeckClient, RemoteOutcome};
