//! Deck session state.
//!
//! This module provides the core session types:
//!
//! - `card` - Deck handle, drawn cards and their history
//! - `machine` - Session state machine (what may happen next?)
//! - `snapshot` - Immutable views handed to the presentation layer
//! - `session` - `DeckSession`, which drives the machine with remote calls
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                           DeckSession                            │
//! │                                                                  │
//! │  initialize() ──┐                                                │
//! │  draw()       ──┼──▶ Mutex<SessionState> ──┬──▶ watch<Snapshot>  │
//! │  reshuffle()  ──┘    check-and-set Busy    └──▶ current_snapshot │
//! │                              │                                   │
//! │                              │ one remote call at a time         │
//! │                              ▼                                   │
//! │                    impl RemoteDeckClient                         │
//! │                    (HttpDeckClient, ScriptedClient)              │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use deck_session::{config::ClientConfig, remote::HttpDeckClient, DeckSession};
//!
//! let client = HttpDeckClient::new(&ClientConfig::default())?;
//! let session = DeckSession::new(client);
//!
//! session.initialize().await?;
//! let snapshot = session.draw().await?;
//! for card in &snapshot.history {
//!     println!("{} {}", card.label, card.image_ref);
//! }
//! ```

pub mod card;
pub mod machine;
pub mod session;
pub mod snapshot;

// Re-export commonly used types
pub use card::{Card, Deck, DeckId, DrawnHistory};
pub use machine::{
    ErrorInfo, ErrorKind, InvalidTransition, PendingOp, SessionEvent, SessionState, SessionStatus,
};
pub use session::{DeckSession, SessionError};
pub use snapshot::{CardView, Snapshot};
