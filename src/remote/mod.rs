//! Access to the remote card provider.
//!
//! - `http` - reqwest-backed client for the deckofcardsapi layout
//! - `wire` - response bodies as the provider sends them
//! - `mock` - scripted in-memory client for tests
//!
//! Every call resolves to a [`RemoteOutcome`]. Expected outcomes, including
//! a depleted deck and failed calls, are values rather than errors, so the
//! session has to handle each one explicitly.

pub mod http;
#[cfg(any(test, feature = "testing"))]
pub mod mock;
pub mod wire;

use async_trait::async_trait;

use crate::state::card::{Card, Deck, DeckId};

pub use http::{ClientError, HttpDeckClient};

/// Closed result vocabulary for one remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteOutcome<T> {
    /// Call succeeded
    Ok(T),
    /// The deck has no cards left; not a failure
    Depleted,
    /// No usable response reached us
    TransportError(String),
    /// The service answered with a failure or an unreadable body
    RemoteError(String),
}

/// A card returned by a draw, with the count left after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawnCard {
    pub card: Card,
    pub remaining: u32,
}

/// Result of a confirmed shuffle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shuffled {
    pub remaining: u32,
}

/// The three calls a deck session needs from the provider.
#[async_trait]
pub trait RemoteDeckClient: Send + Sync {
    /// Create a new deck, already shuffled.
    async fn create_shuffled_deck(&self) -> RemoteOutcome<Deck>;

    /// Draw a single card.
    async fn draw_one(&self, deck_id: &DeckId) -> RemoteOutcome<DrawnCard>;

    /// Return all cards to the deck and shuffle it.
    async fn shuffle(&self, deck_id: &DeckId) -> RemoteOutcome<Shuffled>;
}
