//! Read-only views of a session for the presentation layer.

use serde::Serialize;

use super::card::Card;
use super::machine::{PendingOp, SessionState, SessionStatus};

/// A drawn card as displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardView {
    pub id: String,
    pub label: String,
    pub image_ref: String,
}

impl From<&Card> for CardView {
    fn from(card: &Card) -> Self {
        Self {
            id: card.code.clone(),
            label: card.label.clone(),
            image_ref: card.image_ref.clone(),
        }
    }
}

/// Immutable view of a session at one point in time.
///
/// `can_draw` and `can_shuffle` are derived from the state when the snapshot
/// is taken. A failed session reports the actions of the state it would
/// resume from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub status: SessionStatus,
    pub pending: Option<PendingOp>,
    pub deck_id: Option<String>,
    pub remaining: Option<u32>,
    pub history: Vec<CardView>,
    pub can_draw: bool,
    pub can_shuffle: bool,
    pub last_error: Option<String>,
}

impl From<&SessionState> for Snapshot {
    fn from(state: &SessionState) -> Self {
        let deck = state.deck();
        Self {
            status: state.status(),
            pending: state.pending(),
            deck_id: deck.map(|d| d.id.to_string()),
            remaining: deck.map(|d| d.remaining),
            history: state.history().iter().map(CardView::from).collect(),
            can_draw: state.can_draw(),
            can_shuffle: state.can_shuffle(),
            last_error: state.last_error().map(|e| e.to_string()),
        }
    }
}

impl Snapshot {
    pub fn is_busy(&self) -> bool {
        self.status.is_in_flight()
    }

    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}
