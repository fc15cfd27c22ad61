//! Deck and card values.
//!
//! These are plain data: they are only ever built from remote responses and
//! replaced by assignment, never edited in place.

use std::fmt;

use chrono::{DateTime, Utc};

/// Opaque deck handle assigned by the card provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeckId(String);

impl DeckId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One remote deck instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    /// Handle assigned at creation
    pub id: DeckId,

    /// Last-known undrawn card count (advisory)
    pub remaining: u32,

    /// When the deck was created or last confirmed shuffled
    pub shuffled_at: DateTime<Utc>,
}

impl Deck {
    pub fn new(id: DeckId, remaining: u32) -> Self {
        Self {
            id,
            remaining,
            shuffled_at: Utc::now(),
        }
    }

    /// Same deck with a count taken from a draw response.
    pub fn with_remaining(&self, remaining: u32) -> Self {
        Self {
            id: self.id.clone(),
            remaining,
            shuffled_at: self.shuffled_at,
        }
    }

    /// Replacement deck after a confirmed shuffle.
    pub fn reshuffled(&self, remaining: u32) -> Self {
        Self::new(self.id.clone(), remaining)
    }
}

/// A drawn card.
///
/// Equality is by `code` only.
#[derive(Debug, Clone, Eq)]
pub struct Card {
    pub code: String,
    pub label: String,
    pub image_ref: String,
}

impl Card {
    pub fn new(code: impl Into<String>, label: impl Into<String>, image_ref: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
            image_ref: image_ref.into(),
        }
    }

    /// Build a card from the provider's suit and value names.
    pub fn from_parts(code: &str, suit: &str, value: &str, image_ref: &str) -> Self {
        Self::new(code, format!("{} {}", suit, value), image_ref)
    }
}

impl PartialEq for Card {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.code)
    }
}

/// Cards drawn from the current deck, in draw order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrawnHistory {
    cards: Vec<Card>,
}

impl DrawnHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// History with one more card at the end.
    pub fn appended(&self, card: Card) -> Self {
        let mut cards = self.cards.clone();
        cards.push(card);
        Self { cards }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_card_label_from_parts() {
        let card = Card::from_parts("AS", "SPADES", "ACE", "https://img/AS.png");
        assert_eq!(card.label, "SPADES ACE");
        assert_eq!(card.image_ref, "https://img/AS.png");
    }

    #[test]
    fn test_card_equality_by_code() {
        let a = Card::new("KH", "HEARTS KING", "one.png");
        let b = Card::new("KH", "whatever", "two.png");
        assert_eq!(a, b);
        assert_ne!(a, Card::new("QH", "HEARTS KING", "one.png"));
    }

    #[test]
    fn test_history_keeps_order_and_duplicates() {
        let history = DrawnHistory::new()
            .appended(Card::new("2C", "CLUBS 2", ""))
            .appended(Card::new("2C", "CLUBS 2", ""))
            .appended(Card::new("9D", "DIAMONDS 9", ""));

        let codes: Vec<&str> = history.cards().iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["2C", "2C", "9D"]);
    }

    #[test]
    fn test_appended_leaves_original_untouched() {
        let base = DrawnHistory::new().appended(Card::new("AS", "SPADES ACE", ""));
        let grown = base.appended(Card::new("KS", "SPADES KING", ""));
        assert_eq!(base.len(), 1);
        assert_eq!(grown.len(), 2);
    }

    #[test]
    fn test_deck_reshuffled_keeps_id() {
        let deck = Deck::new(DeckId::new("abc"), 40);
        let fresh = deck.reshuffled(52);
        assert_eq!(fresh.id, deck.id);
        assert_eq!(fresh.remaining, 52);
        assert!(fresh.shuffled_at >= deck.shuffled_at);

        let drawn = deck.with_remaining(39);
        assert_eq!(drawn.shuffled_at, deck.shuffled_at);
        assert_eq!(drawn.remaining, 39);
    }
}
