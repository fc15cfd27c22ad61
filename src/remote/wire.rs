//! Response bodies of the card provider.
//!
//! Fields the provider may omit on failure responses are defaulted, so a
//! `success: false` body still decodes and its `error` text can be reported.

use serde::Deserialize;

/// Body of `new/shuffle/` and `{deck_id}/shuffle/`.
#[derive(Debug, Clone, Deserialize)]
pub struct DeckResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub deck_id: Option<String>,
    #[serde(default)]
    pub remaining: Option<u32>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of `{deck_id}/draw/`.
#[derive(Debug, Clone, Deserialize)]
pub struct DrawResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub remaining: Option<u32>,
    #[serde(default)]
    pub cards: Vec<WireCard>,
    #[serde(default)]
    pub error: Option<String>,
}

/// One card as sent by the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct WireCard {
    pub code: String,
    pub suit: String,
    pub value: String,
    pub image: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decode_draw() {
        let body = r#"{
            "success": true,
            "deck_id": "kxozasf3edqu",
            "cards": [{
                "code": "6H",
                "image": "https://deckofcardsapi.com/static/img/6H.png",
                "images": {"svg": "https://deckofcardsapi.com/static/img/6H.svg"},
                "value": "6",
                "suit": "HEARTS"
            }],
            "remaining": 50
        }"#;
        let draw: DrawResponse = serde_json::from_str(body).unwrap();
        assert!(draw.success);
        assert_eq!(draw.remaining, Some(50));
        assert_eq!(draw.cards.len(), 1);
        assert_eq!(draw.cards[0].suit, "HEARTS");
    }

    #[test]
    fn test_decode_failure_body() {
        let body = r#"{
            "success": false,
            "deck_id": "kxozasf3edqu",
            "cards": [],
            "remaining": 0,
            "error": "Not enough cards remaining to draw 1 additional"
        }"#;
        let draw: DrawResponse = serde_json::from_str(body).unwrap();
        assert!(!draw.success);
        assert_eq!(draw.remaining, Some(0));
        assert!(draw.cards.is_empty());

        let deck: DeckResponse =
            serde_json::from_str(r#"{"success": false, "error": "Deck ID does not exist."}"#)
                .unwrap();
        assert_eq!(deck.deck_id, None);
        assert_eq!(deck.error.as_deref(), Some("Deck ID does not exist."));
    }
}
