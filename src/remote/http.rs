//! HTTP client for the card provider.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use super::wire::{DeckResponse, DrawResponse};
use super::{DrawnCard, RemoteDeckClient, RemoteOutcome, Shuffled};
use crate::config::ClientConfig;
use crate::state::card::{Card, Deck, DeckId};

/// Longest error body kept in a failure message.
const MAX_ERROR_BODY: usize = 256;

/// Error building a client.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
    #[error("invalid URL scheme: {0} (expected http or https)")]
    InvalidScheme(String),
    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Why a single call did not produce a payload.
#[derive(Error, Debug)]
enum CallError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid request path: {0}")]
    Path(String),
    #[error("failed: {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("provider refused: {0}")]
    Rejected(String),
    #[error("malformed response: {0}")]
    Protocol(String),
}

impl CallError {
    fn into_outcome<T>(self, op: &'static str) -> RemoteOutcome<T> {
        match self {
            Self::Transport(err) => {
                warn!(op, error = %err, "deck provider unreachable");
                RemoteOutcome::TransportError(err.to_string())
            }
            Self::Protocol(detail) => {
                warn!(op, %detail, "unexpected response from deck provider");
                RemoteOutcome::RemoteError(format!("malformed response: {}", detail))
            }
            other => {
                warn!(op, error = %other, "deck provider reported failure");
                RemoteOutcome::RemoteError(other.to_string())
            }
        }
    }
}

fn check_status(status: StatusCode, error: Option<&str>) -> Result<(), CallError> {
    if !status.is_success() {
        return Err(CallError::Status {
            status,
            body: error.unwrap_or_default().to_string(),
        });
    }
    Ok(())
}

/// Reject non-2xx statuses and `success: false` bodies.
fn check(status: StatusCode, success: bool, error: Option<String>) -> Result<(), CallError> {
    check_status(status, error.as_deref())?;
    if !success {
        return Err(CallError::Rejected(
            error.unwrap_or_else(|| "request unsuccessful".to_string()),
        ));
    }
    Ok(())
}

fn truncated(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut end = MAX_ERROR_BODY;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
    }
    body
}

/// deckofcardsapi-compatible client.
#[derive(Debug, Clone)]
pub struct HttpDeckClient {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpDeckClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let mut base_url = Url::parse(&config.base_url)?;
        match base_url.scheme() {
            "http" | "https" => {}
            other => return Err(ClientError::InvalidScheme(other.to_string())),
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base URL extended by `segments`, each percent-encoded as a single
    /// segment, followed by a trailing slash.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, CallError> {
        if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
            return Err(CallError::Path(format!("unusable segment {:?}", bad)));
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CallError::Path(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments)
            .push("");
        Ok(url)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        segments: &[&str],
    ) -> Result<(StatusCode, T), CallError> {
        let url = self.endpoint(segments)?;
        debug!(%url, "deck provider request");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<T>(&body) {
            Ok(parsed) => Ok((status, parsed)),
            Err(_) if !status.is_success() => Err(CallError::Status {
                status,
                body: truncated(body),
            }),
            Err(err) => Err(CallError::Protocol(err.to_string())),
        }
    }

    async fn try_create(&self) -> Result<Deck, CallError> {
        let (status, body) = self
            .fetch::<DeckResponse>(&["new", "shuffle"])
            .await?;
        check(status, body.success, body.error)?;

        let deck_id = body
            .deck_id
            .ok_or_else(|| CallError::Protocol("missing deck_id".into()))?;
        let remaining = body
            .remaining
            .ok_or_else(|| CallError::Protocol("missing remaining".into()))?;

        Ok(Deck::new(DeckId::new(deck_id), remaining))
    }

    /// `Ok(None)` means the provider reported the deck empty.
    async fn try_draw(&self, deck_id: &DeckId) -> Result<Option<DrawnCard>, CallError> {
        let (status, body) = self
            .fetch::<DrawResponse>(&[deck_id.as_str(), "draw"])
            .await?;
        check_status(status, body.error.as_deref())?;

        // Depletion wins over `success` and over any cards in the body
        if body.remaining == Some(0) {
            return Ok(None);
        }
        check(status, body.success, body.error)?;

        let remaining = body
            .remaining
            .ok_or_else(|| CallError::Protocol("missing remaining".into()))?;
        let wire = body
            .cards
            .into_iter()
            .next()
            .ok_or_else(|| CallError::Protocol("draw returned no cards".into()))?;

        Ok(Some(DrawnCard {
            card: Card::from_parts(&wire.code, &wire.suit, &wire.value, &wire.image),
            remaining,
        }))
    }

    async fn try_shuffle(&self, deck_id: &DeckId) -> Result<Shuffled, CallError> {
        let (status, body) = self
            .fetch::<DeckResponse>(&[deck_id.as_str(), "shuffle"])
            .await?;
        check(status, body.success, body.error)?;

        let remaining = body
            .remaining
            .ok_or_else(|| CallError::Protocol("missing remaining".into()))?;
        Ok(Shuffled { remaining })
    }
}

#[async_trait]
impl RemoteDeckClient for HttpDeckClient {
    async fn create_shuffled_deck(&self) -> RemoteOutcome<Deck> {
        match self.try_create().await {
            Ok(deck) => {
                debug!(deck_id = %deck.id, remaining = deck.remaining, "deck created");
                RemoteOutcome::Ok(deck)
            }
            Err(err) => err.into_outcome("create"),
        }
    }

    async fn draw_one(&self, deck_id: &DeckId) -> RemoteOutcome<DrawnCard> {
        match self.try_draw(deck_id).await {
            Ok(Some(drawn)) => {
                debug!(%deck_id, code = %drawn.card.code, remaining = drawn.remaining, "card drawn");
                RemoteOutcome::Ok(drawn)
            }
            Ok(None) => {
                debug!(%deck_id, "deck depleted");
                RemoteOutcome::Depleted
            }
            Err(err) => err.into_outcome("draw"),
        }
    }

    async fn shuffle(&self, deck_id: &DeckId) -> RemoteOutcome<Shuffled> {
        match self.try_shuffle(deck_id).await {
            Ok(shuffled) => {
                debug!(%deck_id, remaining = shuffled.remaining, "deck shuffled");
                RemoteOutcome::Ok(shuffled)
            }
            Err(err) => err.into_outcome("shuffle"),
        }
    }
}
