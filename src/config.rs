//! Client and session configuration.

use std::time::Duration;

use serde::Deserialize;

/// Default provider endpoint.
pub const DEFAULT_BASE_URL: &str = "https://deckofcardsapi.com/api/deck/";

/// Default per-request HTTP timeout (15 seconds).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Default bound on one session operation (10 seconds).
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings for [`HttpDeckClient`](crate::remote::HttpDeckClient).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Provider base URL, e.g. `https://deckofcardsapi.com/api/deck/`
    pub base_url: String,

    /// Timeout applied by the HTTP client to each request
    #[serde(with = "secs")]
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Settings for [`DeckSession`](crate::state::DeckSession).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Longest a session stays busy before the call counts as failed.
    /// `None` waits for the client indefinitely.
    #[serde(with = "opt_secs")]
    pub operation_timeout: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            operation_timeout: Some(DEFAULT_OPERATION_TIMEOUT),
        }
    }
}

impl SessionConfig {
    pub fn with_operation_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.operation_timeout = timeout;
        self
    }
}

mod secs {
    use std::time::Duration;

    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        from_f64(f64::deserialize(d)?)
    }

    /// Negative values clamp to zero; values too large for a `Duration` are errors.
    pub(super) fn from_f64<E: Error>(secs: f64) -> Result<Duration, E> {
        Duration::try_from_secs_f64(secs.max(0.0)).map_err(E::custom)
    }
}

mod opt_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Option::<f64>::deserialize(d)?
            .map(super::secs::from_f64)
            .transpose()
    }
}
