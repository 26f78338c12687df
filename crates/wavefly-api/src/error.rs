use thiserror::Error;

/// Top-level error type for the `wavefly-api` crate.
///
/// Every failure mode of a single HTTP exchange with the Wavefront API:
/// transport, URL construction, non-2xx responses, and body decoding.
/// `wavefly-core` decides which of these are fatal and which are
/// idempotence accommodations (not-found, already-exists).
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The API rejected the bearer token (HTTP 401).
    #[error("Invalid or expired API token")]
    InvalidToken,

    /// The token could not be turned into a header value.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The endpoint parsed, but cannot host API paths.
    #[error("Invalid endpoint '{0}': expected an http(s) base URL")]
    InvalidEndpoint(String),

    /// TLS handshake, certificate or client-construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── API ─────────────────────────────────────────────────────────
    /// Non-2xx response. `message` is the `status.message` of the
    /// error envelope when the body parsed as one.
    #[error("API error (HTTP {status}): {}", describe(.message.as_deref(), .body))]
    Api {
        status: u16,
        message: Option<String>,
        body: String,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Retry ───────────────────────────────────────────────────────
    /// A retried request failed on every permitted attempt.
    #[error("Gave up after {attempts} attempt(s): {last}")]
    RetriesExhausted { attempts: u32, last: Box<Error> },
}

fn describe<'a>(message: Option<&'a str>, body: &'a str) -> &'a str {
    match message {
        Some(m) if !m.is_empty() => m,
        _ if body.is_empty() => "<empty body>",
        _ => body,
    }
}

impl Error {
    /// The API status message, if the error body carried one.
    pub fn api_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } => message.as_deref(),
            Self::RetriesExhausted { last, .. } => last.api_message(),
            _ => None,
        }
    }

    /// HTTP status code of a rejected request.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::InvalidToken => Some(401),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::RetriesExhausted { last, .. } => last.status(),
            _ => None,
        }
    }

    /// Returns `true` if the API reported that the resource does not exist.
    ///
    /// Only a parsed error envelope counts: a bare 404 with an unreadable
    /// body is still a failure.
    pub fn is_not_found(&self) -> bool {
        self.api_message()
            .is_some_and(|m| m.contains("does not exist"))
    }

    /// Returns `true` if the API reported a create conflict.
    pub fn is_already_exists(&self) -> bool {
        self.api_message()
            .is_some_and(|m| m.contains("already exists"))
    }

    /// Returns `true` if the request never produced a response and a
    /// second attempt might.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Returns `true` if a write that failed this way may be re-sent:
    /// any HTTP-level rejection, or a transient transport failure.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Api { .. } | Self::InvalidToken) || self.is_transient()
    }
}
