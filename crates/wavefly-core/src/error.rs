// ── Core error types ──
//
// Failures of a module invocation. Not-found and already-exists API
// responses never reach this type: the operations absorb them as empty
// or successful results.

use thiserror::Error;

use crate::event::body::BodyError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Input errors ─────────────────────────────────────────────────
    /// Inputs that cannot be combined or parsed.
    #[error("Invalid module arguments: {message}")]
    Config { message: String },

    /// The event payload failed schema validation.
    #[error(transparent)]
    Validation(#[from] BodyError),

    // ── Remote errors ────────────────────────────────────────────────
    /// A request failed; `context` names the endpoint or resource.
    #[error("{context}: {source}")]
    Request {
        context: String,
        #[source]
        source: wavefly_api::Error,
    },

    /// The client could not be constructed.
    #[error("Cannot connect to {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: wavefly_api::Error,
    },
}

impl CoreError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub(crate) fn request(context: impl Into<String>, source: wavefly_api::Error) -> Self {
        Self::Request {
            context: context.into(),
            source,
        }
    }

    /// The underlying API error, if this failure came from a request.
    pub fn api_error(&self) -> Option<&wavefly_api::Error> {
        match self {
            Self::Request { source, .. } | Self::Connect { source, .. } => Some(source),
            _ => None,
        }
    }
}
