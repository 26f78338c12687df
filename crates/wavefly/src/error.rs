//! CLI error types with miette diagnostics.
//!
//! Maps core and config failures into user-facing errors with actionable
//! help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use wavefly_config::ConfigError;
use wavefly_core::{ApiError, CoreError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to {endpoint}")]
    #[diagnostic(
        code(wavefly::connection_failed),
        help(
            "Check the endpoint URL and your network access.\n\
             Endpoint: {endpoint}"
        )
    )]
    ConnectionFailed {
        endpoint: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("TLS setup or verification failed: {reason}")]
    #[diagnostic(
        code(wavefly::tls_error),
        help(
            "Configure ca_cert in your profile for a private CA,\n\
             or use --insecure (-k) to accept any certificate."
        )
    )]
    TlsError { reason: String },

    #[error("Request timed out: {context}")]
    #[diagnostic(
        code(wavefly::timeout),
        help("Increase the timeout with --timeout or check the cluster's responsiveness.")
    )]
    Timeout { context: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("The API token was rejected: {context}")]
    #[diagnostic(
        code(wavefly::auth_failed),
        help(
            "Verify the token under Settings > API Access on your cluster.\n\
             Store a new one with: wavefly config set-token"
        )
    )]
    AuthFailed { context: String },

    #[error("No API token configured for profile '{profile}'")]
    #[diagnostic(
        code(wavefly::no_credentials),
        help(
            "Configure a token with: wavefly config init\n\
             Or set the WAVEFRONT_TOKEN environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Requests ─────────────────────────────────────────────────────
    #[error("{context}")]
    #[diagnostic(code(wavefly::not_found))]
    NotFound {
        context: String,
        #[source]
        source: ApiError,
    },

    #[error("{context}")]
    #[diagnostic(code(wavefly::request_failed))]
    RequestFailed {
        context: String,
        #[source]
        source: ApiError,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(wavefly::validation))]
    Validation { field: String, reason: String },

    #[error("{0}")]
    #[diagnostic(
        code(wavefly::invalid_body),
        help("Use annotations to carry free-form data, e.g. --annotation owner=ops")
    )]
    InvalidBody(String),

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(wavefly::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: wavefly config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No endpoint configured")]
    #[diagnostic(
        code(wavefly::no_endpoint),
        help(
            "Pass --endpoint, set WAVEFRONT_ENDPOINT, or create a profile with: wavefly config init\n\
             Config file: {path}"
        )
    )]
    NoEndpoint { path: String },

    #[error(transparent)]
    #[diagnostic(code(wavefly::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(wavefly::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML output failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::TlsError { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. }
            | Self::InvalidBody(_)
            | Self::NoCredentials { .. }
            | Self::NoEndpoint { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Classify a failed request by its root API error.
    fn from_request(context: String, source: ApiError) -> Self {
        let root = match &source {
            ApiError::RetriesExhausted { last, .. } => last.as_ref(),
            other => other,
        };
        let tls_reason = match root {
            ApiError::Tls(reason) => Some(reason.clone()),
            _ => None,
        };
        let (timeout, connect) = match root {
            ApiError::Transport(e) => (e.is_timeout(), e.is_connect()),
            _ => (false, false),
        };
        let auth = matches!(root, ApiError::InvalidToken | ApiError::Authentication { .. });
        let status = root.status();

        if auth {
            Self::AuthFailed { context }
        } else if let Some(reason) = tls_reason {
            Self::TlsError { reason }
        } else if timeout {
            Self::Timeout { context }
        } else if connect {
            Self::ConnectionFailed {
                endpoint: context,
                source: Box::new(source),
            }
        } else if status == Some(404) {
            Self::NotFound { context, source }
        } else {
            Self::RequestFailed { context, source }
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Config { message } => Self::Validation {
                field: "arguments".into(),
                reason: message,
            },
            CoreError::Validation(body) => Self::InvalidBody(body.to_string()),
            CoreError::Request { context, source } => Self::from_request(context, source),
            CoreError::Connect { endpoint, source } => match source {
                ApiError::Tls(reason) => Self::TlsError { reason },
                ApiError::InvalidEndpoint(_) | ApiError::InvalidUrl(_) => Self::Validation {
                    field: "endpoint".into(),
                    reason: source.to_string(),
                },
                other => Self::ConnectionFailed {
                    endpoint,
                    source: Box::new(other),
                },
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::ProfileNotFound { name, available } => {
                Self::ProfileNotFound { name, available }
            }
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config(other),
        }
    }
}
