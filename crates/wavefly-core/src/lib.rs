//! Operations against the Wavefront API, one per host module.
//!
//! Each operation is a short, sequential conversation with the service and
//! returns an [`Outcome`] (`changed` flag, payload, warnings) or a
//! [`CoreError`]:
//!
//! - **[`alert::read_alert`]**: fetch one alert; absent alerts are an
//!   empty result, not a failure.
//! - **[`event::run_event`]**: get, search, create, update or delete an
//!   event. Free-form bodies are checked against the fixed event schema
//!   by [`event::body::validate_body`] before anything is sent.
//! - **[`source::ensure_source`]**: create-or-update a source's tags,
//!   description and hidden flag.
//! - **[`tags::reconcile_tags`]**: move a source's tag set towards a
//!   desired state (`present`, `absent`, `replace`) using the pure
//!   [`tags::TagPlan`].

pub mod alert;
pub mod config;
pub mod error;
pub mod event;
pub mod outcome;
pub mod source;
pub mod tags;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::ConnectionConfig;
pub use error::CoreError;
pub use event::{EventAction, EventRequest, EventResult};
pub use outcome::Outcome;
pub use source::{SourceRequest, SourceResult};
pub use tags::{TagPlan, TagRequest, TagState, TagsResult};

pub use wavefly_api::{
    Backoff, Client, Error as ApiError, QueryFilter, RetryPolicy, Source, SourcePayload,
    TlsMode,
};
