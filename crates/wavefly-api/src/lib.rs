// wavefly-api: Async Rust client for the Wavefront v2 REST API

pub mod alerts;
pub mod client;
pub mod error;
pub mod events;
pub mod models;
pub mod retry;
pub mod sources;
pub mod transport;

pub use client::Client;
pub use error::Error;
pub use models::{
    Envelope, Event, EventSearch, Paged, QueryFilter, ResponseStatus, Source, SourcePayload,
    TimeRange,
};
pub use retry::{Backoff, RetryDecision, RetryPolicy};
pub use transport::{TlsMode, TransportConfig};
