// ── Source manager ──
//
// Create-or-update a named source, then re-read it so the result shows
// what the service actually stored.

use serde::Serialize;
use tracing::{debug, info};
use wavefly_api::{Client, Source, SourcePayload};

use crate::error::CoreError;
use crate::outcome::{Outcome, Warnings, endpoint, lookup, or_empty_object};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRequest {
    pub name: String,
    pub tags: Vec<String>,
    pub description: String,
    /// Only honored when the source already exists.
    pub hidden: bool,
}

impl SourceRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    fn payload(&self) -> SourcePayload {
        SourcePayload::new(&self.name, &self.tags, &self.description)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SourceAction {
    Create,
    Update,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceResult {
    pub action: SourceAction,
    /// State re-read after the write.
    #[serde(serialize_with = "or_empty_object")]
    pub source: Option<Source>,
    /// Body that was sent; empty when the source vanished mid-update.
    #[serde(serialize_with = "or_empty_object")]
    pub payload: Option<SourcePayload>,
}

/// Create the source if it is missing, otherwise overwrite its tags and
/// description.
///
/// Always reports `changed`, even when the stored state already matched.
pub async fn ensure_source(
    client: &Client,
    request: &SourceRequest,
) -> Result<Outcome<SourceResult>, CoreError> {
    let name = request.name.as_str();
    let mut warnings = Warnings::default();

    let existing = fetch_existing(client, name).await?;

    let (action, payload) = if existing.is_some() {
        let mut payload = request.payload();
        if request.hidden {
            payload = payload.hidden();
        }
        (SourceAction::Update, update(client, name, payload).await?)
    } else {
        if request.hidden {
            warnings.push(format!(
                "hidden is only applied to existing sources; run again to hide {name}"
            ));
        }
        (SourceAction::Create, create(client, request.payload()).await?)
    };

    let source = fetch(client, name, &mut warnings).await?;
    info!(name, %action, "source written");

    Ok(Outcome::new(
        true,
        SourceResult {
            action,
            source,
            payload,
        },
    )
    .with_warnings(warnings.into_inner()))
}

/// Existence check before writing. Only not-found means absent; an
/// unreadable answer must never lead to a create.
async fn fetch_existing(client: &Client, name: &str) -> Result<Option<Source>, CoreError> {
    match client.get_source(name).await {
        Ok(found) => Ok(Some(found.unwrap_or_default())),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(CoreError::request(
            format!("Unable to query endpoint for source {name}"),
            err,
        )),
    }
}

/// Re-read after the write; a garbled body degrades to a warning.
async fn fetch(
    client: &Client,
    name: &str,
    warnings: &mut Warnings,
) -> Result<Option<Source>, CoreError> {
    match client.get_source(name).await {
        // An OK envelope without a body still means the source exists.
        Ok(found) => Ok(Some(found.unwrap_or_default())),
        err => lookup(err, warnings, || {
            format!("Unable to query endpoint for source {name}")
        }),
    }
}

async fn create(client: &Client, payload: SourcePayload) -> Result<Option<SourcePayload>, CoreError> {
    match client.create_source(&payload).await {
        Ok(_) => Ok(Some(payload)),
        Err(err) if err.is_already_exists() => {
            debug!(name = %payload.source_name, "source already exists");
            Ok(Some(payload))
        }
        Err(err) => Err(CoreError::request(
            format!(
                "There was an error talking to the server on {} endpoint",
                endpoint(client, &["source"])
            ),
            err,
        )),
    }
}

async fn update(
    client: &Client,
    name: &str,
    payload: SourcePayload,
) -> Result<Option<SourcePayload>, CoreError> {
    match client.update_source(name, &payload).await {
        Ok(_) => Ok(Some(payload)),
        Err(err) if err.is_not_found() => {
            debug!(name, "source disappeared before update");
            Ok(None)
        }
        Err(err) => Err(CoreError::request(
            format!(
                "Unable to query {} for source {name}",
                endpoint(client, &["source", name])
            ),
            err,
        )),
    }
}
