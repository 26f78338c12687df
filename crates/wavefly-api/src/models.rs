// Wire types for the Wavefront v2 API.
//
// Every response is wrapped as `{ "status": {...}, "response": ... }`.
// Error bodies carry the same `status` object without a `response`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `status` member of every response envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResponseStatus {
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<u16>,
}

/// Standard response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub status: Option<ResponseStatus>,
    #[serde(default = "Option::default")]
    pub response: Option<T>,
}

/// Paged container (`ResponseContainerPaged*`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paged<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub more_items: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_items: Option<u64>,
}

// ── Events ───────────────────────────────────────────────────────────

/// An event record.
///
/// Used both as the validated request body and as the decoded response.
/// Every field is optional on the wire; anything outside the known
/// schema is preserved in `extra` when decoding responses.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosts: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_ephemeral: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_epoch_millis: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_epoch_millis: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updater_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summarized_events: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_user_event: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub running_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_close: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator_type: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_delete: Option<bool>,

    /// Response fields outside the known schema.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One filter of an event search (`{key, value, matchingMethod}`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryFilter {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
    /// `CONTAINS`, `STARTSWITH`, `EXACT`, `TAGPATH`, ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matching_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negated: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    pub earliest_start_time_epoch_millis: i64,
    pub latest_start_time_epoch_millis: i64,
}

/// Body of `POST /api/v2/search/event`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSearch {
    pub limit: u32,
    pub query: Vec<QueryFilter>,
    pub time_range: TimeRange,
}

// ── Sources ──────────────────────────────────────────────────────────

/// A source as returned by `GET /api/v2/source/{name}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: BTreeMap<String, bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Source {
    /// Tags whose value is `true`, in sorted order.
    pub fn active_tags(&self) -> impl Iterator<Item = &str> {
        self.tags
            .iter()
            .filter(|(_, on)| **on)
            .map(|(tag, _)| tag.as_str())
    }

    /// Whether the reserved `hidden` tag is set.
    pub fn is_hidden(&self) -> bool {
        self.tags.get(SourcePayload::HIDDEN_TAG).copied().unwrap_or(false)
    }
}

/// Body of source create (`POST`) and update (`PUT`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcePayload {
    pub source_name: String,
    pub tags: BTreeMap<String, bool>,
    pub description: String,
}

impl SourcePayload {
    /// Reserved tag the service uses to hide a source.
    pub const HIDDEN_TAG: &'static str = "hidden";

    pub fn new<I, S>(source_name: impl Into<String>, tags: I, description: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            source_name: source_name.into(),
            tags: tags.into_iter().map(|t| (t.into(), true)).collect(),
            description: description.into(),
        }
    }

    /// Mark the source hidden via the reserved tag.
    pub fn hidden(mut self) -> Self {
        self.tags.insert(Self::HIDDEN_TAG.into(), true);
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn event_round_trips_camel_case_and_keeps_unknown_fields() {
        let raw = json!({
            "id": "1507307331000:deploy",
            "name": "deploy",
            "startTime": 1_507_307_331_000_i64,
            "hosts": ["web-1"],
            "runningState": "ENDED",
            "details": "kept"
        });
        let event: Event = serde_json::from_value(raw).unwrap();
        assert_eq!(event.start_time, Some(1_507_307_331_000));
        assert_eq!(event.running_state.as_deref(), Some("ENDED"));
        assert_eq!(event.extra.get("details"), Some(&json!("kept")));

        let back = serde_json::to_value(&event).unwrap();
        assert_eq!(back["startTime"], json!(1_507_307_331_000_i64));
        assert!(back.get("endTime").is_none());
    }

    #[test]
    fn source_payload_encodes_tags_as_map() {
        let payload = SourcePayload::new("web-1", ["prod", "nginx"], "app server").hidden();
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "sourceName": "web-1",
                "tags": {"hidden": true, "nginx": true, "prod": true},
                "description": "app server"
            })
        );
    }

    #[test]
    fn envelope_without_response_decodes() {
        let env: Envelope<Source> =
            serde_json::from_value(json!({"status": {"result": "OK", "code": 200}})).unwrap();
        assert!(env.response.is_none());
        assert_eq!(env.status.unwrap().code, Some(200));
    }

    #[test]
    fn source_hidden_flag_reads_reserved_tag() {
        let source: Source = serde_json::from_value(json!({
            "id": "web-1",
            "tags": {"hidden": true, "prod": true, "old": false}
        }))
        .unwrap();
        assert!(source.is_hidden());
        assert_eq!(source.active_tags().collect::<Vec<_>>(), ["hidden", "prod"]);
    }
}
