// ── Event manager ──
//
// One invocation performs exactly one of get, search, create, update or
// delete. The action is picked from which inputs are present, the time
// window is normalized, and any body is validated before the first
// request goes out.

pub mod body;
pub mod window;

use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};
use wavefly_api::{
    Client, Error as ApiError, Event, EventSearch, Paged, QueryFilter, RetryDecision, RetryPolicy,
    TimeRange,
};

use self::body::{BodyContext, validate_body};
use self::window::TimeWindow;
use crate::error::CoreError;
use crate::outcome::{Outcome, Warnings, endpoint, lookup, or_empty_object};

/// Default cap on search results.
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

/// Inputs of one event invocation.
///
/// Empty `id`, `body` and `query` values count as absent.
#[derive(Debug, Clone)]
pub struct EventRequest {
    pub id: Option<String>,
    /// Free-form payload, checked against the event schema.
    pub body: Option<Map<String, Value>>,
    pub query: Option<Vec<QueryFilter>>,
    pub delete: bool,
    pub limit: u32,
    /// Epoch milliseconds, as an integer or numeric string.
    pub start_time: Option<Value>,
    pub end_time: Option<Value>,
    /// Merged into the body's annotations; forces update-style validation.
    pub annotations: Option<Map<String, Value>>,
}

impl Default for EventRequest {
    fn default() -> Self {
        Self {
            id: None,
            body: None,
            query: None,
            delete: false,
            limit: DEFAULT_SEARCH_LIMIT,
            start_time: None,
            end_time: None,
            annotations: None,
        }
    }
}

impl EventRequest {
    fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    fn body(&self) -> Option<&Map<String, Value>> {
        self.body.as_ref().filter(|b| !b.is_empty())
    }

    fn query(&self) -> Option<&[QueryFilter]> {
        self.query.as_deref().filter(|q| !q.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EventAction {
    Get,
    Search,
    Create,
    Update,
    Delete,
}

impl EventAction {
    /// Pick the action implied by which inputs are present.
    pub fn select(request: &EventRequest) -> Result<Self, CoreError> {
        let id = request.id().is_some();
        let body = request.body().is_some();
        let query = request.query().is_some();

        if query && (body || id) {
            return Err(CoreError::config(
                "query is mutually exclusive with id and body",
            ));
        }
        let action = match (id, body) {
            (true, true) => Self::Update,
            (true, false) if request.delete => Self::Delete,
            (true, false) => Self::Get,
            (false, _) if query => Self::Search,
            (false, true) => Self::Create,
            (false, false) => {
                return Err(CoreError::config("One of [id, query, body] is required"));
            }
        };
        Ok(action)
    }

    pub fn is_write(self) -> bool {
        matches!(self, Self::Create | Self::Update | Self::Delete)
    }
}

/// A single event or a page of search hits.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EventData {
    Single(Box<Event>),
    Page(Paged<Event>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventResult {
    pub action: EventAction,
    #[serde(serialize_with = "or_empty_object")]
    pub event: Option<EventData>,
    /// The validated body that was sent, for update.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<Event>,
}

/// Run one event invocation.
///
/// `policy` bounds create, update and delete; reads are never retried.
pub async fn run_event(
    client: &Client,
    request: &EventRequest,
    policy: &RetryPolicy,
) -> Result<Outcome<EventResult>, CoreError> {
    let action = EventAction::select(request)?;
    let mut warnings = Warnings::default();

    let window = TimeWindow::from_inputs(
        request.start_time.as_ref(),
        request.end_time.as_ref(),
        Utc::now(),
    )?;
    if window.is_inverted() {
        warnings.push(format!(
            "start_time {} is after end_time {}",
            window.start, window.end
        ));
    }

    let ctx = BodyContext {
        id: request.id(),
        annotations: request.annotations.as_ref(),
        window,
    };
    let body = request
        .body()
        .map(|raw| validate_body(raw.clone(), &ctx))
        .transpose()?;

    debug!(%action, "running event action");
    let result = match (action, request.id(), body) {
        (EventAction::Get, Some(id), _) => get(client, id, &mut warnings).await?,
        (EventAction::Search, _, _) => {
            let query = request.query().unwrap_or_default().to_vec();
            search(client, query, request.limit, window, &mut warnings).await?
        }
        (EventAction::Create, _, Some(body)) => create(client, body, policy, &mut warnings).await?,
        (EventAction::Update, Some(id), Some(body)) => {
            update(client, id, body, policy, &mut warnings).await?
        }
        (EventAction::Delete, Some(id), _) => delete(client, id, policy, &mut warnings).await?,
        _ => return Err(CoreError::config("One of [id, query, body] is required")),
    };

    Ok(Outcome::new(action.is_write(), result).with_warnings(warnings.into_inner()))
}

async fn get(client: &Client, id: &str, warnings: &mut Warnings) -> Result<EventResult, CoreError> {
    let found = lookup(client.get_event(id).await, warnings, || {
        format!("Unable to query {} for id {id}", endpoint(client, &["event", id]))
    })?;
    Ok(EventResult {
        action: EventAction::Get,
        event: found.map(|e| EventData::Single(Box::new(e))),
        request_body: None,
    })
}

async fn search(
    client: &Client,
    query: Vec<QueryFilter>,
    limit: u32,
    window: TimeWindow,
    warnings: &mut Warnings,
) -> Result<EventResult, CoreError> {
    let search = EventSearch {
        limit,
        query,
        time_range: TimeRange {
            earliest_start_time_epoch_millis: window.start,
            latest_start_time_epoch_millis: window.end,
        },
    };
    let page = lookup(client.search_events(&search).await, warnings, || {
        format!(
            "There was an error talking to the server on {} endpoint",
            endpoint(client, &["search", "event"])
        )
    })?;
    Ok(EventResult {
        action: EventAction::Search,
        event: page.map(EventData::Page),
        request_body: None,
    })
}

async fn create(
    client: &Client,
    body: Event,
    policy: &RetryPolicy,
    warnings: &mut Warnings,
) -> Result<EventResult, CoreError> {
    let outcome = policy
        .run(
            || client.create_event(&body),
            |attempt, err| {
                if err.status() == Some(406) {
                    warnings.push(format!(
                        "Event create attempt {attempt} was rejected with HTTP 406; \
                         the server may be rate limiting"
                    ));
                    return RetryDecision::Retry;
                }
                // A 500 means the payload itself was refused.
                if err.status() != Some(500) && err.is_retryable() {
                    RetryDecision::Retry
                } else {
                    RetryDecision::Abort
                }
            },
        )
        .await;

    match outcome {
        Ok(created) => {
            info!(id = ?created.as_ref().and_then(|e| e.id.as_deref()), "event created");
            Ok(EventResult {
                action: EventAction::Create,
                event: created.map(|e| EventData::Single(Box::new(e))),
                request_body: None,
            })
        }
        Err(err) => {
            if let ApiError::RetriesExhausted { attempts, .. } = &err {
                warnings.push(format!(
                    "Event creation failed after {attempts} attempt(s); \
                     an event may still have been recorded and need manual cleanup"
                ));
            }
            Err(CoreError::request("Failed to create event", err))
        }
    }
}

async fn update(
    client: &Client,
    id: &str,
    body: Event,
    policy: &RetryPolicy,
    warnings: &mut Warnings,
) -> Result<EventResult, CoreError> {
    let updated = policy
        .run(
            || client.update_event(id, &body),
            |attempt, err| write_failed("update", id, attempt, err, warnings),
        )
        .await
        .map_err(|err| CoreError::request("Failed to update event", err))?;

    info!(id, "event updated");
    Ok(EventResult {
        action: EventAction::Update,
        event: updated.map(|e| EventData::Single(Box::new(e))),
        request_body: Some(body),
    })
}

async fn delete(
    client: &Client,
    id: &str,
    policy: &RetryPolicy,
    warnings: &mut Warnings,
) -> Result<EventResult, CoreError> {
    let deleted = policy
        .run(
            || client.delete_event(id),
            |attempt, err| write_failed("delete", id, attempt, err, warnings),
        )
        .await
        .map_err(|err| CoreError::request("Failed to delete event", err))?;

    info!(id, "event deleted");
    Ok(EventResult {
        action: EventAction::Delete,
        event: deleted.map(|e| EventData::Single(Box::new(e))),
        request_body: None,
    })
}

fn write_failed(
    verb: &str,
    id: &str,
    attempt: u32,
    err: &ApiError,
    warnings: &mut Warnings,
) -> RetryDecision {
    warnings.push(format!("Attempt {attempt} to {verb} event {id} failed: {err}"));
    if err.is_retryable() {
        RetryDecision::Retry
    } else {
        RetryDecision::Abort
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn filter() -> QueryFilter {
        QueryFilter {
            key: "name".into(),
            value: Some("deploy".into()),
            values: Vec::new(),
            matching_method: Some("EXACT".into()),
            negated: None,
        }
    }

    fn body() -> Map<String, Value> {
        let Value::Object(map) = json!({"name": "deploy"}) else {
            unreachable!()
        };
        map
    }

    #[test]
    fn selection_precedence() {
        let base = EventRequest::default();

        let update = EventRequest {
            id: Some("1:x".into()),
            body: Some(body()),
            delete: true,
            ..base.clone()
        };
        assert_eq!(EventAction::select(&update).unwrap(), EventAction::Update);

        let delete = EventRequest {
            id: Some("1:x".into()),
            delete: true,
            ..base.clone()
        };
        assert_eq!(EventAction::select(&delete).unwrap(), EventAction::Delete);

        let get = EventRequest {
            id: Some("1:x".into()),
            ..base.clone()
        };
        assert_eq!(EventAction::select(&get).unwrap(), EventAction::Get);

        let search = EventRequest {
            query: Some(vec![filter()]),
            ..base.clone()
        };
        assert_eq!(EventAction::select(&search).unwrap(), EventAction::Search);

        let create = EventRequest {
            body: Some(body()),
            ..base
        };
        assert_eq!(EventAction::select(&create).unwrap(), EventAction::Create);
    }

    #[test]
    fn query_excludes_id_and_body() {
        let with_id = EventRequest {
            id: Some("1:x".into()),
            query: Some(vec![filter()]),
            ..EventRequest::default()
        };
        assert!(matches!(
            EventAction::select(&with_id),
            Err(CoreError::Config { .. })
        ));

        let with_body = EventRequest {
            body: Some(body()),
            query: Some(vec![filter()]),
            ..EventRequest::default()
        };
        assert!(EventAction::select(&with_body).is_err());
    }

    #[test]
    fn empty_inputs_count_as_absent() {
        let request = EventRequest {
            id: Some(String::new()),
            body: Some(Map::new()),
            query: Some(Vec::new()),
            ..EventRequest::default()
        };
        let err = EventAction::select(&request).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid module arguments: One of [id, query, body] is required"
        );
    }

    #[test]
    fn delete_flag_alone_is_not_enough() {
        let request = EventRequest {
            delete: true,
            ..EventRequest::default()
        };
        assert!(EventAction::select(&request).is_err());
    }

    #[test]
    fn empty_result_serializes_as_object() {
        let result = EventResult {
            action: EventAction::Get,
            event: None,
            request_body: None,
        };
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"action": "get", "event": {}})
        );
    }
}
