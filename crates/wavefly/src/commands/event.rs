//! Event command handler.

use serde_json::{Map, Value};
use wavefly_core::{Client, EventAction, EventRequest, QueryFilter, RetryPolicy, event};

use crate::cli::{EventArgs, GlobalOpts};
use crate::config::Resolved;
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(
    client: &Client,
    args: EventArgs,
    resolved: &Resolved,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let attempts = args.attempts.unwrap_or(resolved.event_attempts);
    let request = build_request(args)?;

    if EventAction::select(&request)? == EventAction::Delete {
        let id = request.id.as_deref().unwrap_or_default();
        if !util::confirm(&format!("Delete event {id}?"), "event delete", global.yes)? {
            return Ok(());
        }
    }

    let policy = RetryPolicy::event_writes().with_max_attempts(attempts);
    tracing::debug!(attempts, backoff = ?policy.worst_case_delay(), "event write retry budget");
    let outcome = event::run_event(client, &request, &policy).await?;
    let out = output::render_result(global, &outcome, event_ids)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn build_request(args: EventArgs) -> Result<EventRequest, CliError> {
    let body = match (args.body, args.body_file) {
        (Some(raw), _) => Some(util::parse_json(&raw, "body")?),
        (None, Some(path)) => Some(util::read_json_file(&path, "body-file")?),
        (None, None) => None,
    }
    .map(into_object)
    .transpose()?;

    let query = match (args.query, args.query_file) {
        (Some(raw), _) => Some(util::parse_json(&raw, "query")?),
        (None, Some(path)) => Some(util::read_json_file(&path, "query-file")?),
        (None, None) => None,
    }
    .map(into_filters)
    .transpose()?;

    let annotations = if args.annotations.is_empty() {
        None
    } else {
        let mut map = Map::new();
        for raw in &args.annotations {
            let (key, value) = util::split_key_value(raw, "annotation")?;
            map.insert(key.to_owned(), Value::String(value.to_owned()));
        }
        Some(map)
    };

    Ok(EventRequest {
        id: args.id,
        body,
        query,
        delete: args.delete,
        limit: args.limit,
        start_time: args.start_time.map(Value::String),
        end_time: args.end_time.map(Value::String),
        annotations,
    })
}

fn into_object(value: Value) -> Result<Map<String, Value>, CliError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(CliError::Validation {
            field: "body".into(),
            reason: format!("expected a JSON object, got {other}"),
        }),
    }
}

/// Accept a list of filters or a single filter object.
fn into_filters(value: Value) -> Result<Vec<QueryFilter>, CliError> {
    let value = match value {
        single @ Value::Object(_) => Value::Array(vec![single]),
        other => other,
    };
    serde_json::from_value(value).map_err(|e| CliError::Validation {
        field: "query".into(),
        reason: format!("expected [{{\"key\": .., \"value\": .., \"matchingMethod\": ..}}]: {e}"),
    })
}

/// Event ids in the result: one for single-event actions, one per hit
/// for a search.
fn event_ids(value: &Value) -> Vec<String> {
    let single = output::pointer_line(value, "/event/id");
    if !single.is_empty() {
        return single;
    }
    value
        .pointer("/event/items")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get("id").and_then(Value::as_str))
                .map(ToOwned::to_owned)
                .collect()
        })
        .unwrap_or_default()
}
