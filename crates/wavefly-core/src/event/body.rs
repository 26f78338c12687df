// ── Event payload validation ──
//
// Free-form bodies are checked once, here, against the fixed event
// schema and turned into a typed `Event`. Every problem of a given kind
// is reported in one error.

use std::fmt;

use serde_json::{Map, Value};
use strum::Display;
use thiserror::Error;
use tracing::debug;
use wavefly_api::Event;

use super::window::TimeWindow;

/// Primitive type a schema field expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum FieldKind {
    #[strum(serialize = "string")]
    Str,
    Int,
    Bool,
    List,
    Map,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Server-assigned; rejected in update payloads.
    pub read_only: bool,
}

const fn field(name: &'static str, kind: FieldKind, read_only: bool) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        read_only,
    }
}

/// Every key an event payload may carry.
pub const EVENT_SCHEMA: [FieldSpec; 21] = [
    field("name", FieldKind::Str, false),
    field("annotations", FieldKind::Map, false),
    field("id", FieldKind::Str, true),
    field("table", FieldKind::Str, false),
    field("startTime", FieldKind::Int, false),
    field("endTime", FieldKind::Int, false),
    field("tags", FieldKind::List, false),
    field("createdAt", FieldKind::Int, true),
    field("hosts", FieldKind::List, false),
    field("isEphemeral", FieldKind::Bool, true),
    field("creatorId", FieldKind::Str, true),
    field("createdEpochMillis", FieldKind::Int, true),
    field("updatedEpochMillis", FieldKind::Int, true),
    field("updaterId", FieldKind::Str, true),
    field("updatedAt", FieldKind::Int, true),
    field("summarizedEvents", FieldKind::Int, true),
    field("isUserEvent", FieldKind::Bool, true),
    field("runningState", FieldKind::Str, true),
    field("canClose", FieldKind::Bool, true),
    field("creatorType", FieldKind::List, true),
    field("canDelete", FieldKind::Bool, true),
];

pub fn field_spec(name: &str) -> Option<&'static FieldSpec> {
    EVENT_SCHEMA.iter().find(|f| f.name == name)
}

pub fn read_only_fields() -> impl Iterator<Item = &'static str> {
    EVENT_SCHEMA.iter().filter(|f| f.read_only).map(|f| f.name)
}

fn all_fields() -> impl Iterator<Item = &'static str> {
    EVENT_SCHEMA.iter().map(|f| f.name)
}

// ── Errors ──────────────────────────────────────────────────────────

/// A field whose value could not be coerced to the schema type.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidField {
    pub field: String,
    pub value: Value,
    pub actual: &'static str,
    pub expected: FieldKind,
}

impl fmt::Display for InvalidField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "body item {} does not have the expected value type {}, for {}, instead it was {}.",
            self.field, self.expected, self.value, self.actual
        )
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BodyError {
    #[error(
        "Invalid body for updating event. [{}] are read-only. All read-only fields are [{}]. \
         Use annotations to carry free-form data, e.g. annotations.item = value",
        .fields.join(", "),
        read_only_fields().collect::<Vec<_>>().join(", ")
    )]
    ReadOnlyFields { fields: Vec<String> },

    #[error(
        "Invalid body for event. [{}] are not in the set of valid keys [{}]. \
         Use annotations to carry free-form data, e.g. annotations.item = value",
        .fields.join(", "),
        all_fields().collect::<Vec<_>>().join(", ")
    )]
    UnknownFields { fields: Vec<String> },

    #[error("{}\nCast these values to the expected types.", render_invalid(.0))]
    InvalidTypes(Vec<InvalidField>),

    #[error("Invalid body for event: {0}")]
    Decode(String),
}

impl BodyError {
    /// Names of every offending field.
    pub fn fields(&self) -> Vec<&str> {
        match self {
            Self::ReadOnlyFields { fields } | Self::UnknownFields { fields } => {
                fields.iter().map(String::as_str).collect()
            }
            Self::InvalidTypes(invalid) => invalid.iter().map(|i| i.field.as_str()).collect(),
            Self::Decode(_) => Vec::new(),
        }
    }
}

fn render_invalid(invalid: &[InvalidField]) -> String {
    invalid
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Validation ──────────────────────────────────────────────────────

/// Inputs besides the body that steer validation.
#[derive(Debug, Clone, Copy)]
pub struct BodyContext<'a> {
    /// Target event id, when one was supplied.
    pub id: Option<&'a str>,
    /// Top-level annotations input, merged into the body.
    pub annotations: Option<&'a Map<String, Value>>,
    pub window: TimeWindow,
}

impl BodyContext<'_> {
    /// No id and no annotations: the body describes a new event.
    pub fn is_create(&self) -> bool {
        self.id.is_none() && self.annotations.is_none()
    }
}

/// Check a free-form body against [`EVENT_SCHEMA`] and coerce it.
///
/// Create bodies get empty `annotations` and the time window's bounds
/// when they lack them. Update bodies may not carry read-only fields and
/// have the target `id` injected so the body names the same event as the
/// URL.
pub fn validate_body(mut body: Map<String, Value>, ctx: &BodyContext<'_>) -> Result<Event, BodyError> {
    if ctx.is_create() {
        debug!("validating event body for create");
        fill_missing(&mut body, "annotations", || Value::Object(Map::new()));
        fill_missing(&mut body, "startTime", || Value::from(ctx.window.start));
        fill_missing(&mut body, "endTime", || Value::from(ctx.window.end));
    } else {
        debug!(id = ?ctx.id, "validating event body for update");
        let read_only: Vec<String> = read_only_fields()
            .filter(|name| body.contains_key(*name))
            .map(String::from)
            .collect();
        if !read_only.is_empty() {
            return Err(BodyError::ReadOnlyFields { fields: read_only });
        }

        if let Some(extra) = ctx.annotations {
            merge_annotations(&mut body, extra);
        }
        if let Some(id) = ctx.id {
            body.insert("id".into(), Value::from(id));
        }
    }

    let unknown: Vec<String> = body
        .keys()
        .filter(|key| field_spec(key).is_none())
        .cloned()
        .collect();
    if !unknown.is_empty() {
        return Err(BodyError::UnknownFields { fields: unknown });
    }

    let mut invalid = Vec::new();
    for (key, value) in &mut body {
        let Some(spec) = field_spec(key) else {
            continue;
        };
        if matches_kind(spec.kind, value) {
            continue;
        }
        if let Some(coerced) = coerce(spec.kind, value) {
            debug!(field = %key, from = %value, to = %coerced, "coerced event field");
            *value = coerced;
        } else {
            invalid.push(InvalidField {
                field: key.clone(),
                value: value.clone(),
                actual: value_kind(value),
                expected: spec.kind,
            });
        }
    }
    if !invalid.is_empty() {
        return Err(BodyError::InvalidTypes(invalid));
    }

    serde_json::from_value(Value::Object(body)).map_err(|e| BodyError::Decode(e.to_string()))
}

fn fill_missing(body: &mut Map<String, Value>, key: &str, default: impl FnOnce() -> Value) {
    match body.get(key) {
        Some(v) if !v.is_null() => {}
        _ => {
            body.insert(key.into(), default());
        }
    }
}

fn merge_annotations(body: &mut Map<String, Value>, extra: &Map<String, Value>) {
    match body.get_mut("annotations") {
        Some(Value::Object(existing)) => {
            for (k, v) in extra {
                existing.insert(k.clone(), v.clone());
            }
        }
        None | Some(Value::Null) => {
            body.insert("annotations".into(), Value::Object(extra.clone()));
        }
        // A non-map value is left for the type check to report.
        Some(_) => {}
    }
}

// ── Coercion ────────────────────────────────────────────────────────

/// JSON type name used in error messages.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_i64() || n.is_u64() => "int",
        Value::Number(_) => "float",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}

fn matches_kind(kind: FieldKind, value: &Value) -> bool {
    match kind {
        FieldKind::Str => value.is_string(),
        FieldKind::Int => value.is_i64(),
        FieldKind::Bool => value.is_boolean(),
        FieldKind::List => value
            .as_array()
            .is_some_and(|items| items.iter().all(Value::is_string)),
        FieldKind::Map => value.is_object(),
    }
}

fn coerce(kind: FieldKind, value: &Value) -> Option<Value> {
    match kind {
        FieldKind::Str => to_text(value).map(Value::String),
        FieldKind::Int => to_int(value).map(Value::from),
        FieldKind::Bool => to_bool(value).map(Value::Bool),
        FieldKind::List => to_list(value),
        FieldKind::Map => to_map(value),
    }
}

fn to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => serde_json::to_string(value).ok(),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
fn to_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        },
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn to_list(value: &Value) -> Option<Value> {
    let items = match value {
        Value::Array(items) => items.clone(),
        Value::String(_) | Value::Number(_) | Value::Bool(_) => vec![value.clone()],
        Value::Null | Value::Object(_) => return None,
    };
    items
        .iter()
        .map(|item| match item {
            Value::String(_) | Value::Number(_) | Value::Bool(_) => to_text(item).map(Value::String),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        })
        .collect::<Option<Vec<_>>>()
        .map(Value::Array)
}

/// A list of `[key, value]` pairs becomes a map.
fn to_map(value: &Value) -> Option<Value> {
    let Value::Array(pairs) = value else {
        return None;
    };
    pairs
        .iter()
        .map(|pair| match pair.as_array().map(Vec::as_slice) {
            Some([Value::String(k), v]) => Some((k.clone(), v.clone())),
            _ => None,
        })
        .collect::<Option<Map<_, _>>>()
        .map(Value::Object)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    const WINDOW: TimeWindow = TimeWindow {
        start: 1_000,
        end: 2_000,
    };

    fn obj(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            other => panic!("expected object, got {other}"),
        }
    }

    fn create_ctx() -> BodyContext<'static> {
        BodyContext {
            id: None,
            annotations: None,
            window: WINDOW,
        }
    }

    fn update_ctx(id: &str) -> BodyContext<'_> {
        BodyContext {
            id: Some(id),
            annotations: None,
            window: WINDOW,
        }
    }

    #[test]
    fn schema_has_expected_shape() {
        assert_eq!(EVENT_SCHEMA.len(), 21);
        assert_eq!(read_only_fields().count(), 14);
        assert!(field_spec("startTime").is_some_and(|f| f.kind == FieldKind::Int));
        assert!(field_spec("details").is_none());
    }

    #[test]
    fn create_fills_annotations_and_window() {
        let event = validate_body(obj(json!({"name": "deploy"})), &create_ctx()).unwrap();
        assert_eq!(event.annotations, Some(Map::new()));
        assert_eq!(event.start_time, Some(1_000));
        assert_eq!(event.end_time, Some(2_000));
        assert_eq!(event.id, None);
    }

    #[test]
    fn create_keeps_caller_times() {
        let event = validate_body(
            obj(json!({"name": "deploy", "startTime": 5, "endTime": 9})),
            &create_ctx(),
        )
        .unwrap();
        assert_eq!(event.start_time, Some(5));
        assert_eq!(event.end_time, Some(9));
    }

    #[test]
    fn update_rejects_read_only_id() {
        let err = validate_body(obj(json!({"id": "x", "startTime": 5})), &update_ctx("x"))
            .unwrap_err();
        assert_eq!(
            err,
            BodyError::ReadOnlyFields {
                fields: vec!["id".into()]
            }
        );
        assert!(err.to_string().contains("[id] are read-only"));
    }

    #[test]
    fn update_lists_every_read_only_field() {
        let err = validate_body(
            obj(json!({"canDelete": true, "createdAt": 1, "runningState": "ONGOING"})),
            &update_ctx("x"),
        )
        .unwrap_err();
        assert_eq!(err.fields(), ["createdAt", "runningState", "canDelete"]);
    }

    #[test]
    fn update_injects_target_id() {
        let event = validate_body(obj(json!({"endTime": 99})), &update_ctx("5:deploy")).unwrap();
        assert_eq!(event.id.as_deref(), Some("5:deploy"));
        assert_eq!(event.end_time, Some(99));
        assert_eq!(event.annotations, None);
    }

    #[test]
    fn annotations_input_switches_to_update_and_merges() {
        let extra = obj(json!({"owner": "ops"}));
        let ctx = BodyContext {
            id: None,
            annotations: Some(&extra),
            window: WINDOW,
        };
        let event = validate_body(
            obj(json!({"name": "deploy", "annotations": {"severity": "info"}})),
            &ctx,
        )
        .unwrap();
        assert_eq!(
            event.annotations,
            Some(obj(json!({"severity": "info", "owner": "ops"})))
        );
        assert_eq!(event.start_time, None);
        assert_eq!(event.id, None);
    }

    #[test]
    fn unknown_keys_are_all_reported() {
        let err = validate_body(obj(json!({"name": "x", "foo": 1, "bar": 2})), &create_ctx())
            .unwrap_err();
        assert_eq!(
            err,
            BodyError::UnknownFields {
                fields: vec!["bar".into(), "foo".into()]
            }
        );
    }

    #[test]
    fn scalar_host_becomes_list() {
        let event = validate_body(obj(json!({"hosts": "not-a-list"})), &create_ctx()).unwrap();
        assert_eq!(event.hosts, Some(vec!["not-a-list".to_string()]));
    }

    #[test]
    fn coercions_for_each_kind() {
        let event = validate_body(
            obj(json!({
                "name": 42,
                "startTime": " 1500 ",
                "endTime": 2500.9,
                "tags": ["a", 7],
                "annotations": [["k", "v"]],
            })),
            &create_ctx(),
        )
        .unwrap();
        assert_eq!(event.name.as_deref(), Some("42"));
        assert_eq!(event.start_time, Some(1_500));
        assert_eq!(event.end_time, Some(2_500));
        assert_eq!(event.tags, Some(vec!["a".to_string(), "7".to_string()]));
        assert_eq!(event.annotations, Some(obj(json!({"k": "v"}))));
    }

    #[test]
    fn bool_strings_coerce() {
        assert_eq!(to_bool(&json!("Yes")), Some(true));
        assert_eq!(to_bool(&json!("off")), Some(false));
        assert_eq!(to_bool(&json!(0)), Some(false));
        assert_eq!(to_bool(&json!("maybe")), None);
    }

    #[test]
    fn uncoercible_fields_are_enumerated() {
        let err = validate_body(
            obj(json!({"startTime": "soon", "annotations": "nope", "name": "ok"})),
            &create_ctx(),
        )
        .unwrap_err();

        let BodyError::InvalidTypes(invalid) = &err else {
            panic!("expected InvalidTypes, got {err:?}");
        };
        assert_eq!(invalid.len(), 2);
        assert_eq!(err.fields(), ["annotations", "startTime"]);

        let start = invalid.iter().find(|i| i.field == "startTime").unwrap();
        assert_eq!(start.value, json!("soon"));
        assert_eq!(start.actual, "string");
        assert_eq!(start.expected, FieldKind::Int);

        let message = err.to_string();
        assert!(message.contains(
            "body item startTime does not have the expected value type int, for \"soon\", instead it was string."
        ));
        assert!(message.contains("body item annotations does not have the expected value type map"));
    }

    #[test]
    fn field_kind_names() {
        assert_eq!(FieldKind::Str.to_string(), "string");
        assert_eq!(FieldKind::Int.to_string(), "int");
        assert_eq!(FieldKind::Map.to_string(), "map");
    }
}
