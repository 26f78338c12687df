// ── Module results ──
//
// What a module reports back to its host: whether remote state changed,
// the module-specific payload, and any non-fatal warnings raised on the
// way.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::warn;

use crate::error::CoreError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome<T> {
    pub changed: bool,
    #[serde(flatten)]
    pub result: T,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl<T> Outcome<T> {
    pub fn new(changed: bool, result: T) -> Self {
        Self {
            changed,
            result,
            warnings: Vec::new(),
        }
    }

    pub(crate) fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }
}

/// Collects warnings and mirrors each one to the log.
#[derive(Debug, Default)]
pub(crate) struct Warnings(Vec<String>);

impl Warnings {
    pub(crate) fn push(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{message}");
        self.0.push(message);
    }

    pub(crate) fn into_inner(self) -> Vec<String> {
        self.0
    }
}

/// Serialize `None` as `{}`: absent resources read as an empty object.
pub(crate) fn or_empty_object<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    match value {
        Some(v) => v.serialize(serializer),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}

/// Interpret a read whose "does not exist" answer is a normal result.
///
/// - not found → `Ok(None)`
/// - success body that is not JSON at all → `Ok(None)` plus a warning
/// - anything else, including JSON of the wrong shape → fatal, with
///   `context` naming what was queried
pub(crate) fn lookup<T>(
    result: Result<Option<T>, wavefly_api::Error>,
    warnings: &mut Warnings,
    context: impl FnOnce() -> String,
) -> Result<Option<T>, CoreError> {
    match result {
        Ok(found) => Ok(found),
        Err(err) if err.is_not_found() => Ok(None),
        Err(wavefly_api::Error::Deserialization { message, body })
            if serde_json::from_str::<serde_json::Value>(&body).is_err() =>
        {
            warnings.push(format!("{}: response was not valid JSON ({message})", context()));
            Ok(None)
        }
        Err(err) => Err(CoreError::request(context(), err)),
    }
}

/// Display form of an API URL for error messages.
pub(crate) fn endpoint(client: &wavefly_api::Client, segments: &[&str]) -> String {
    client
        .url(segments)
        .map_or_else(|_| client.base_url().to_string(), |url| url.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[derive(Serialize)]
    struct Probe {
        #[serde(serialize_with = "or_empty_object")]
        thing: Option<u32>,
    }

    #[test]
    fn none_serializes_as_empty_object() {
        let outcome = Outcome::new(false, Probe { thing: None });
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"changed": false, "thing": {}})
        );
    }

    #[test]
    fn warnings_are_emitted_only_when_present() {
        let outcome = Outcome::new(true, Probe { thing: Some(3) })
            .with_warnings(vec!["careful".into()]);
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"changed": true, "thing": 3, "warnings": ["careful"]})
        );
    }

    #[test]
    fn lookup_absorbs_not_found_only() {
        let mut warnings = Warnings::default();
        let missing: Result<Option<u32>, _> = Err(wavefly_api::Error::Api {
            status: 404,
            message: Some("Source x does not exist".into()),
            body: String::new(),
        });
        assert_eq!(lookup(missing, &mut warnings, String::new).unwrap(), None);

        let broken: Result<Option<u32>, _> = Err(wavefly_api::Error::Api {
            status: 500,
            message: Some("boom".into()),
            body: String::new(),
        });
        let err = lookup(broken, &mut warnings, || "query x".into()).unwrap_err();
        assert!(err.to_string().starts_with("query x"));
        assert!(warnings.into_inner().is_empty());
    }

    #[test]
    fn lookup_tolerates_only_non_json_bodies() {
        let mut warnings = Warnings::default();
        let garbled: Result<Option<u32>, _> = Err(wavefly_api::Error::Deserialization {
            message: "expected value".into(),
            body: "<html>proxy</html>".into(),
        });
        assert_eq!(lookup(garbled, &mut warnings, || "query x".into()).unwrap(), None);
        assert_eq!(warnings.into_inner().len(), 1);

        let mut warnings = Warnings::default();
        let misshapen: Result<Option<u32>, _> = Err(wavefly_api::Error::Deserialization {
            message: "invalid type: string, expected u32".into(),
            body: r#"{"status": {"result": "OK", "code": 200}, "response": "nope"}"#.into(),
        });
        let err = lookup(misshapen, &mut warnings, || "query x".into()).unwrap_err();
        assert!(err.to_string().starts_with("query x"));
        assert!(warnings.into_inner().is_empty());
    }
}
