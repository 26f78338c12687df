// Event time window, in epoch milliseconds.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::body::value_kind;
use crate::error::CoreError;

/// Default look-back when no start time is given.
const DEFAULT_SPAN_MS: i64 = 60 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: i64,
    pub end: i64,
}

impl TimeWindow {
    /// Normalize raw `start_time`/`end_time` inputs.
    ///
    /// Absent bounds default to `now - 1h` and `now`. Integers pass
    /// through, strings are trimmed and parsed; anything else is a
    /// configuration error.
    pub fn from_inputs(
        start: Option<&Value>,
        end: Option<&Value>,
        now: DateTime<Utc>,
    ) -> Result<Self, CoreError> {
        let start = match start {
            Some(raw) => parse_millis("start_time", raw)?,
            None => now.timestamp_millis() - DEFAULT_SPAN_MS,
        };
        let end = match end {
            Some(raw) => parse_millis("end_time", raw)?,
            None => now.timestamp_millis(),
        };
        Ok(Self { start, end })
    }

    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }
}

fn parse_millis(input: &str, raw: &Value) -> Result<i64, CoreError> {
    let parsed = match raw {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| {
        CoreError::config(format!(
            "{input} must be an integer epoch-millisecond value, got {raw} of type {}",
            value_kind(raw)
        ))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()
    }

    #[test]
    fn defaults_cover_the_last_hour() {
        let window = TimeWindow::from_inputs(None, None, now()).unwrap();
        assert_eq!(window.end, 1_700_000_000_000);
        assert_eq!(window.start, 1_700_000_000_000 - 3_600_000);
        assert!(!window.is_inverted());
    }

    #[test]
    fn strings_are_trimmed_and_parsed() {
        let window =
            TimeWindow::from_inputs(Some(&json!(" 100 ")), Some(&json!(200)), now()).unwrap();
        assert_eq!(window, TimeWindow { start: 100, end: 200 });
    }

    #[test]
    fn inverted_window_is_allowed() {
        let window =
            TimeWindow::from_inputs(Some(&json!(500)), Some(&json!(100)), now()).unwrap();
        assert!(window.is_inverted());
    }

    #[test]
    fn non_numeric_input_names_the_input() {
        let err = TimeWindow::from_inputs(None, Some(&json!("later")), now()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("end_time"));
        assert!(message.contains("\"later\""));
        assert!(message.contains("string"));

        let err = TimeWindow::from_inputs(Some(&json!(1.5)), None, now()).unwrap_err();
        assert!(err.to_string().contains("float"));
    }
}
