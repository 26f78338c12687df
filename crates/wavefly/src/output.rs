//! Output formatting: JSON, YAML, table, plain.
//!
//! Every command produces one serializable result object. Structured
//! formats serialize it as-is; `table` lays its top-level fields out as
//! rows and `plain` prints whatever the command picks as its identifiers.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::Value;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    value: String,
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a result object in the format selected by `--output`.
///
/// `plain_fn` receives the serialized object and returns the lines to
/// print in `plain` mode.
pub fn render_result<T: Serialize>(
    global: &GlobalOpts,
    data: &T,
    plain_fn: impl Fn(&Value) -> Vec<String>,
) -> Result<String, CliError> {
    match global.output.unwrap_or(OutputFormat::Json) {
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Table => {
            let value = serde_json::to_value(data)?;
            Ok(render_table(&value, should_color(&global.color)))
        }
        OutputFormat::Plain => {
            let value = serde_json::to_value(data)?;
            Ok(plain_fn(&value).join("\n"))
        }
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table(value: &Value, color: bool) -> String {
    let rows: Vec<FieldRow> = match value {
        Value::Object(map) => map
            .iter()
            .map(|(field, v)| FieldRow {
                field: field.clone(),
                value: cell(field, v, color),
            })
            .collect(),
        other => vec![FieldRow {
            field: "value".into(),
            value: cell("value", other, color),
        }],
    };
    Table::new(rows).with(Style::rounded()).to_string()
}

fn cell(field: &str, value: &Value, color: bool) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Array(items) if items.iter().all(Value::is_string) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Object(_) | Value::Array(_) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
        _ => value.to_string(),
    };

    match (color, field, value) {
        (true, "changed", Value::Bool(true)) => text.yellow().to_string(),
        (true, "changed", Value::Bool(false)) => text.green().to_string(),
        (true, "warnings", _) => text.red().to_string(),
        _ => text,
    }
}

fn render_json<T: Serialize + ?Sized>(data: &T, compact: bool) -> Result<String, CliError> {
    let out = if compact {
        serde_json::to_string(data)?
    } else {
        serde_json::to_string_pretty(data)?
    };
    Ok(out)
}

fn render_yaml<T: Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    Ok(serde_yaml::to_string(data)?)
}

// ── Plain helpers ────────────────────────────────────────────────────

/// String items of the array at `key`.
pub fn string_items(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(ToOwned::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

/// The string at a JSON pointer, as a one-line list.
pub fn pointer_line(value: &Value, pointer: &str) -> Vec<String> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(|s| vec![s.to_owned()])
        .unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn table_lists_top_level_fields() {
        let out = render_table(&json!({"changed": true, "tags": ["a", "b"]}), false);
        assert!(out.contains("changed"));
        assert!(out.contains("true"));
        assert!(out.contains("tags"));
        assert!(!out.contains('['), "string lists render one per line:\n{out}");
    }

    #[test]
    fn plain_helpers_pick_values() {
        let value = json!({"tags": ["a", "b"], "event": {"id": "1:x"}});
        assert_eq!(string_items(&value, "tags"), ["a", "b"]);
        assert_eq!(pointer_line(&value, "/event/id"), ["1:x"]);
        assert!(pointer_line(&value, "/source/id").is_empty());
    }
}
