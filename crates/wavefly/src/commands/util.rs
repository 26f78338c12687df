//! Shared helpers for command handlers.

use std::io::{self, IsTerminal};
use std::path::Path;

use serde_json::Value;

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal to prompt on, `--yes` is required.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(io::Error::other(e)))
}

/// Read and parse a JSON file given to a `--*-file` flag.
pub fn read_json_file(path: &Path, field: &str) -> Result<Value, CliError> {
    let contents = std::fs::read_to_string(path)?;
    parse_json(&contents, field)
}

/// Parse an inline JSON argument.
pub fn parse_json(raw: &str, field: &str) -> Result<Value, CliError> {
    serde_json::from_str(raw).map_err(|e| CliError::Validation {
        field: field.into(),
        reason: format!("invalid JSON: {e}"),
    })
}

/// Split a `KEY=VALUE` argument.
pub fn split_key_value<'a>(raw: &'a str, field: &str) -> Result<(&'a str, &'a str), CliError> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key, value)),
        _ => Err(CliError::Validation {
            field: field.into(),
            reason: format!("expected KEY=VALUE, got '{raw}'"),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn key_value_splits_on_first_equals() {
        assert_eq!(split_key_value("a=b=c", "x").unwrap(), ("a", "b=c"));
        assert_eq!(split_key_value("a=", "x").unwrap(), ("a", ""));
        assert!(split_key_value("=b", "x").is_err());
        assert!(split_key_value("ab", "x").is_err());
    }

    #[test]
    fn bad_json_names_the_flag() {
        let err = parse_json("{nope", "body").unwrap_err();
        assert!(err.to_string().contains("body"), "{err}");
    }
}
