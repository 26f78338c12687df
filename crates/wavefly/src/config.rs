//! Translation from profiles plus global flags to a `ConnectionConfig`.
//!
//! This is the single place CLI overrides meet the config file; core only
//! ever sees the finished `ConnectionConfig`.

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;
use secrecy::SecretString;

use wavefly_config::{Config, Profile};
use wavefly_core::{ConnectionConfig, TlsMode};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Connection details plus the per-profile settings commands need.
#[derive(Debug)]
pub struct Resolved {
    pub connection: ConnectionConfig,
    pub event_attempts: u32,
}

/// Config file selected by `--config`, or the platform default.
pub fn path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(wavefly_config::config_path)
}

pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(wavefly_config::load_config_from(&path(global))?)
}

/// Resolve the active profile and apply flag overrides.
///
/// A profile named with `--profile` must exist. Without one, a missing
/// default profile is fine as long as `--endpoint` and a token are given.
pub fn resolve_connection(global: &GlobalOpts, cfg: &Config) -> Result<Resolved, CliError> {
    let name = cfg.active_profile_name(global.profile.as_deref());
    let profile = match cfg.profile(&name) {
        Ok(p) => p.clone(),
        Err(_) if global.profile.is_none() => Profile::default(),
        Err(err) => return Err(err.into()),
    };

    // 1. Endpoint (flag > env > profile)
    let endpoint = global
        .endpoint
        .clone()
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| profile.endpoint.clone());
    if endpoint.trim().is_empty() {
        return Err(CliError::NoEndpoint {
            path: path(global).display().to_string(),
        });
    }

    // 2. Token (flag > env > token_env > keyring > plaintext)
    let token = match global.token {
        Some(ref t) => SecretString::from(t.clone()),
        None => wavefly_config::resolve_token(&profile, &name, |var| std::env::var(var).ok())?,
    };

    // 3. TLS
    let tls = if global.insecure {
        TlsMode::DangerAcceptInvalid
    } else {
        profile.tls(&cfg.defaults)
    };

    // 4. Timeout (flag > profile > defaults)
    let timeout = global
        .timeout
        .map_or_else(|| profile.timeout(&cfg.defaults), Duration::from_secs);

    Ok(Resolved {
        connection: ConnectionConfig {
            endpoint,
            token,
            tls,
            timeout,
        },
        event_attempts: profile.event_attempts(&cfg.defaults).max(1),
    })
}

/// `--output` if given, else `[defaults] output` from the config file.
pub fn output_format(global: &GlobalOpts, cfg: &Config) -> Result<OutputFormat, CliError> {
    if let Some(format) = global.output {
        return Ok(format);
    }
    OutputFormat::from_str(&cfg.defaults.output, true).map_err(|_| CliError::Validation {
        field: "defaults.output".into(),
        reason: format!(
            "unknown output format '{}'. Valid: json, json-compact, yaml, table, plain",
            cfg.defaults.output
        ),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["wavefly"];
        argv.extend_from_slice(args);
        argv.extend_from_slice(&["alert", "42"]);
        Cli::try_parse_from(argv).unwrap().global
    }

    fn with_output(output: &str) -> Config {
        let mut cfg = Config::default();
        cfg.defaults.output = output.into();
        cfg
    }

    #[test]
    fn output_falls_back_to_config_default() {
        let cfg = with_output("yaml");
        assert_eq!(output_format(&global(&[]), &cfg).unwrap(), OutputFormat::Yaml);
        assert_eq!(
            output_format(&global(&["-o", "plain"]), &cfg).unwrap(),
            OutputFormat::Plain
        );
        assert_eq!(
            output_format(&global(&[]), &with_output("json-compact")).unwrap(),
            OutputFormat::JsonCompact
        );
    }

    #[test]
    fn unknown_output_default_is_rejected() {
        let err = output_format(&global(&[]), &with_output("xml")).unwrap_err();
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "defaults.output"));
    }

    #[test]
    fn named_profile_must_exist() {
        let cfg = Config::default();
        let err = resolve_connection(&global(&["--profile", "ghost"]), &cfg).unwrap_err();
        assert!(matches!(err, CliError::ProfileNotFound { ref name, .. } if name == "ghost"));
    }

    #[test]
    fn profile_supplies_tls_and_timeout() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "lab".into(),
            Profile {
                ca_cert: Some(PathBuf::from("/etc/wf/ca.pem")),
                timeout: Some(5),
                ..Profile::new("https://lab.wavefront.com")
            },
        );
        let resolved = resolve_connection(&global(&["--profile", "lab", "--token", "t"]), &cfg).unwrap();
        assert_eq!(
            resolved.connection.tls,
            TlsMode::CustomCa(PathBuf::from("/etc/wf/ca.pem"))
        );
        assert_eq!(resolved.connection.timeout, Duration::from_secs(5));
    }
}
