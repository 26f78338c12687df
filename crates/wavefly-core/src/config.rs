// ── Runtime connection configuration ──
//
// Describes how to reach the API. The CLI resolves profiles and
// credentials, then hands a `ConnectionConfig` in; core never reads
// config files.

use std::time::Duration;

use secrecy::SecretString;
use wavefly_api::{Client, TlsMode, TransportConfig};

use crate::error::CoreError;

#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Cluster base URL (e.g. `https://example.wavefront.com`).
    pub endpoint: String,
    /// API token sent as a bearer credential.
    pub token: SecretString,
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl ConnectionConfig {
    pub fn new(endpoint: impl Into<String>, token: SecretString) -> Self {
        Self {
            endpoint: endpoint.into(),
            token,
            tls: TlsMode::default(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Build the API client.
    pub fn connect(&self) -> Result<Client, CoreError> {
        let transport = TransportConfig {
            tls: self.tls.clone(),
            timeout: self.timeout,
            ..TransportConfig::default()
        };
        Client::new(&self.endpoint, &self.token, &transport).map_err(|source| {
            CoreError::Connect {
                endpoint: self.endpoint.clone(),
                source,
            }
        })
    }
}
