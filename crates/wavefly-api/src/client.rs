// Wavefront v2 API HTTP client
//
// Wraps `reqwest::Client` with endpoint normalization, bearer auth,
// path-segment encoding and envelope unwrapping. Resource endpoints
// (alerts, events, sources) are inherent methods in sibling modules.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::{Envelope, ResponseStatus};
use crate::transport::TransportConfig;

/// Base path shared by every endpoint.
const API_PREFIX: [&str; 2] = ["api", "v2"];

#[derive(serde::Deserialize)]
struct ErrorEnvelope {
    status: Option<ResponseStatus>,
}

/// Async client for the Wavefront v2 REST API.
///
/// Sends `Authorization: Bearer <token>` on every request and returns
/// the `response` member of the envelope. Failures keep the envelope's
/// status message so callers can tell "does not exist" apart from real
/// errors.
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
}

impl Client {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from an endpoint, an API token and a transport config.
    ///
    /// `endpoint` may omit the scheme (`example.wavefront.com`), in which
    /// case `https://` is assumed.
    pub fn new(
        endpoint: &str,
        token: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|e| Error::Authentication {
                message: format!("invalid token header value: {e}"),
            })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = transport.build_client_with_headers(headers)?;
        let base_url = Self::normalize_endpoint(endpoint)?;
        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(endpoint: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_endpoint(endpoint)?;
        Ok(Self { http, base_url })
    }

    /// The normalized endpoint URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Parse an endpoint, defaulting the scheme to `https`.
    pub fn normalize_endpoint(raw: &str) -> Result<Url, Error> {
        let raw = raw.trim();
        let url = if raw.contains("://") {
            Url::parse(raw)?
        } else {
            Url::parse(&format!("https://{raw}"))?
        };

        if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
            return Err(Error::InvalidEndpoint(raw.into()));
        }
        Ok(url)
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Build `{endpoint}/api/v2/{segments...}`.
    ///
    /// Each segment is percent-encoded on its own, so ids like
    /// `1507307331000:CPU is > 90%` stay a single path segment.
    pub fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.path_segments_mut()
            .map_err(|()| Error::InvalidEndpoint(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(API_PREFIX)
            .extend(segments);
        Ok(url)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>, Error> {
        debug!("GET {url}");
        let resp = self.http.get(url).send().await?;
        Self::handle_response(resp).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<Option<T>, Error> {
        debug!("POST {url}");
        let resp = self.http.post(url).json(body).send().await?;
        Self::handle_response(resp).await
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<Option<T>, Error> {
        debug!("PUT {url}");
        let resp = self.http.put(url).json(body).send().await?;
        Self::handle_response(resp).await
    }

    /// PUT without a request body (tag assignment).
    pub(crate) async fn put_empty(&self, url: Url) -> Result<(), Error> {
        debug!("PUT {url}");
        let resp = self.http.put(url).send().await?;
        Self::handle_empty(resp).await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>, Error> {
        debug!("DELETE {url}");
        let resp = self.http.delete(url).send().await?;
        Self::handle_response(resp).await
    }

    pub(crate) async fn delete_empty(&self, url: Url) -> Result<(), Error> {
        debug!("DELETE {url}");
        let resp = self.http.delete(url).send().await?;
        Self::handle_empty(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    /// Decode the envelope and return its `response` member.
    async fn handle_response<T: DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<Option<T>, Error> {
        let status = resp.status();
        if !status.is_success() {
            return Err(Self::parse_error(status, resp).await);
        }

        let body = resp.text().await?;
        trace!(%status, len = body.len(), "response body received");
        let envelope: Envelope<T> = serde_json::from_str(&body).map_err(|e| {
            let preview = preview(&body);
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })?;
        Ok(envelope.response)
    }

    async fn handle_empty(resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::InvalidToken;
        }

        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .ok()
            .and_then(|env| env.status)
            .and_then(|s| s.message);

        debug!(status = status.as_u16(), ?message, "request rejected");
        Error::Api {
            status: status.as_u16(),
            message,
            body,
        }
    }
}

/// First 200 bytes of a body, cut on a char boundary.
fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
