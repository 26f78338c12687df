// Alert endpoints (read-only).

use serde_json::Value;
use tracing::debug;

use crate::client::Client;
use crate::error::Error;

impl Client {
    /// Fetch a single alert.
    ///
    /// `GET /api/v2/alert/{id}`
    ///
    /// Alerts are passed through as opaque JSON.
    pub async fn get_alert(&self, id: &str) -> Result<Option<Value>, Error> {
        let url = self.url(&["alert", id])?;
        debug!(id, "fetching alert");
        self.get(url).await
    }
}
