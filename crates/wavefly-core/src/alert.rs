// Alert reader: a single, unretried GET.

use serde::Serialize;
use serde_json::Value;
use wavefly_api::Client;

use crate::error::CoreError;
use crate::outcome::{Outcome, Warnings, endpoint, lookup, or_empty_object};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertResult {
    /// The alert as the API returned it; `{}` when it does not exist.
    #[serde(serialize_with = "or_empty_object")]
    pub alert: Option<Value>,
}

/// Fetch one alert by id. Never changes remote state.
pub async fn read_alert(client: &Client, alert_id: &str) -> Result<Outcome<AlertResult>, CoreError> {
    let mut warnings = Warnings::default();
    let alert = lookup(client.get_alert(alert_id).await, &mut warnings, || {
        format!(
            "Unable to query {} for alert_id {alert_id}",
            endpoint(client, &["alert", alert_id])
        )
    })?;
    Ok(Outcome::new(false, AlertResult { alert }).with_warnings(warnings.into_inner()))
}
