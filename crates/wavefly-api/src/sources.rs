// Source and source-tag endpoints.

use tracing::debug;

use crate::client::Client;
use crate::error::Error;
use crate::models::{Paged, Source, SourcePayload};

impl Client {
    /// `GET /api/v2/source/{name}`
    pub async fn get_source(&self, name: &str) -> Result<Option<Source>, Error> {
        let url = self.url(&["source", name])?;
        debug!(name, "fetching source");
        self.get(url).await
    }

    /// `POST /api/v2/source`
    pub async fn create_source(&self, payload: &SourcePayload) -> Result<Option<Source>, Error> {
        let url = self.url(&["source"])?;
        debug!(name = %payload.source_name, "creating source");
        self.post(url, payload).await
    }

    /// `PUT /api/v2/source/{name}`
    pub async fn update_source(
        &self,
        name: &str,
        payload: &SourcePayload,
    ) -> Result<Option<Source>, Error> {
        let url = self.url(&["source", name])?;
        debug!(name, "updating source");
        self.put(url, payload).await
    }

    // ── Tags ─────────────────────────────────────────────────────────

    /// Current tags of a source.
    ///
    /// `GET /api/v2/source/{name}/tag`
    pub async fn list_source_tags(&self, name: &str) -> Result<Vec<String>, Error> {
        let url = self.url(&["source", name, "tag"])?;
        debug!(name, "listing source tags");
        let page: Option<Paged<String>> = self.get(url).await?;
        Ok(page.map(|p| p.items).unwrap_or_default())
    }

    /// `PUT /api/v2/source/{name}/tag/{tag}`
    pub async fn add_source_tag(&self, name: &str, tag: &str) -> Result<(), Error> {
        let url = self.url(&["source", name, "tag", tag])?;
        debug!(name, tag, "adding source tag");
        self.put_empty(url).await
    }

    /// `DELETE /api/v2/source/{name}/tag/{tag}`
    pub async fn remove_source_tag(&self, name: &str, tag: &str) -> Result<(), Error> {
        let url = self.url(&["source", name, "tag", tag])?;
        debug!(name, tag, "removing source tag");
        self.delete_empty(url).await
    }
}
