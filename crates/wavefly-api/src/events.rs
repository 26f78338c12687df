// Event endpoints: CRUD on /api/v2/event plus /api/v2/search/event.

use tracing::debug;

use crate::client::Client;
use crate::error::Error;
use crate::models::{Event, EventSearch, Paged};

impl Client {
    /// `GET /api/v2/event/{id}`
    pub async fn get_event(&self, id: &str) -> Result<Option<Event>, Error> {
        let url = self.url(&["event", id])?;
        debug!(id, "fetching event");
        self.get(url).await
    }

    /// `POST /api/v2/event`
    pub async fn create_event(&self, body: &Event) -> Result<Option<Event>, Error> {
        let url = self.url(&["event"])?;
        debug!(name = ?body.name, "creating event");
        self.post(url, body).await
    }

    /// `PUT /api/v2/event/{id}`
    ///
    /// The body should carry the same `id`; without it the service
    /// re-keys the event to `0:<name>`.
    pub async fn update_event(&self, id: &str, body: &Event) -> Result<Option<Event>, Error> {
        let url = self.url(&["event", id])?;
        debug!(id, "updating event");
        self.put(url, body).await
    }

    /// `DELETE /api/v2/event/{id}`
    pub async fn delete_event(&self, id: &str) -> Result<Option<Event>, Error> {
        let url = self.url(&["event", id])?;
        debug!(id, "deleting event");
        self.delete(url).await
    }

    /// `POST /api/v2/search/event`
    pub async fn search_events(&self, search: &EventSearch) -> Result<Option<Paged<Event>>, Error> {
        let url = self.url(&["search", "event"])?;
        debug!(limit = search.limit, filters = search.query.len(), "searching events");
        self.post(url, search).await
    }
}
