//! Calendar v3 events on the authenticated user's primary calendar.

use std::sync::Arc;

use reqwest::Client;
use url::Url;

use super::oauth::OAuthClient;
use super::types::{CalendarEvent, EventList, NewEvent};
use super::check_status;
use crate::error::RemoteError;

/// Google's alias for the user's main calendar.
pub const PRIMARY_CALENDAR: &str = "primary";

/// Events client for the primary calendar.
pub struct CalendarClient {
    api_base: Url,
    oauth: Arc<OAuthClient>,
    http_client: Client,
}

impl CalendarClient {
    pub fn new(api_base: Url, oauth: Arc<OAuthClient>) -> Self {
        Self::with_http_client(api_base, oauth, Client::new())
    }

    pub fn with_http_client(api_base: Url, oauth: Arc<OAuthClient>, http_client: Client) -> Self {
        Self {
            api_base,
            oauth,
            http_client,
        }
    }

    /// `{api_base}/calendars/primary/events[/{event_id}]`, segments percent-encoded.
    fn events_url(&self, event_id: Option<&str>) -> Result<Url, RemoteError> {
        let mut url = self.api_base.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                RemoteError::InvalidRequest(format!("{} cannot be a base URL", self.api_base))
            })?;
            segments
                .pop_if_empty()
                .extend(["calendars", PRIMARY_CALENDAR, "events"]);
            if let Some(id) = event_id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    /// Single-instance events in `[time_min, time_max)`, ordered by start time.
    pub async fn list_events(
        &self,
        time_min: &str,
        time_max: &str,
    ) -> Result<Vec<CalendarEvent>, RemoteError> {
        let token = self.oauth.access_token()?;
        let url = self.events_url(None)?;

        tracing::debug!(time_min, time_max, "listing calendar events");
        let response = self
            .http_client
            .get(url)
            .bearer_auth(&token)
            .query(&[
                ("timeMin", time_min),
                ("timeMax", time_max),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
            ])
            .send()
            .await?;

        let list: EventList = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        Ok(list.items)
    }

    pub async fn insert_event(&self, event: &NewEvent) -> Result<CalendarEvent, RemoteError> {
        let token = self.oauth.access_token()?;
        let url = self.events_url(None)?;

        tracing::debug!(summary = %event.summary, "inserting calendar event");
        let response = self
            .http_client
            .post(url)
            .bearer_auth(&token)
            .json(event)
            .send()
            .await?;

        check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }

    pub async fn delete_event(&self, event_id: &str) -> Result<(), RemoteError> {
        let token = self.oauth.access_token()?;
        let url = self.events_url(Some(event_id))?;

        tracing::debug!(event_id, "deleting calendar event");
        let response = self
            .http_client
            .delete(url)
            .bearer_auth(&token)
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }
}
