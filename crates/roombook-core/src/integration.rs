//! Calendar integration facade.
//!
//! Every operation except [`CalendarIntegration::get_sync_status`] logs a
//! failure and returns it unchanged to the caller. Sync status is informational
//! and degrades to a synthesized record instead of failing.

use std::sync::Arc;

use chrono::Utc;

use crate::backend::Backend;
use crate::config::{Config, GoogleConfig};
use crate::error::{CalendarError, CoreError};
use crate::google::{CalendarClient, CalendarEvent, NewEvent, OAuthClient, TokenSet};
use crate::model::SyncStatus;

/// Bridges the application to Google Calendar and the backend's sync status.
///
/// Construct once and share; the OAuth credential slot lives here.
pub struct CalendarIntegration {
    oauth: Arc<OAuthClient>,
    calendar: CalendarClient,
    backend: Arc<dyn Backend>,
}

impl CalendarIntegration {
    pub fn new(google: &GoogleConfig, backend: Arc<dyn Backend>) -> Self {
        let oauth = Arc::new(OAuthClient::new(google.oauth_config()));
        let calendar = CalendarClient::new(google.api_base.clone(), Arc::clone(&oauth));
        Self {
            oauth,
            calendar,
            backend,
        }
    }

    /// Build from configuration, opening the configured backend.
    ///
    /// # Errors
    /// Returns an error if the backend cannot be opened.
    pub fn from_config(config: &Config) -> Result<Self, CoreError> {
        let backend = config.backend.open()?;
        Ok(Self::new(&config.google, backend))
    }

    pub fn oauth(&self) -> &OAuthClient {
        &self.oauth
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    /// Consent URL for the user to visit. Never fails.
    pub fn get_auth_url(&self) -> String {
        self.oauth.auth_url()
    }

    /// Exchange the callback's authorization code and keep the tokens.
    pub async fn handle_callback(&self, code: &str) -> Result<TokenSet, CalendarError> {
        self.oauth
            .exchange_code(code)
            .await
            .map_err(CalendarError::OAuthExchange)
            .inspect_err(|e| tracing::error!(error = %e, "failed to handle OAuth callback"))
    }

    /// Events on the primary calendar in `[time_min, time_max)`.
    pub async fn get_events(
        &self,
        time_min: &str,
        time_max: &str,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        self.calendar
            .list_events(time_min, time_max)
            .await
            .map_err(CalendarError::Query)
            .inspect_err(|e| tracing::error!(error = %e, "failed to fetch calendar events"))
    }

    /// Insert an event; repeated calls create repeated events.
    pub async fn create_event(&self, event: &NewEvent) -> Result<CalendarEvent, CalendarError> {
        self.calendar
            .insert_event(event)
            .await
            .map_err(CalendarError::Write)
            .inspect_err(|e| tracing::error!(error = %e, "failed to create calendar event"))
    }

    pub async fn delete_event(&self, event_id: &str) -> Result<(), CalendarError> {
        self.calendar
            .delete_event(event_id)
            .await
            .map_err(CalendarError::Write)
            .inspect_err(|e| {
                tracing::error!(error = %e, event_id, "failed to delete calendar event")
            })
    }

    /// Latest `sync_status` row, or a synthesized one.
    ///
    /// A condition the backend reports (missing table, denied access, no row)
    /// yields `not_configured`; any other failure yields `error`.
    pub async fn get_sync_status(&self) -> SyncStatus {
        match self.backend.latest_sync_status().await {
            Ok(status) => status,
            Err(e) if e.is_reported() => {
                tracing::info!(error = %e, "could not read sync_status");
                SyncStatus::not_configured(Utc::now())
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to retrieve synchronization status");
                SyncStatus::unavailable(Utc::now())
            }
        }
    }
}
