//! Google OAuth2 + Calendar v3 clients.

pub mod calendar;
pub mod oauth;
pub mod types;

pub use calendar::{CalendarClient, PRIMARY_CALENDAR};
pub use oauth::{OAuthClient, OAuthConfig, TokenSet, SCOPES};
pub use types::{CalendarEvent, EventDateTime, EventTime, NewEvent};

use reqwest::Response;
use serde_json::Value;

use crate::error::RemoteError;

/// Turn a non-success response into [`RemoteError::Api`].
///
/// Handles both the Calendar API shape (`{"error": {"message": ..}}`) and the
/// token endpoint shape (`{"error": "invalid_grant", "error_description": ..}`).
pub(crate) async fn check_status(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| error_message(&v))
        .unwrap_or(body);

    Err(RemoteError::Api {
        status: status.as_u16(),
        message,
    })
}

fn error_message(body: &Value) -> Option<String> {
    match body.get("error")? {
        Value::String(code) => Some(match body.get("error_description").and_then(Value::as_str) {
            Some(description) => format!("{code}: {description}"),
            None => code.clone(),
        }),
        Value::Object(err) => err.get("message").and_then(Value::as_str).map(String::from),
        _ => None,
    }
}
