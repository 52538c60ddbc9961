//! Core error types for roombook-core.
//!
//! Calendar operations surface [`CalendarError`], whose variant names the
//! operation class that failed and whose source says what the remote side
//! (or the transport) reported. Backends surface [`BackendError`].

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for roombook-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Calendar integration errors
    #[error(transparent)]
    Calendar(#[from] CalendarError),

    /// Backend errors
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Failure of one of the propagating calendar operations.
#[derive(Error, Debug)]
pub enum CalendarError {
    /// The authorization code could not be exchanged for tokens.
    #[error("OAuth code exchange failed: {0}")]
    OAuthExchange(#[source] RemoteError),

    /// Listing events failed.
    #[error("Calendar query failed: {0}")]
    Query(#[source] RemoteError),

    /// Creating or deleting an event failed.
    #[error("Calendar write failed: {0}")]
    Write(#[source] RemoteError),
}

/// What the remote service or the transport reported.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// No credentials have been set on the OAuth client.
    #[error("not authenticated with Google")]
    NotAuthenticated,

    /// Request never produced a response.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-success HTTP status.
    #[error("HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body did not have the expected shape.
    #[error("invalid response: {0}")]
    Decode(String),

    /// The request could not be built from the configured endpoints.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Backend query client errors.
///
/// `Query` and `NotFound` are conditions the backend itself reported;
/// the remaining variants are unexpected failures around the call.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The backend rejected the query (missing table, access denied, bad column...).
    #[error("query rejected: {0}")]
    Query(String),

    /// No row matched.
    #[error("no matching row")]
    NotFound,

    /// The backend could not be reached or is locked.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// HTTP transport failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A row could not be converted.
    #[error("decode error: {0}")]
    Decode(String),
}

impl BackendError {
    /// Whether the backend itself answered with this condition.
    pub fn is_reported(&self) -> bool {
        matches!(self, BackendError::Query(_) | BackendError::NotFound)
    }
}

impl From<rusqlite::Error> for BackendError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _msg)
                if code.code == rusqlite::ErrorCode::DatabaseBusy
                    || code.code == rusqlite::ErrorCode::DatabaseLocked =>
            {
                BackendError::Unavailable(err.to_string())
            }
            rusqlite::Error::QueryReturnedNoRows => BackendError::NotFound,
            rusqlite::Error::FromSqlConversionFailure(..)
            | rusqlite::Error::InvalidColumnType(..) => BackendError::Decode(err.to_string()),
            _ => BackendError::Query(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::Decode(err.to_string())
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Home / data directory not usable
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid time range
    #[error("Invalid time range: end_time ({end}) must be after start_time ({start})")]
    InvalidTimeRange { start: String, end: String },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
