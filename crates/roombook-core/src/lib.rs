//! # roombook core library
//!
//! Data model and integration layer for a room-booking application:
//! rooms and bookings persisted in a database backend, and a bridge to the
//! user's primary Google Calendar.
//!
//! ## Architecture
//!
//! - **Model**: `Room`, `Booking` and `SyncStatus` rows with their insert and
//!   update shapes
//! - **Backend**: a generic table-query trait with SQLite and PostgREST
//!   implementations, plus a typed repository on top
//! - **Google**: OAuth2 authorization-code flow and Calendar v3 events
//! - **Integration**: the facade callers use, owning the OAuth credentials
//!
//! ## Key Components
//!
//! - [`CalendarIntegration`]: auth URL, callback, events, sync status
//! - [`Backend`]: table-query interface of the database
//! - [`Config`]: TOML + environment configuration

pub mod backend;
pub mod config;
pub mod error;
pub mod google;
pub mod integration;
pub mod model;

pub use backend::{Backend, Repository, RestBackend, Select, SqliteBackend};
pub use config::{BackendConfig, Config, GoogleConfig};
pub use error::{BackendError, CalendarError, ConfigError, CoreError, RemoteError, ValidationError};
pub use google::{CalendarEvent, EventDateTime, EventTime, NewEvent, TokenSet};
pub use integration::CalendarIntegration;
pub use model::{
    Booking, BookingInsert, BookingType, BookingUpdate, Room, RoomInsert, RoomUpdate, SyncStatus,
    SyncStatusInsert, Table, TableRow,
};
