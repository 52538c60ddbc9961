use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::table::{Table, TableRow};
use crate::error::ValidationError;

/// Kind of booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingType {
    Meeting,
    Presentation,
    Workshop,
    Internal,
    External,
}

impl std::str::FromStr for BookingType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "meeting" => Ok(BookingType::Meeting),
            "presentation" => Ok(BookingType::Presentation),
            "workshop" => Ok(BookingType::Workshop),
            "internal" => Ok(BookingType::Internal),
            "external" => Ok(BookingType::External),
            _ => Err(ValidationError::InvalidValue {
                field: "booking_type".into(),
                message: format!("unknown booking type: {s}"),
            }),
        }
    }
}

/// A reservation of one room for one time interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    /// Back-reference to [`super::Room::id`].
    pub room_id: i64,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub booker: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_type: Option<BookingType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_quick_booking: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Insert shape: `id` and `created_at` are assigned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingInsert {
    pub room_id: i64,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub booker: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_type: Option<BookingType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_quick_booking: Option<bool>,
}

/// Partial patch of a booking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_type: Option<BookingType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_quick_booking: Option<bool>,
}

impl Booking {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_slot(&self.date, &self.start_time, &self.end_time)
    }

    /// Apply a patch locally, returning the patched booking.
    pub fn patched(&self, patch: &BookingUpdate) -> Booking {
        let mut next = self.clone();
        if let Some(room_id) = patch.room_id {
            next.room_id = room_id;
        }
        if let Some(date) = &patch.date {
            next.date = date.clone();
        }
        if let Some(start) = &patch.start_time {
            next.start_time = start.clone();
        }
        if let Some(end) = &patch.end_time {
            next.end_time = end.clone();
        }
        if let Some(booker) = &patch.booker {
            next.booker = booker.clone();
        }
        if patch.purpose.is_some() {
            next.purpose = patch.purpose.clone();
        }
        if patch.booking_type.is_some() {
            next.booking_type = patch.booking_type;
        }
        if patch.is_quick_booking.is_some() {
            next.is_quick_booking = patch.is_quick_booking;
        }
        next
    }
}

impl BookingInsert {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.booker.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "booker".into(),
                message: "must not be empty".into(),
            });
        }
        validate_slot(&self.date, &self.start_time, &self.end_time)
    }
}

impl BookingUpdate {
    pub fn is_empty(&self) -> bool {
        self == &BookingUpdate::default()
    }
}

/// Check the date format and `start_time < end_time`.
///
/// Only the zero-padded forms are accepted, so text order matches time order
/// in the schema `CHECK` and in `ORDER BY start_time`.
fn validate_slot(date: &str, start: &str, end: &str) -> Result<(), ValidationError> {
    parse_canonical("date", date, &["%Y-%m-%d"], NaiveDate::parse_from_str, |d, f| {
        d.format(f).to_string()
    })?;
    let start_at = parse_time("start_time", start)?;
    let end_at = parse_time("end_time", end)?;
    if start_at >= end_at {
        return Err(ValidationError::InvalidTimeRange {
            start: start.to_string(),
            end: end.to_string(),
        });
    }
    Ok(())
}

/// Accepts `HH:MM` and `HH:MM:SS`.
fn parse_time(field: &str, value: &str) -> Result<NaiveTime, ValidationError> {
    parse_canonical(
        field,
        value,
        &["%H:%M", "%H:%M:%S"],
        NaiveTime::parse_from_str,
        |t, f| t.format(f).to_string(),
    )
}

/// Parse with the first matching format, rejecting input that does not
/// format back to itself (`9:00`, `2024-1-5`).
fn parse_canonical<T, E: std::fmt::Display>(
    field: &str,
    value: &str,
    formats: &[&str],
    parse: impl Fn(&str, &str) -> Result<T, E>,
    render: impl Fn(&T, &str) -> String,
) -> Result<T, ValidationError> {
    let mut last_err = None;
    for fmt in formats {
        match parse(value, fmt) {
            Ok(parsed) if render(&parsed, fmt) == value => return Ok(parsed),
            Ok(_) => last_err = Some("expected zero-padded form".to_string()),
            Err(e) => last_err = Some(e.to_string()),
        }
    }
    Err(ValidationError::InvalidValue {
        field: field.into(),
        message: format!("{value}: {}", last_err.unwrap_or_default()),
    })
}

impl TableRow for Booking {
    const TABLE: Table = Table::Bookings;
    type Insert = BookingInsert;
    type Update = BookingUpdate;

    fn id(&self) -> i64 {
        self.id
    }
}
