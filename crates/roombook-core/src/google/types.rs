//! Calendar v3 wire types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Start or end of an event as returned by the API.
///
/// Timed events carry `dateTime`; all-day events carry `date`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

/// An event on the remote calendar.
///
/// Fields not modeled here are kept in `extra` so the record is returned as
/// the service provided it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<EventDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<EventDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_link: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Start or end of an event to create: ISO date-time plus IANA zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    pub date_time: String,
    pub time_zone: String,
}

/// Request body for inserting an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
}

/// Body of `events.list`.
#[derive(Debug, Deserialize)]
pub(crate) struct EventList {
    #[serde(default)]
    pub items: Vec<CalendarEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_event_wire_format() {
        let event = NewEvent {
            summary: "Board meeting".into(),
            description: None,
            start: EventTime {
                date_time: "2024-06-01T10:00:00+02:00".into(),
                time_zone: "Europe/Stockholm".into(),
            },
            end: EventTime {
                date_time: "2024-06-01T11:00:00+02:00".into(),
                time_zone: "Europe/Stockholm".into(),
            },
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "summary": "Board meeting",
                "start": {"dateTime": "2024-06-01T10:00:00+02:00", "timeZone": "Europe/Stockholm"},
                "end": {"dateTime": "2024-06-01T11:00:00+02:00", "timeZone": "Europe/Stockholm"}
            })
        );
    }

    #[test]
    fn test_event_keeps_unmodeled_fields() {
        let raw = json!({
            "id": "abc",
            "summary": "Lunch",
            "start": {"date": "2024-06-01"},
            "end": {"date": "2024-06-02"},
            "etag": "\"3181161784712000\"",
            "organizer": {"email": "a@example.com"}
        });
        let event: CalendarEvent = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(event.extra["etag"], raw["etag"]);
        assert_eq!(event.start.unwrap().date.as_deref(), Some("2024-06-01"));
    }

    #[test]
    fn test_event_list_without_items() {
        let list: EventList = serde_json::from_value(json!({"kind": "calendar#events"})).unwrap();
        assert!(list.items.is_empty());
    }
}
