use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub const STATUS_OK: &str = "ok";
pub const STATUS_NOT_CONFIGURED: &str = "not_configured";
pub const STATUS_ERROR: &str = "error";

const NOT_CONFIGURED_MESSAGE: &str = "Google Calendar synchronization is not configured";
const UNAVAILABLE_MESSAGE: &str = "Could not retrieve synchronization status";

/// Last known state of calendar synchronization, as stored in `sync_status`.
///
/// Rows pass through untouched: timestamps keep the backend's text, an
/// explicit `null` stays `null`, and columns not modeled here land in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub status: String,
    pub last_sync: String,
    /// Outer `None` is an absent column, `Some(None)` a stored `null`.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub error_message: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub created_at: Option<Option<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl SyncStatus {
    /// Synthesized when the backend has no usable `sync_status` data.
    pub fn not_configured(now: DateTime<Utc>) -> Self {
        Self::synthesized(STATUS_NOT_CONFIGURED, NOT_CONFIGURED_MESSAGE, now)
    }

    /// Synthesized when retrieving the status failed unexpectedly.
    pub fn unavailable(now: DateTime<Utc>) -> Self {
        Self::synthesized(STATUS_ERROR, UNAVAILABLE_MESSAGE, now)
    }

    fn synthesized(status: &str, message: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: None,
            status: status.to_string(),
            last_sync: now.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            error_message: Some(Some(message.to_string())),
            created_at: None,
            extra: Map::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }

    pub fn message(&self) -> Option<&str> {
        self.error_message.as_ref().and_then(|m| m.as_deref())
    }

    /// `last_sync` as an instant. Timestamps without an offset are taken as UTC.
    pub fn last_sync_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.last_sync)
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Insert shape for recording a synchronization outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncStatusInsert {
    pub status: String,
    pub last_sync: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_minimal_row_round_trips_unchanged() {
        let raw = json!({"status": "ok", "last_sync": "2024-01-01T00:00:00Z"});
        let status: SyncStatus = serde_json::from_value(raw.clone()).unwrap();
        assert!(status.is_ok());
        assert_eq!(serde_json::to_value(&status).unwrap(), raw);
    }

    #[test]
    fn test_full_row_with_extra_columns_round_trips_unchanged() {
        let raw = json!({
            "id": 3,
            "status": "ok",
            "last_sync": "2024-01-01T00:00:00",
            "error_message": null,
            "created_at": "2024-01-01T00:00:05.123456",
            "calendar_id": "primary"
        });
        let status: SyncStatus = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(status.extra["calendar_id"], "primary");
        assert_eq!(status.message(), None);
        assert_eq!(serde_json::to_value(&status).unwrap(), raw);
    }

    #[test]
    fn test_last_sync_at_accepts_naive_and_offset_timestamps() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        for raw in [
            "2024-01-01T00:00:00Z",
            "2024-01-01T01:00:00+01:00",
            "2024-01-01T00:00:00",
            "2024-01-01 00:00:00",
        ] {
            let status: SyncStatus =
                serde_json::from_value(json!({"status": "ok", "last_sync": raw})).unwrap();
            assert_eq!(status.last_sync_at(), Some(expected), "{raw}");
        }
    }

    #[test]
    fn test_synthesized_statuses_differ() {
        let now = Utc::now();
        let a = SyncStatus::not_configured(now);
        let b = SyncStatus::unavailable(now);
        assert_eq!(a.status, STATUS_NOT_CONFIGURED);
        assert_eq!(b.status, STATUS_ERROR);
        assert_ne!(a.message(), b.message());
        assert_eq!(a.last_sync_at(), Some(now));
    }
}
