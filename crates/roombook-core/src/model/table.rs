//! Table catalogue shared by every backend.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// How a column is stored and mapped back to JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Text,
    Bool,
    /// Structured value (stored as JSON text by SQL backends).
    Json,
}

/// Tables known to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Rooms,
    Bookings,
    SyncStatus,
}

const ROOM_COLUMNS: &[(&str, ColumnKind)] = &[
    ("id", ColumnKind::Integer),
    ("name", ColumnKind::Text),
    ("capacity", ColumnKind::Integer),
    ("features", ColumnKind::Json),
    ("created_at", ColumnKind::Text),
];

const BOOKING_COLUMNS: &[(&str, ColumnKind)] = &[
    ("id", ColumnKind::Integer),
    ("room_id", ColumnKind::Integer),
    ("date", ColumnKind::Text),
    ("start_time", ColumnKind::Text),
    ("end_time", ColumnKind::Text),
    ("booker", ColumnKind::Text),
    ("purpose", ColumnKind::Text),
    ("booking_type", ColumnKind::Text),
    ("is_quick_booking", ColumnKind::Bool),
    ("created_at", ColumnKind::Text),
];

const SYNC_STATUS_COLUMNS: &[(&str, ColumnKind)] = &[
    ("id", ColumnKind::Integer),
    ("status", ColumnKind::Text),
    ("last_sync", ColumnKind::Text),
    ("error_message", ColumnKind::Text),
    ("created_at", ColumnKind::Text),
];

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Rooms => "rooms",
            Table::Bookings => "bookings",
            Table::SyncStatus => "sync_status",
        }
    }

    pub fn columns(&self) -> &'static [(&'static str, ColumnKind)] {
        match self {
            Table::Rooms => ROOM_COLUMNS,
            Table::Bookings => BOOKING_COLUMNS,
            Table::SyncStatus => SYNC_STATUS_COLUMNS,
        }
    }

    /// Kind of a column, or `None` if the table has no such column.
    pub fn column_kind(&self, column: &str) -> Option<ColumnKind> {
        self.columns()
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, kind)| *kind)
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A row type bound to its table and its insert / update shapes.
pub trait TableRow: Serialize + DeserializeOwned + Send + Sync {
    const TABLE: Table;
    type Insert: Serialize + Send + Sync;
    type Update: Serialize + Send + Sync;

    fn id(&self) -> i64;
}
