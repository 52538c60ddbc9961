//! Persisted record shapes.
//!
//! Each table has a row type (what the backend returns), an insert shape
//! (server-assigned fields omitted) and an update shape (every mutable field
//! optional, absent fields left untouched).

pub mod booking;
pub mod room;
pub mod sync_status;
pub mod table;

pub use booking::{Booking, BookingInsert, BookingType, BookingUpdate};
pub use room::{Room, RoomInsert, RoomUpdate};
pub use sync_status::{SyncStatus, SyncStatusInsert};
pub use table::{ColumnKind, Table, TableRow};
