//! Embedded SQLite backend.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::types::{Type, Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection, Row};
use serde_json::{Map, Value};

use super::{check_column, migrations, Backend, Select};
use crate::error::BackendError;
use crate::model::{ColumnKind, Table};

/// SQLite database holding `rooms`, `bookings` and `sync_status`.
pub struct SqliteBackend {
    conn: Mutex<Connection>,
}

impl SqliteBackend {
    /// Open (creating if needed) the database file and apply migrations.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, BackendError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| BackendError::Unavailable(format!("{}: {e}", parent.display())))?;
        }
        Self::init(Connection::open(path)?)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, BackendError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, BackendError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        migrations::migrate(&conn)?;
        tracing::debug!("sqlite backend ready");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, BackendError> {
        self.conn
            .lock()
            .map_err(|_| BackendError::Unavailable("connection lock poisoned".into()))
    }

    fn select_rows(&self, query: &Select) -> Result<Vec<Value>, BackendError> {
        query.check_columns()?;

        let mut sql = format!("SELECT * FROM {}", query.table.name());
        let mut params = Vec::with_capacity(query.filters.len());
        for (i, filter) in query.filters.iter().enumerate() {
            sql.push_str(if i == 0 { " WHERE " } else { " AND " });
            sql.push_str(&format!("{} = ?{}", filter.column, i + 1));
            params.push(to_sql(query.table, &filter.column, &filter.value)?);
        }
        if let Some(order) = &query.order {
            let dir = if order.ascending { "ASC" } else { "DESC" };
            sql.push_str(&format!(" ORDER BY {} {dir}", order.column));
            if order.column != "id" {
                sql.push_str(&format!(", id {dir}"));
            }
        }
        if let Some(limit) = query.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(params), |row| row_to_json(query.table, row))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn insert_row(&self, table: Table, row: Value) -> Result<Value, BackendError> {
        let (columns, params) = assignments(table, row)?;
        let sql = if columns.is_empty() {
            format!("INSERT INTO {table} DEFAULT VALUES RETURNING *")
        } else {
            let placeholders = (1..=columns.len())
                .map(|i| format!("?{i}"))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "INSERT INTO {table} ({}) VALUES ({placeholders}) RETURNING *",
                columns.join(", ")
            )
        };

        let conn = self.conn()?;
        let stored = conn.query_row(&sql, params_from_iter(params), |r| row_to_json(table, r))?;
        Ok(stored)
    }

    fn update_row(&self, table: Table, id: i64, patch: Value) -> Result<Value, BackendError> {
        let (columns, mut params) = assignments(table, patch)?;
        if columns.is_empty() {
            let rows = self.select_rows(&Select::from(table).eq("id", id).limit(1))?;
            return rows.into_iter().next().ok_or(BackendError::NotFound);
        }

        let set = columns
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{c} = ?{}", i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {table} SET {set} WHERE id = ?{} RETURNING *",
            columns.len() + 1
        );
        params.push(SqlValue::Integer(id));

        let conn = self.conn()?;
        let stored = conn.query_row(&sql, params_from_iter(params), |r| row_to_json(table, r))?;
        Ok(stored)
    }

    fn delete_row(&self, table: Table, id: i64) -> Result<(), BackendError> {
        let conn = self.conn()?;
        let affected = conn.execute(&format!("DELETE FROM {table} WHERE id = ?1"), [id])?;
        if affected == 0 {
            return Err(BackendError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for SqliteBackend {
    async fn select(&self, query: &Select) -> Result<Vec<Value>, BackendError> {
        self.select_rows(query)
    }

    async fn insert(&self, table: Table, row: Value) -> Result<Value, BackendError> {
        self.insert_row(table, row)
    }

    async fn update(&self, table: Table, id: i64, patch: Value) -> Result<Value, BackendError> {
        self.update_row(table, id, patch)
    }

    async fn delete(&self, table: Table, id: i64) -> Result<(), BackendError> {
        self.delete_row(table, id)
    }
}

/// Split a JSON object into column names and bound values.
fn assignments(table: Table, row: Value) -> Result<(Vec<String>, Vec<SqlValue>), BackendError> {
    let Value::Object(fields) = row else {
        return Err(BackendError::Query(format!("expected a JSON object for {table}")));
    };
    let mut columns = Vec::with_capacity(fields.len());
    let mut params = Vec::with_capacity(fields.len());
    for (column, value) in fields {
        check_column(table, &column)?;
        params.push(to_sql(table, &column, &value)?);
        columns.push(column);
    }
    Ok((columns, params))
}

fn to_sql(table: Table, column: &str, value: &Value) -> Result<SqlValue, BackendError> {
    let kind = table.column_kind(column);
    Ok(match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        Value::Array(_) | Value::Object(_) if kind == Some(ColumnKind::Json) => {
            SqlValue::Text(value.to_string())
        }
        Value::Array(_) | Value::Object(_) => {
            return Err(BackendError::Query(format!(
                "column '{column}' of {table} does not hold structured values"
            )))
        }
    })
}

fn row_to_json(table: Table, row: &Row<'_>) -> rusqlite::Result<Value> {
    let stmt = row.as_ref();
    let mut object = Map::with_capacity(stmt.column_count());
    for idx in 0..stmt.column_count() {
        let name = stmt.column_name(idx)?;
        let kind = table.column_kind(name).unwrap_or(ColumnKind::Text);
        let value = match row.get_ref(idx)? {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) if kind == ColumnKind::Bool => Value::Bool(i != 0),
            ValueRef::Integer(i) => Value::from(i),
            ValueRef::Real(f) => Value::from(f),
            ValueRef::Text(bytes) => {
                let text = std::str::from_utf8(bytes)
                    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))?;
                if kind == ColumnKind::Json {
                    serde_json::from_str(text).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
                    })?
                } else {
                    Value::String(text.to_string())
                }
            }
            ValueRef::Blob(_) => {
                return Err(rusqlite::Error::InvalidColumnType(idx, name.to_string(), Type::Blob))
            }
        };
        object.insert(name.to_string(), value);
    }
    Ok(Value::Object(object))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Repository;
    use crate::model::{
        Booking, BookingInsert, BookingType, BookingUpdate, Room, RoomInsert, RoomUpdate,
        SyncStatusInsert,
    };
    use chrono::{TimeZone, Utc};

    fn room(name: &str) -> RoomInsert {
        RoomInsert {
            name: name.into(),
            capacity: 6,
            features: vec!["projector".into(), "whiteboard".into()],
        }
    }

    fn booking(room_id: i64, start: &str, end: &str) -> BookingInsert {
        BookingInsert {
            room_id,
            date: "2024-05-02".into(),
            start_time: start.into(),
            end_time: end.into(),
            booker: "grace@example.com".into(),
            purpose: Some("Retro".into()),
            booking_type: Some(BookingType::Meeting),
            is_quick_booking: Some(true),
        }
    }

    #[tokio::test]
    async fn test_room_lifecycle() {
        let db = SqliteBackend::open_memory().unwrap();
        let rooms = Repository::<Room>::new(&db);

        let created = rooms.insert(&room("Library")).await.unwrap();
        assert!(created.id > 0);
        assert!(created.created_at.is_some());
        assert_eq!(created.features, vec!["projector", "whiteboard"]);

        let patched = rooms
            .update(
                created.id,
                &RoomUpdate {
                    capacity: Some(10),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(patched.capacity, 10);
        assert_eq!(patched.name, "Library");

        rooms.delete(created.id).await.unwrap();
        assert!(matches!(rooms.get(created.id).await, Err(BackendError::NotFound)));
        assert!(matches!(rooms.delete(created.id).await, Err(BackendError::NotFound)));
    }

    #[tokio::test]
    async fn test_booking_round_trip_and_filter() {
        let db = SqliteBackend::open_memory().unwrap();
        let room_a = Repository::<Room>::new(&db).insert(&room("A")).await.unwrap();
        let room_b = Repository::<Room>::new(&db).insert(&room("B")).await.unwrap();
        let bookings = Repository::<Booking>::new(&db);

        bookings.insert(&booking(room_a.id, "13:00", "14:00")).await.unwrap();
        bookings.insert(&booking(room_a.id, "09:00", "09:30")).await.unwrap();
        bookings.insert(&booking(room_b.id, "09:00", "10:00")).await.unwrap();

        let in_a = bookings.for_room(room_a.id, Some("2024-05-02")).await.unwrap();
        assert_eq!(in_a.len(), 2);
        assert_eq!(in_a[0].start_time, "09:00");
        assert_eq!(in_a[0].is_quick_booking, Some(true));
        assert_eq!(in_a[0].booking_type, Some(BookingType::Meeting));
    }

    #[tokio::test]
    async fn test_schema_rejects_inverted_booking() {
        let db = SqliteBackend::open_memory().unwrap();
        let room = Repository::<Room>::new(&db).insert(&room("A")).await.unwrap();
        let bookings = Repository::<Booking>::new(&db);
        let stored = bookings.insert(&booking(room.id, "10:00", "11:00")).await.unwrap();

        let result = bookings
            .update(
                stored.id,
                &BookingUpdate {
                    end_time: Some("09:00".into()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(BackendError::Query(_))));
    }

    #[tokio::test]
    async fn test_latest_sync_status() {
        let db = SqliteBackend::open_memory().unwrap();
        assert!(matches!(db.latest_sync_status().await, Err(BackendError::NotFound)));

        for status in ["error", "ok"] {
            db.record_sync_status(&SyncStatusInsert {
                status: status.into(),
                last_sync: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                error_message: None,
            })
            .await
            .unwrap();
        }

        let latest = db.latest_sync_status().await.unwrap();
        assert_eq!(latest.status, "ok");
        assert_eq!(latest.last_sync, "2024-01-01T00:00:00Z");
        assert_eq!(latest.message(), None);
    }

    #[tokio::test]
    async fn test_missing_table_is_reported_as_query_error() {
        let db = SqliteBackend::open_memory().unwrap();
        db.conn().unwrap().execute_batch("DROP TABLE sync_status;").unwrap();

        let err = db.latest_sync_status().await.unwrap_err();
        assert!(matches!(err, BackendError::Query(_)));
        assert!(err.is_reported());
    }

    #[test]
    fn test_open_file_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("rooms.db");
        {
            let db = SqliteBackend::open(&path).unwrap();
            db.insert_row(Table::Rooms, serde_json::json!({"name": "Attic", "capacity": 3}))
                .unwrap();
        }
        let db = SqliteBackend::open(&path).unwrap();
        let rows = db.select_rows(&Select::from(Table::Rooms)).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["features"], serde_json::json!([]));
    }
}
