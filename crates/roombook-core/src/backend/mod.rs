//! Backend table-query client.
//!
//! Backends speak JSON rows so one trait covers every table; [`Repository`]
//! adds the typed view on top. Two implementations ship:
//!
//! - [`SqliteBackend`]: embedded SQLite file (or in-memory for tests)
//! - [`RestBackend`]: PostgREST-style HTTP API of a hosted database

mod migrations;
pub mod repo;
pub mod rest;
pub mod sqlite;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::BackendError;
use crate::model::{SyncStatus, SyncStatusInsert, Table};

pub use repo::Repository;
pub use rest::RestBackend;
pub use sqlite::SqliteBackend;

/// Equality filter on one column.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

/// Sort order for a select.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// A filtered / ordered / limited select against one table.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub table: Table,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Select {
    pub fn from(table: Table) -> Self {
        Self {
            table,
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            column: column.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn order_by(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Reject columns the table does not have.
    pub(crate) fn check_columns(&self) -> Result<(), BackendError> {
        let columns = self
            .filters
            .iter()
            .map(|f| f.column.as_str())
            .chain(self.order.iter().map(|o| o.column.as_str()));
        for column in columns {
            check_column(self.table, column)?;
        }
        Ok(())
    }
}

pub(crate) fn check_column(table: Table, column: &str) -> Result<(), BackendError> {
    if table.column_kind(column).is_none() {
        return Err(BackendError::Query(format!(
            "column '{column}' does not exist on table '{table}'"
        )));
    }
    Ok(())
}

/// Generic table-query interface of the managed database.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Run a select, returning rows as JSON objects.
    async fn select(&self, query: &Select) -> Result<Vec<Value>, BackendError>;

    /// Insert one row; returns the stored row including server-assigned fields.
    async fn insert(&self, table: Table, row: Value) -> Result<Value, BackendError>;

    /// Patch the row with the given id; returns the updated row.
    async fn update(&self, table: Table, id: i64, patch: Value) -> Result<Value, BackendError>;

    /// Delete the row with the given id.
    async fn delete(&self, table: Table, id: i64) -> Result<(), BackendError>;

    /// Most recently created `sync_status` row.
    ///
    /// No row is [`BackendError::NotFound`].
    async fn latest_sync_status(&self) -> Result<SyncStatus, BackendError> {
        let query = Select::from(Table::SyncStatus)
            .order_by("created_at", false)
            .limit(1);
        let row = self
            .select(&query)
            .await?
            .into_iter()
            .next()
            .ok_or(BackendError::NotFound)?;
        Ok(serde_json::from_value(row)?)
    }

    /// Append a `sync_status` row.
    async fn record_sync_status(&self, status: &SyncStatusInsert) -> Result<SyncStatus, BackendError> {
        let row = self
            .insert(Table::SyncStatus, serde_json::to_value(status)?)
            .await?;
        Ok(serde_json::from_value(row)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_builder() {
        let q = Select::from(Table::Bookings)
            .eq("room_id", 4)
            .order_by("date", true)
            .limit(10);
        assert_eq!(q.filters.len(), 1);
        assert_eq!(q.filters[0].value, Value::from(4));
        assert_eq!(q.limit, Some(10));
        assert!(q.check_columns().is_ok());
    }

    #[test]
    fn test_select_rejects_unknown_column() {
        let q = Select::from(Table::Rooms).order_by("name; DROP TABLE rooms", true);
        assert!(matches!(q.check_columns(), Err(BackendError::Query(_))));
    }
}
