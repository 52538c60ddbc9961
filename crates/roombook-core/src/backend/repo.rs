//! Typed access to one table through a [`Backend`].

use std::marker::PhantomData;

use serde_json::Value;

use super::{Backend, Select};
use crate::error::BackendError;
use crate::model::{Booking, TableRow};

/// Typed view over the table of `R`.
pub struct Repository<'a, R> {
    backend: &'a dyn Backend,
    _row: PhantomData<R>,
}

impl<'a, R: TableRow> Repository<'a, R> {
    pub fn new(backend: &'a dyn Backend) -> Self {
        Self {
            backend,
            _row: PhantomData,
        }
    }

    /// All rows, ordered by id.
    pub async fn list(&self) -> Result<Vec<R>, BackendError> {
        self.query(Select::from(R::TABLE).order_by("id", true)).await
    }

    /// Rows matching a custom select on this table.
    pub async fn query(&self, query: Select) -> Result<Vec<R>, BackendError> {
        debug_assert_eq!(query.table, R::TABLE);
        decode_rows(self.backend.select(&query).await?)
    }

    pub async fn get(&self, id: i64) -> Result<R, BackendError> {
        let query = Select::from(R::TABLE).eq("id", id).limit(1);
        self.query(query)
            .await?
            .into_iter()
            .next()
            .ok_or(BackendError::NotFound)
    }

    pub async fn insert(&self, row: &R::Insert) -> Result<R, BackendError> {
        let stored = self
            .backend
            .insert(R::TABLE, serde_json::to_value(row)?)
            .await?;
        Ok(serde_json::from_value(stored)?)
    }

    pub async fn update(&self, id: i64, patch: &R::Update) -> Result<R, BackendError> {
        let stored = self
            .backend
            .update(R::TABLE, id, serde_json::to_value(patch)?)
            .await?;
        Ok(serde_json::from_value(stored)?)
    }

    pub async fn delete(&self, id: i64) -> Result<(), BackendError> {
        self.backend.delete(R::TABLE, id).await
    }
}

impl Repository<'_, Booking> {
    /// Bookings of one room, optionally restricted to one date, in time order.
    pub async fn for_room(&self, room_id: i64, date: Option<&str>) -> Result<Vec<Booking>, BackendError> {
        let mut query = Select::from(Booking::TABLE).eq("room_id", room_id);
        if let Some(date) = date {
            query = query.eq("date", date);
        }
        let mut bookings = self.query(query.order_by("start_time", true)).await?;
        bookings.sort_by(|a, b| (&a.date, &a.start_time).cmp(&(&b.date, &b.start_time)));
        Ok(bookings)
    }
}

fn decode_rows<R: TableRow>(rows: Vec<Value>) -> Result<Vec<R>, BackendError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(BackendError::from))
        .collect()
}
