//! PostgREST-style HTTP backend, as exposed by hosted Postgres services.
//!
//! Tables live under `{url}/rest/v1/{table}`; filters are query parameters of
//! the form `column=eq.value`, ordering is `order=column.desc`.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;

use super::{check_column, Backend, Select};
use crate::error::BackendError;
use crate::model::Table;

/// Client for a PostgREST endpoint.
pub struct RestBackend {
    base_url: String,
    api_key: String,
    http_client: Client,
}

impl RestBackend {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            http_client: Client::new(),
        }
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/rest/v1/{}", self.base_url, table.name())
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// Send a write that asks for the affected rows back.
    async fn send_for_rows(&self, request: RequestBuilder) -> Result<Vec<Value>, BackendError> {
        let response = self
            .authorized(request)
            .header("Prefer", "return=representation")
            .send()
            .await?;
        rows(check_status(response).await?).await
    }
}

/// Query parameters for a select.
pub(crate) fn select_params(query: &Select) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];
    for filter in &query.filters {
        params.push((filter.column.clone(), format!("eq.{}", filter_value(&filter.value))));
    }
    if let Some(order) = &query.order {
        let dir = if order.ascending { "asc" } else { "desc" };
        params.push(("order".to_string(), format!("{}.{dir}", order.column)));
    }
    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    params
}

fn filter_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Map error responses; PostgREST reports `{code, message, details, hint}`.
async fn check_status(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| {
            let msg = v.get("message")?.as_str()?.to_string();
            Some(match v.get("code").and_then(Value::as_str) {
                Some(code) => format!("{code}: {msg}"),
                None => msg,
            })
        })
        .unwrap_or(body);

    if status == StatusCode::SERVICE_UNAVAILABLE {
        return Err(BackendError::Unavailable(message));
    }
    Err(BackendError::Query(format!("HTTP {}: {message}", status.as_u16())))
}

async fn rows(response: Response) -> Result<Vec<Value>, BackendError> {
    let body: Value = response
        .json()
        .await
        .map_err(|e| BackendError::Decode(e.to_string()))?;
    match body {
        Value::Array(rows) => Ok(rows),
        other => Err(BackendError::Decode(format!("expected an array of rows, got {other}"))),
    }
}

#[async_trait]
impl Backend for RestBackend {
    async fn select(&self, query: &Select) -> Result<Vec<Value>, BackendError> {
        query.check_columns()?;
        tracing::debug!(table = %query.table, "rest select");

        let request = self
            .http_client
            .get(self.table_url(query.table))
            .query(&select_params(query));
        let response = self.authorized(request).send().await?;
        rows(check_status(response).await?).await
    }

    async fn insert(&self, table: Table, row: Value) -> Result<Value, BackendError> {
        if let Value::Object(fields) = &row {
            for column in fields.keys() {
                check_column(table, column)?;
            }
        }
        tracing::debug!(%table, "rest insert");

        let request = self.http_client.post(self.table_url(table)).json(&row);
        self.send_for_rows(request)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::Decode("insert returned no row".into()))
    }

    async fn update(&self, table: Table, id: i64, patch: Value) -> Result<Value, BackendError> {
        if let Value::Object(fields) = &patch {
            for column in fields.keys() {
                check_column(table, column)?;
            }
        }
        tracing::debug!(%table, id, "rest update");

        let request = self
            .http_client
            .patch(self.table_url(table))
            .query(&[("id", format!("eq.{id}"))])
            .json(&patch);
        self.send_for_rows(request)
            .await?
            .into_iter()
            .next()
            .ok_or(BackendError::NotFound)
    }

    async fn delete(&self, table: Table, id: i64) -> Result<(), BackendError> {
        tracing::debug!(%table, id, "rest delete");

        let request = self
            .http_client
            .delete(self.table_url(table))
            .query(&[("id", format!("eq.{id}"))]);
        let deleted = self.send_for_rows(request).await?;
        if deleted.is_empty() {
            return Err(BackendError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[test]
    fn test_select_params() {
        let q = Select::from(Table::SyncStatus)
            .eq("status", "ok")
            .order_by("created_at", false)
            .limit(1);
        assert_eq!(
            select_params(&q),
            vec![
                ("select".to_string(), "*".to_string()),
                ("status".to_string(), "eq.ok".to_string()),
                ("order".to_string(), "created_at.desc".to_string()),
                ("limit".to_string(), "1".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_select_sends_key_and_filters() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/v1/bookings")
            .match_header("apikey", "anon-key")
            .match_header("authorization", "Bearer anon-key")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("room_id".into(), "eq.3".into()),
                Matcher::UrlEncoded("select".into(), "*".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[]")
            .create_async()
            .await;

        let backend = RestBackend::new(&server.url(), "anon-key");
        let rows = backend
            .select(&Select::from(Table::Bookings).eq("room_id", 3))
            .await
            .unwrap();
        assert!(rows.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_table_is_query_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/rest/v1/sync_status")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(r#"{"code":"42P01","message":"relation \"public.sync_status\" does not exist"}"#)
            .create_async()
            .await;

        let backend = RestBackend::new(&server.url(), "k");
        let err = backend.latest_sync_status().await.unwrap_err();
        match err {
            BackendError::Query(msg) => assert!(msg.contains("42P01")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_of_missing_row_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("PATCH", "/rest/v1/rooms")
            .match_query(Matcher::UrlEncoded("id".into(), "eq.99".into()))
            .match_header("prefer", "return=representation")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[]")
            .create_async()
            .await;

        let backend = RestBackend::new(&server.url(), "k");
        let err = backend
            .update(Table::Rooms, 99, serde_json::json!({"capacity": 4}))
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::NotFound));
    }

    #[tokio::test]
    async fn test_unknown_column_never_reaches_server() {
        let backend = RestBackend::new("http://127.0.0.1:9", "k");
        let err = backend
            .insert(Table::Rooms, serde_json::json!({"colour": "red"}))
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Query(_)));
    }
}
