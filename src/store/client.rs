// Supabase client - PostgREST over reqwest
//
// `SupabaseClient` is the cheap, cloneable handle repositories hold. Requests
// are assembled with `QueryBuilder` and shipped by a `StoreTransport`; the
// production transport talks to the REST API, tests swap in their own.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use serde_json::Value;

use super::query::{Filter, Operation, Order, Query, Row};
use crate::error::{StoreError, RANGE_NOT_SATISFIABLE_CODE};

/// Rows returned by a request, plus the exact count when one was asked for
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreResponse {
    pub rows: Vec<Row>,
    pub count: Option<u64>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StoreTransport: Send + Sync {
    /// Run one table request
    async fn execute(&self, query: Query) -> Result<StoreResponse, StoreError>;

    /// Remove a user from the auth schema (admin API)
    async fn delete_auth_user(&self, user_id: &str) -> Result<(), StoreError>;
}

// ============================================================================
// PostgREST transport
// ============================================================================

pub struct PostgrestTransport {
    client: Client,
    base_url: String,
    api_key: String,
}

impl PostgrestTransport {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn build_request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }
}

#[async_trait]
impl StoreTransport for PostgrestTransport {
    async fn execute(&self, query: Query) -> Result<StoreResponse, StoreError> {
        let url = format!("{}/rest/v1/{}", self.base_url, query.table);
        let params = query.params();

        tracing::debug!("Store {} {} {:?}", query.method(), query.table, params);

        let mut request = self.build_request(query.method(), &url).query(&params);
        if let Some(prefer) = query.prefer() {
            request = request.header("Prefer", prefer);
        }
        if query.single {
            request = request.header("Accept", "application/vnd.pgrst.object+json");
        }
        if let Some(body) = query.body() {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        into_response(status, &headers, &body, &query)
    }

    async fn delete_auth_user(&self, user_id: &str) -> Result<(), StoreError> {
        let url = format!(
            "{}/auth/v1/admin/users/{}",
            self.base_url,
            urlencoding::encode(user_id)
        );

        let response = self.build_request(reqwest::Method::DELETE, &url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Failed to delete auth user {}: {} - {}", user_id, status, error_text);
            return Err(StoreError::from_response(status.as_u16(), &error_text));
        }

        tracing::info!("Deleted auth user {}", user_id);
        Ok(())
    }
}

/// Turn a PostgREST reply into rows and count, or the error it carries
fn into_response(
    status: StatusCode,
    headers: &HeaderMap,
    body: &str,
    query: &Query,
) -> Result<StoreResponse, StoreError> {
    let count = parse_content_range(headers);

    if !status.is_success() {
        let error = StoreError::from_response(status.as_u16(), body);

        // Offset past the last row: an empty page, not a failure
        if status == StatusCode::RANGE_NOT_SATISFIABLE
            || matches!(&error, StoreError::Api { code: Some(code), .. } if code == RANGE_NOT_SATISFIABLE_CODE)
        {
            return Ok(StoreResponse { rows: Vec::new(), count });
        }

        if !error.is_not_found() {
            tracing::error!("Store error on {}: {} - {}", query.table, status, body);
        }
        return Err(error);
    }

    if query.head {
        return Ok(StoreResponse { rows: Vec::new(), count });
    }

    let rows = parse_rows(&query.table, body)?;
    Ok(StoreResponse { rows, count })
}

/// Total from `Content-Range: 0-9/42` (or `*/42` for an empty range)
fn parse_content_range(headers: &HeaderMap) -> Option<u64> {
    headers
        .get("content-range")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.rsplit('/').next())
        .and_then(|total| total.parse().ok())
}

fn parse_rows(table: &str, text: &str) -> Result<Vec<Row>, StoreError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let value: Value = serde_json::from_str(text).map_err(|e| StoreError::decode(table, e))?;
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(row) => Ok(row),
                other => Err(unexpected_shape(table, &other)),
            })
            .collect(),
        Value::Object(row) => Ok(vec![row]),
        other => Err(unexpected_shape(table, &other)),
    }
}

fn unexpected_shape(table: &str, value: &Value) -> StoreError {
    StoreError::Validation(format!("unexpected response shape from {}: {}", table, value))
}

// ============================================================================
// Client handle and query builder
// ============================================================================

/// Shared handle to the store; clones share one transport
#[derive(Clone)]
pub struct SupabaseClient {
    transport: Arc<dyn StoreTransport>,
}

impl SupabaseClient {
    pub fn new(url: &str, service_key: &str) -> Self {
        Self::with_transport(Arc::new(PostgrestTransport::new(url, service_key)))
    }

    pub fn with_transport(transport: Arc<dyn StoreTransport>) -> Self {
        Self { transport }
    }

    /// Start a query against `table`
    pub fn from(&self, table: &str) -> QueryBuilder {
        QueryBuilder {
            transport: Arc::clone(&self.transport),
            query: Query::new(table),
        }
    }

    pub async fn delete_auth_user(&self, user_id: &str) -> Result<(), StoreError> {
        self.transport.delete_auth_user(user_id).await
    }
}

/// Chainable builder over a `Query`, modelled on the supabase-js API
#[must_use]
pub struct QueryBuilder {
    transport: Arc<dyn StoreTransport>,
    query: Query,
}

impl QueryBuilder {
    pub fn select(mut self, columns: &str) -> Self {
        self.query.operation = Operation::Select {
            columns: columns.to_string(),
        };
        self
    }

    pub fn count_exact(mut self) -> Self {
        self.query.count = true;
        self
    }

    /// Only the count is wanted
    pub fn head(mut self) -> Self {
        self.query.head = true;
        self
    }

    pub fn insert(self, row: Row) -> Self {
        self.insert_many(vec![row])
    }

    pub fn insert_many(mut self, rows: Vec<Row>) -> Self {
        self.query.operation = Operation::Insert { rows };
        self
    }

    pub fn upsert(mut self, row: Row, on_conflict: &str) -> Self {
        self.query.operation = Operation::Upsert {
            rows: vec![row],
            on_conflict: on_conflict.to_string(),
        };
        self
    }

    pub fn update(mut self, values: Row) -> Self {
        self.query.operation = Operation::Update { values };
        self
    }

    pub fn delete(mut self) -> Self {
        self.query.operation = Operation::Delete;
        self
    }

    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.query
            .filters
            .push(Filter::Eq(column.to_string(), value.to_string()));
        self
    }

    pub fn gte(mut self, column: &str, value: impl ToString) -> Self {
        self.query
            .filters
            .push(Filter::Gte(column.to_string(), value.to_string()));
        self
    }

    pub fn lte(mut self, column: &str, value: impl ToString) -> Self {
        self.query
            .filters
            .push(Filter::Lte(column.to_string(), value.to_string()));
        self
    }

    pub fn in_(mut self, column: &str, values: &[String]) -> Self {
        self.query
            .filters
            .push(Filter::In(column.to_string(), values.to_vec()));
        self
    }

    /// Match when any of `filters` matches
    pub fn or(mut self, filters: Vec<Filter>) -> Self {
        self.query.filters.push(Filter::Or(filters));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.query.orders.push(Order {
            column: column.to_string(),
            ascending,
            nulls_first: None,
        });
        self
    }

    pub fn order_nulls(mut self, column: &str, ascending: bool, nulls_first: bool) -> Self {
        self.query.orders.push(Order {
            column: column.to_string(),
            ascending,
            nulls_first: Some(nulls_first),
        });
        self
    }

    /// Inclusive row range, as in `range(0, 9)` for the first ten rows
    pub fn range(mut self, from: u64, to: u64) -> Self {
        self.query.offset = Some(from);
        self.query.limit = Some(to.saturating_sub(from) + 1);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.query.limit = Some(limit);
        self
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub async fn execute(self) -> Result<StoreResponse, StoreError> {
        self.transport.execute(self.query).await
    }

    /// Expect exactly one row; zero rows is a not-found error
    pub async fn single(mut self) -> Result<Row, StoreError> {
        self.query.single = true;
        let table = self.query.table.clone();
        let response = self.transport.execute(self.query).await?;
        response
            .rows
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::not_found(&table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_content_range() {
        let mut headers = HeaderMap::new();
        headers.insert("content-range", "0-9/42".parse().unwrap());
        assert_eq!(parse_content_range(&headers), Some(42));

        headers.insert("content-range", "*/7".parse().unwrap());
        assert_eq!(parse_content_range(&headers), Some(7));

        headers.insert("content-range", "0-9/*".parse().unwrap());
        assert_eq!(parse_content_range(&headers), None);
    }

    fn headers(content_range: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("content-range", content_range.parse().unwrap());
        headers
    }

    #[test]
    fn test_range_past_the_end_is_an_empty_page() {
        let query = Query::new("todos");
        let body = r#"{"code":"PGRST103","details":"An offset of 20 was requested, but there are only 15 rows.","hint":null,"message":"Requested range not satisfiable"}"#;

        let response = into_response(StatusCode::RANGE_NOT_SATISFIABLE, &headers("*/15"), body, &query).unwrap();

        assert!(response.rows.is_empty());
        assert_eq!(response.count, Some(15));
    }

    #[test]
    fn test_single_object_miss_is_not_found() {
        let mut query = Query::new("todos");
        query.single = true;
        let body = r#"{"code":"PGRST116","details":"The result contains 0 rows","hint":null,"message":"JSON object requested, multiple (or no) rows returned"}"#;

        let err = into_response(StatusCode::NOT_ACCEPTABLE, &HeaderMap::new(), body, &query).unwrap_err();

        assert!(err.is_not_found());
    }

    #[test]
    fn test_conflict_stays_an_api_error() {
        let query = Query::new("todos");
        let body = r#"{"code":"23505","details":"Key (id)=(t1) already exists.","hint":null,"message":"duplicate key value violates unique constraint"}"#;

        let err = into_response(StatusCode::CONFLICT, &HeaderMap::new(), body, &query).unwrap_err();

        assert!(!err.is_not_found());
        match err {
            StoreError::Api { status, code, .. } => {
                assert_eq!(status, 409);
                assert_eq!(code.as_deref(), Some("23505"));
            }
            other => panic!("expected an api error, got {other:?}"),
        }
    }

    #[test]
    fn test_success_reads_rows_and_count() {
        let query = Query::new("todos");
        let response = into_response(StatusCode::OK, &headers("0-1/2"), r#"[{"id":"a"},{"id":"b"}]"#, &query).unwrap();
        assert_eq!(response.rows.len(), 2);
        assert_eq!(response.count, Some(2));

        let mut head = Query::new("todos");
        head.head = true;
        let response = into_response(StatusCode::OK, &headers("*/9"), "", &head).unwrap();
        assert!(response.rows.is_empty());
        assert_eq!(response.count, Some(9));
    }

    #[test]
    fn test_parse_rows_accepts_array_and_object() {
        let rows = parse_rows("todos", r#"[{"id":"a"},{"id":"b"}]"#).unwrap();
        assert_eq!(rows.len(), 2);

        let rows = parse_rows("todos", r#"{"id":"a"}"#).unwrap();
        assert_eq!(rows[0]["id"], json!("a"));

        assert!(parse_rows("todos", "").unwrap().is_empty());
        assert!(parse_rows("todos", "[1]").is_err());
    }

    #[tokio::test]
    async fn test_builder_hands_typed_query_to_transport() {
        let mut transport = MockStoreTransport::new();
        transport
            .expect_execute()
            .withf(|query| {
                query.table == "todos"
                    && query.single
                    && query.filters
                        == vec![
                            Filter::Eq("user_id".to_string(), "u1".to_string()),
                            Filter::Eq("id".to_string(), "t1".to_string()),
                        ]
            })
            .times(1)
            .returning(|_| Ok(StoreResponse::default()));

        let client = SupabaseClient::with_transport(Arc::new(transport));
        let err = client
            .from("todos")
            .eq("user_id", "u1")
            .eq("id", "t1")
            .single()
            .await
            .unwrap_err();

        assert!(err.is_not_found());
    }

    #[test]
    fn test_range_sets_offset_and_limit() {
        let client = SupabaseClient::with_transport(Arc::new(MockStoreTransport::new()));
        let builder = client.from("meetings").range(20, 29);
        assert_eq!(builder.query().offset, Some(20));
        assert_eq!(builder.query().limit, Some(10));
    }
}
