// Base repository - row <-> DTO conversion shared by every table

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::StoreError;
use crate::models::{PageRequest, SortDirection};
use crate::naming::{camel_to_snake, convert_keys_to_camel_case, convert_keys_to_snake_case};
use crate::store::{QueryBuilder, Row, SupabaseClient};

/// A DTO backed by one table
pub trait Entity: DeserializeOwned + Send + Sync + 'static {
    const TABLE: &'static str;

    /// Row columns whose value is stored and returned verbatim
    const OPAQUE_FIELDS: &'static [&'static str] = &[];
}

pub struct BaseRepository<T> {
    client: SupabaseClient,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for BaseRepository<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> BaseRepository<T> {
    pub fn new(client: SupabaseClient) -> Self {
        Self {
            client,
            _entity: PhantomData,
        }
    }

    pub fn client(&self) -> &SupabaseClient {
        &self.client
    }

    /// Start a query against this entity's table
    pub fn table(&self) -> QueryBuilder {
        self.client.from(T::TABLE)
    }

    pub fn convert_to_dto(&self, row: Row) -> Result<T, StoreError> {
        let value = convert_keys_to_camel_case(Value::Object(row), T::OPAQUE_FIELDS);
        serde_json::from_value(value).map_err(|e| StoreError::decode(T::TABLE, e))
    }

    pub fn convert_to_dtos(&self, rows: Vec<Row>) -> Result<Vec<T>, StoreError> {
        rows.into_iter().map(|row| self.convert_to_dto(row)).collect()
    }

    /// Partial DTO to row; unset fields are not written
    pub fn convert_to_row<P: Serialize>(&self, partial: &P) -> Result<Row, StoreError> {
        match convert_keys_to_snake_case(serde_json::to_value(partial)?, T::OPAQUE_FIELDS) {
            Value::Object(row) => Ok(row),
            other => Err(StoreError::Validation(format!(
                "{} payload must be an object, got {}",
                T::TABLE,
                other
            ))),
        }
    }

    /// `convert_to_row` plus the owning `user_id`
    pub fn owned_row<P: Serialize>(&self, user_id: &str, partial: &P) -> Result<Row, StoreError> {
        let mut row = self.convert_to_row(partial)?;
        row.insert("user_id".to_string(), Value::from(user_id));
        Ok(row)
    }

    /// Run a list query: exact count, primary sort plus an `id` tie-break, one page
    pub async fn paginate(
        &self,
        query: QueryBuilder,
        page: PageRequest,
        sort: &str,
        direction: SortDirection,
    ) -> Result<(Vec<T>, u64), StoreError> {
        let sort_column = camel_to_snake(sort);
        let mut query = query
            .count_exact()
            .order(&sort_column, direction.is_ascending());
        if sort_column != "id" {
            query = query.order("id", true);
        }

        let (from, to) = page.range();
        let response = query.range(from, to).execute().await?;
        let total = response.count.unwrap_or(0);

        Ok((self.convert_to_dtos(response.rows)?, total))
    }
}

/// Map the store's "no matching row" to `None`
pub fn optional<T>(result: Result<T, StoreError>) -> Result<Option<T>, StoreError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Note {
        id: String,
        user_id: String,
        body_text: String,
        payload: Value,
    }

    impl Entity for Note {
        const TABLE: &'static str = "notes";
        const OPAQUE_FIELDS: &'static [&'static str] = &["payload"];
    }

    fn repo() -> BaseRepository<Note> {
        let store = std::sync::Arc::new(crate::store::memory::InMemoryStore::new());
        BaseRepository::new(SupabaseClient::with_transport(store))
    }

    #[test]
    fn test_convert_to_dto_respects_opaque_fields() {
        let row = json!({
            "id": "n1",
            "user_id": "u1",
            "body_text": "hello",
            "payload": {"raw_key": {"nested_key": 1}}
        });
        let Value::Object(row) = row else { unreachable!() };

        let note = repo().convert_to_dto(row).unwrap();
        assert_eq!(note.user_id, "u1");
        assert_eq!(note.body_text, "hello");
        assert_eq!(note.payload, json!({"raw_key": {"nested_key": 1}}));
    }

    #[test]
    fn test_convert_to_dto_reports_undecodable_rows() {
        let Value::Object(row) = json!({"id": "n1"}) else { unreachable!() };
        let err = repo().convert_to_dto(row).unwrap_err();
        assert!(matches!(err, StoreError::Decode { ref table, .. } if table == "notes"));
    }

    #[test]
    fn test_owned_row_adds_user_id() {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Partial {
            body_text: &'static str,
        }

        let row = repo().owned_row("u1", &Partial { body_text: "hi" }).unwrap();
        assert_eq!(Value::Object(row), json!({"body_text": "hi", "user_id": "u1"}));
    }

    #[test]
    fn test_optional_maps_not_found_only() {
        assert_eq!(optional::<u8>(Err(StoreError::not_found("notes"))).unwrap(), None);
        assert_eq!(optional(Ok(3u8)).unwrap(), Some(3));
        assert!(optional::<u8>(Err(StoreError::Validation("bad".into()))).is_err());
    }
}
