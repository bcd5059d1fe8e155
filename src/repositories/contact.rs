// Contact repository
// Table: contacts (not user-scoped)

use super::base::{optional, BaseRepository, Entity};
use crate::error::StoreError;
use crate::models::{ContactDto, ContactInput, ContactList};
use crate::store::SupabaseClient;

impl Entity for ContactDto {
    const TABLE: &'static str = "contacts";
}

const DEFAULT_LIST_LIMIT: u64 = 50;

#[derive(Clone)]
pub struct ContactRepository {
    base: BaseRepository<ContactDto>,
}

impl ContactRepository {
    pub fn new(client: SupabaseClient) -> Self {
        Self {
            base: BaseRepository::new(client),
        }
    }

    pub async fn create(&self, data: ContactInput) -> Result<ContactDto, StoreError> {
        let row = self.base.convert_to_row(&data)?;

        let created = self.base.table().insert(row).single().await?;
        let contact = self.base.convert_to_dto(created)?;

        tracing::info!("Stored contact request {} from {}", contact.id, contact.email);
        Ok(contact)
    }

    pub async fn find_by_id(&self, contact_id: &str) -> Result<Option<ContactDto>, StoreError> {
        let row = optional(self.base.table().eq("id", contact_id).single().await)?;
        row.map(|r| self.base.convert_to_dto(r)).transpose()
    }

    /// Newest first; the total is counted over all contacts
    pub async fn list_all(&self, limit: Option<u64>, offset: Option<u64>) -> Result<ContactList, StoreError> {
        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT).max(1);
        let offset = offset.unwrap_or(0);

        let count = self.base.table().count_exact().head().execute();
        let page = self
            .base
            .table()
            .order("created_at", false)
            .range(offset, offset + limit - 1)
            .execute();

        let (count, page) = tokio::try_join!(count, page)?;

        Ok(ContactList {
            data: self.base.convert_to_dtos(page.rows)?,
            total: count.count.unwrap_or(0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryStore;
    use crate::store::client::MockStoreTransport;
    use crate::store::StoreResponse;
    use serde_json::json;
    use std::sync::Arc;

    fn input(naam: &str) -> ContactInput {
        ContactInput {
            naam: naam.to_string(),
            email: format!("{}@example.com", naam.to_lowercase()),
            bedrijf: None,
            bericht: "Graag meer info".into(),
            website: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_list_newest_first() {
        let store = Arc::new(InMemoryStore::new());
        let repo = ContactRepository::new(SupabaseClient::with_transport(store.clone()));
        for (id, created) in [("c1", "2024-01-01T00:00:00Z"), ("c2", "2024-01-02T00:00:00Z"), ("c3", "2024-01-03T00:00:00Z")] {
            store.seed(
                "contacts",
                json!({
                    "id": id,
                    "naam": "Jan",
                    "email": "jan@example.com",
                    "bericht": "Hallo",
                    "created_at": created
                }),
            );
        }

        let list = repo.list_all(Some(2), Some(1)).await.unwrap();
        assert_eq!(list.total, 3);
        let ids: Vec<&str> = list.data.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c2", "c1"]);

        let created = repo.create(input("Piet")).await.unwrap();
        assert_eq!(created.email, "piet@example.com");
        assert_eq!(repo.find_by_id(&created.id).await.unwrap().unwrap().naam, "Piet");
        assert!(repo.find_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_all_propagates_count_failure() {
        let mut transport = MockStoreTransport::new();
        transport.expect_execute().returning(|query| {
            if query.head {
                Err(StoreError::Api {
                    status: 500,
                    code: None,
                    message: "count failed".into(),
                    details: None,
                    hint: None,
                })
            } else {
                Ok(StoreResponse {
                    rows: Vec::new(),
                    count: None,
                })
            }
        });

        let repo = ContactRepository::new(SupabaseClient::with_transport(Arc::new(transport)));
        let err = repo.list_all(None, None).await.unwrap_err();
        assert!(matches!(err, StoreError::Api { status: 500, .. }));
    }
}
