// Meeting agenda repository
// Table: agendas

use super::base::{optional, BaseRepository, Entity};
use crate::error::StoreError;
use crate::models::{
    DeleteResult, MeetingAgendaDto, MeetingAgendaInput, MeetingAgendaQuery, PageRequest, PaginatedResponse,
    SortDirection,
};
use crate::store::{Filter, SupabaseClient};

impl Entity for MeetingAgendaDto {
    const TABLE: &'static str = "agendas";
    const OPAQUE_FIELDS: &'static [&'static str] = &["categories"];
}

#[derive(Clone)]
pub struct MeetingAgendaRepository {
    base: BaseRepository<MeetingAgendaDto>,
}

impl MeetingAgendaRepository {
    pub fn new(client: SupabaseClient) -> Self {
        Self {
            base: BaseRepository::new(client),
        }
    }

    pub async fn create_for_user(
        &self,
        user_id: &str,
        data: MeetingAgendaInput,
    ) -> Result<MeetingAgendaDto, StoreError> {
        let data = MeetingAgendaInput {
            categories: data.categories.or_else(|| Some(Vec::new())),
            ..data
        };
        let row = self.base.owned_row(user_id, &data)?;

        let created = self.base.table().insert(row).single().await?;
        let agenda = self.base.convert_to_dto(created)?;

        tracing::info!("Created agenda {} for user {}", agenda.id, user_id);
        Ok(agenda)
    }

    pub async fn list(
        &self,
        user_id: &str,
        query: MeetingAgendaQuery,
    ) -> Result<PaginatedResponse<MeetingAgendaDto>, StoreError> {
        let query = self.process_query_params(query);
        let page = PageRequest::new(query.page, query.limit);
        let sort = query.sort.unwrap_or_default();
        let direction = query.sort_direction.unwrap_or_default();

        let mut request = self.base.table().eq("user_id", user_id);
        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            request = request.or(vec![Filter::ilike_contains("title", search)]);
        }

        let (agendas, total) = self.base.paginate(request, page, sort.as_str(), direction).await?;

        Ok(PaginatedResponse::new(agendas, total, page).with_sort(query.search, sort.as_str(), direction))
    }

    pub async fn find_by_user_id_and_id(
        &self,
        user_id: &str,
        agenda_id: &str,
    ) -> Result<Option<MeetingAgendaDto>, StoreError> {
        let row = optional(
            self.base
                .table()
                .eq("user_id", user_id)
                .eq("id", agenda_id)
                .single()
                .await,
        )?;
        row.map(|r| self.base.convert_to_dto(r)).transpose()
    }

    pub async fn update_for_user(
        &self,
        user_id: &str,
        agenda_id: &str,
        updates: MeetingAgendaInput,
    ) -> Result<Option<MeetingAgendaDto>, StoreError> {
        let row = self.base.convert_to_row(&updates)?;

        let updated = optional(
            self.base
                .table()
                .update(row)
                .eq("user_id", user_id)
                .eq("id", agenda_id)
                .single()
                .await,
        )?;

        match updated {
            Some(row) => {
                tracing::info!("Updated agenda {} for user {}", agenda_id, user_id);
                Ok(Some(self.base.convert_to_dto(row)?))
            }
            None => Ok(None),
        }
    }

    pub async fn delete_for_user(&self, user_id: &str, agenda_id: &str) -> Result<DeleteResult, StoreError> {
        let response = self
            .base
            .table()
            .delete()
            .eq("user_id", user_id)
            .eq("id", agenda_id)
            .execute()
            .await?;

        let result = DeleteResult::from_row_count(response.rows.len() as u64);
        if result.deleted {
            tracing::info!("Deleted agenda {} for user {}", agenda_id, user_id);
        }
        Ok(result)
    }

    /// Fill in page, limit and sort defaults
    pub fn process_query_params(&self, query: MeetingAgendaQuery) -> MeetingAgendaQuery {
        let page = PageRequest::new(query.page, query.limit);
        MeetingAgendaQuery {
            page: Some(page.page),
            limit: Some(page.limit),
            sort: Some(query.sort.unwrap_or_default()),
            sort_direction: Some(query.sort_direction.unwrap_or(SortDirection::Desc)),
            ..query
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MeetingAgendaCategory, MeetingAgendaItem, MeetingAgendaSortField};
    use crate::store::memory::InMemoryStore;
    use serde_json::json;
    use std::sync::Arc;

    fn setup() -> (Arc<InMemoryStore>, MeetingAgendaRepository) {
        let store = Arc::new(InMemoryStore::new());
        let repo = MeetingAgendaRepository::new(SupabaseClient::with_transport(store.clone()));
        (store, repo)
    }

    #[tokio::test]
    async fn test_create_defaults_categories_and_keeps_them_verbatim() {
        let (store, repo) = setup();

        let empty = repo
            .create_for_user(
                "u1",
                MeetingAgendaInput {
                    title: Some("Empty".into()),
                    categories: None,
                },
            )
            .await
            .unwrap();
        assert!(empty.categories.is_empty());

        let categories = vec![MeetingAgendaCategory {
            id: Some("c1".into()),
            category: "Updates".into(),
            items: vec![MeetingAgendaItem {
                id: Some("i1".into()),
                title: "Roadmap".into(),
                duration: Some(10),
                order: Some(0),
                discussed: false,
            }],
            order: Some(0),
        }];
        let agenda = repo
            .create_for_user(
                "u1",
                MeetingAgendaInput {
                    title: Some("Weekly".into()),
                    categories: Some(categories.clone()),
                },
            )
            .await
            .unwrap();

        assert_eq!(agenda.categories, categories);
        assert_eq!(store.rows("agendas")[1]["categories"][0]["items"][0]["title"], json!("Roadmap"));
    }

    #[tokio::test]
    async fn test_list_searches_titles_newest_first() {
        let (store, repo) = setup();
        for (id, title, created) in [
            ("a1", "Sprint planning", "2024-01-01T00:00:00Z"),
            ("a2", "Board review", "2024-01-02T00:00:00Z"),
            ("a3", "Planning poker", "2024-01-03T00:00:00Z"),
        ] {
            store.seed(
                "agendas",
                json!({
                    "id": id,
                    "user_id": "u1",
                    "title": title,
                    "categories": [],
                    "created_at": created,
                    "updated_at": created
                }),
            );
        }

        let result = repo
            .list(
                "u1",
                MeetingAgendaQuery {
                    search: Some("PLANNING".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let ids: Vec<&str> = result.data.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a3", "a1"]);
        assert_eq!(result.sort.as_deref(), Some("createdAt"));

        let query = store.queries().pop().unwrap();
        assert_eq!(query.orders[0].column, "created_at");
    }

    #[tokio::test]
    async fn test_list_sorts_by_title_column() {
        let (store, repo) = setup();

        let result = repo
            .list(
                "u1",
                MeetingAgendaQuery {
                    sort: Some(MeetingAgendaSortField::Title),
                    sort_direction: Some(SortDirection::Asc),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(result.sort.as_deref(), Some("title"));
        let query = store.queries().pop().unwrap();
        assert_eq!(query.orders.len(), 2);
        assert_eq!(query.orders[0].column, "title");
        assert!(query.orders[0].ascending);
        assert_eq!(query.orders[1].column, "id");
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (store, repo) = setup();
        store.seed(
            "agendas",
            json!({
                "id": "a1",
                "user_id": "u1",
                "title": "Old",
                "categories": [],
                "created_at": "2024-01-01T00:00:00Z",
                "updated_at": "2024-01-01T00:00:00Z"
            }),
        );

        let updated = repo
            .update_for_user(
                "u1",
                "a1",
                MeetingAgendaInput {
                    title: Some("New".into()),
                    categories: None,
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "New");

        assert!(repo.find_by_user_id_and_id("u2", "a1").await.unwrap().is_none());
        assert!(repo.delete_for_user("u1", "a1").await.unwrap().deleted);
        assert!(repo.find_by_user_id_and_id("u1", "a1").await.unwrap().is_none());
    }
}
