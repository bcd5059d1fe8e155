// Todo repository
// Table: todos

use chrono::Utc;
use serde_json::Value;

use super::base::{optional, BaseRepository, Entity};
use crate::error::StoreError;
use crate::models::{
    DeleteResult, PageRequest, PaginatedResponse, SortDirection, TodoDto, TodoInput, TodoPriority,
    TodoQuery, TodoSortField, TodoStatus,
};
use crate::store::{Filter, Row, SupabaseClient};

impl Entity for TodoDto {
    const TABLE: &'static str = "todos";
}

#[derive(Clone)]
pub struct TodoRepository {
    base: BaseRepository<TodoDto>,
}

impl TodoRepository {
    pub fn new(client: SupabaseClient) -> Self {
        Self {
            base: BaseRepository::new(client),
        }
    }

    /// Create a todo; status defaults to `todo` and priority to `medium`
    pub async fn create_for_user(&self, user_id: &str, data: TodoInput) -> Result<TodoDto, StoreError> {
        let data = TodoInput {
            status: data.status.or(Some(TodoStatus::Todo)),
            priority: data.priority.or(Some(TodoPriority::Medium)),
            ..data
        };
        let row = self.base.owned_row(user_id, &data)?;

        let created = self.base.table().insert(row).single().await?;
        let todo = self.base.convert_to_dto(created)?;

        tracing::info!("Created todo {} for user {}", todo.id, user_id);
        Ok(todo)
    }

    pub async fn list(&self, user_id: &str, query: TodoQuery) -> Result<PaginatedResponse<TodoDto>, StoreError> {
        let query = self.process_query_params(query);
        let page = PageRequest::new(query.page, query.limit);
        let sort_by = query.sort_by.unwrap_or_default();
        let direction = query.sort_order.unwrap_or(SortDirection::Desc);

        let mut request = self.base.table().eq("user_id", user_id);
        if let Some(status) = query.status {
            request = request.eq("status", status.as_str());
        }
        if let Some(priority) = query.priority {
            request = request.eq("priority", priority.as_str());
        }
        if let Some(from) = &query.from_date {
            request = request.gte("due_date", from);
        }
        if let Some(to) = &query.to_date {
            request = request.lte("due_date", to);
        }
        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            request = request.or(vec![
                Filter::ilike_contains("title", search),
                Filter::ilike_contains("description", search),
            ]);
        }

        let (todos, total) = self.base.paginate(request, page, sort_by.as_str(), direction).await?;

        Ok(PaginatedResponse::new(todos, total, page).with_sort(query.search, sort_by.as_str(), direction))
    }

    pub async fn find_by_user_id_and_id(&self, user_id: &str, todo_id: &str) -> Result<Option<TodoDto>, StoreError> {
        let row = optional(
            self.base
                .table()
                .eq("user_id", user_id)
                .eq("id", todo_id)
                .single()
                .await,
        )?;
        row.map(|r| self.base.convert_to_dto(r)).transpose()
    }

    /// Apply `updates`. Moving to `done` stamps `completed_at` unless one is given;
    /// moving to any other status clears it.
    pub async fn update_for_user(
        &self,
        user_id: &str,
        todo_id: &str,
        updates: TodoInput,
    ) -> Result<Option<TodoDto>, StoreError> {
        let mut row = self.base.convert_to_row(&updates)?;
        match updates.status {
            Some(TodoStatus::Done) if updates.completed_at.is_none() => {
                row.insert("completed_at".to_string(), Value::from(Utc::now().to_rfc3339()));
            }
            Some(TodoStatus::Done) | None => {}
            Some(_) => {
                row.insert("completed_at".to_string(), Value::Null);
            }
        }

        self.apply_update(user_id, todo_id, row).await
    }

    pub async fn update_status(
        &self,
        user_id: &str,
        todo_id: &str,
        status: TodoStatus,
    ) -> Result<Option<TodoDto>, StoreError> {
        let completed_at = match status {
            TodoStatus::Done => Value::from(Utc::now().to_rfc3339()),
            _ => Value::Null,
        };

        let mut row = Row::new();
        row.insert("status".to_string(), Value::from(status.as_str()));
        row.insert("completed_at".to_string(), completed_at);

        self.apply_update(user_id, todo_id, row).await
    }

    async fn apply_update(&self, user_id: &str, todo_id: &str, row: Row) -> Result<Option<TodoDto>, StoreError> {
        let updated = optional(
            self.base
                .table()
                .update(row)
                .eq("user_id", user_id)
                .eq("id", todo_id)
                .single()
                .await,
        )?;

        match updated {
            Some(row) => {
                let todo = self.base.convert_to_dto(row)?;
                tracing::info!("Updated todo {} for user {}", todo_id, user_id);
                Ok(Some(todo))
            }
            None => Ok(None),
        }
    }

    pub async fn delete_for_user(&self, user_id: &str, todo_id: &str) -> Result<DeleteResult, StoreError> {
        let response = self
            .base
            .table()
            .delete()
            .eq("user_id", user_id)
            .eq("id", todo_id)
            .execute()
            .await?;

        let result = DeleteResult::from_row_count(response.rows.len() as u64);
        if result.deleted {
            tracing::info!("Deleted todo {} for user {}", todo_id, user_id);
        }
        Ok(result)
    }

    /// Fill in list defaults: page 1, limit 10, newest first by creation
    pub fn process_query_params(&self, query: TodoQuery) -> TodoQuery {
        let page = PageRequest::new(query.page, query.limit);
        TodoQuery {
            page: Some(page.page),
            limit: Some(page.limit),
            sort_by: Some(query.sort_by.unwrap_or(TodoSortField::CreatedAt)),
            sort_order: Some(query.sort_order.unwrap_or(SortDirection::Desc)),
            ..query
        }
    }
}
