// Email extracted task repository
// Table: email_extracted_tasks

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::base::{optional, BaseRepository, Entity};
use crate::error::StoreError;
use crate::models::{EmailExtractedTaskDto, EmailExtractedTaskInput, TaskStatus};
use crate::store::{Row, SupabaseClient};

impl Entity for EmailExtractedTaskDto {
    const TABLE: &'static str = "email_extracted_tasks";
}

const DEFAULT_PENDING_LIMIT: u64 = 50;

#[derive(Clone)]
pub struct EmailExtractedTaskRepository {
    base: BaseRepository<EmailExtractedTaskDto>,
}

impl EmailExtractedTaskRepository {
    pub fn new(client: SupabaseClient) -> Self {
        Self {
            base: BaseRepository::new(client),
        }
    }

    pub async fn create_many(
        &self,
        user_id: &str,
        tasks: Vec<EmailExtractedTaskInput>,
    ) -> Result<Vec<EmailExtractedTaskDto>, StoreError> {
        if tasks.is_empty() {
            return Ok(Vec::new());
        }

        let rows = tasks
            .into_iter()
            .map(|task| {
                let task = EmailExtractedTaskInput {
                    status: task.status.or(Some(TaskStatus::Pending)),
                    ..task
                };
                self.base.owned_row(user_id, &task)
            })
            .collect::<Result<Vec<Row>, StoreError>>()?;

        let response = self.base.table().insert_many(rows).execute().await?;
        let created = self.base.convert_to_dtos(response.rows)?;

        tracing::info!("Created {} extracted tasks for user {}", created.len(), user_id);
        Ok(created)
    }

    pub async fn find_by_email_id(
        &self,
        user_id: &str,
        email_id: &str,
    ) -> Result<Vec<EmailExtractedTaskDto>, StoreError> {
        let response = self
            .base
            .table()
            .eq("user_id", user_id)
            .eq("email_id", email_id)
            .order("created_at", true)
            .execute()
            .await?;

        self.base.convert_to_dtos(response.rows)
    }

    /// An explicit `completed_at` wins; otherwise completing stamps now
    pub async fn update_status(
        &self,
        user_id: &str,
        task_id: &str,
        status: TaskStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<Option<EmailExtractedTaskDto>, StoreError> {
        let completed_at = completed_at.or_else(|| (status == TaskStatus::Completed).then(Utc::now));

        let mut row = Row::new();
        row.insert("status".to_string(), Value::from(status.as_str()));
        if let Some(at) = completed_at {
            row.insert("completed_at".to_string(), Value::from(at.to_rfc3339()));
        }

        let updated = optional(
            self.base
                .table()
                .update(row)
                .eq("user_id", user_id)
                .eq("id", task_id)
                .single()
                .await,
        )?;

        match updated {
            Some(row) => {
                let dto = self.base.convert_to_dto(row)?;
                tracing::info!("Extracted task {} is now {}", task_id, status.as_str());
                Ok(Some(dto))
            }
            None => Ok(None),
        }
    }

    /// Pending tasks by deadline, undated ones last
    pub async fn list_pending(
        &self,
        user_id: &str,
        limit: Option<u64>,
    ) -> Result<Vec<EmailExtractedTaskDto>, StoreError> {
        let response = self
            .base
            .table()
            .eq("user_id", user_id)
            .eq("status", TaskStatus::Pending.as_str())
            .order_nulls("deadline", true, false)
            .limit(limit.unwrap_or(DEFAULT_PENDING_LIMIT))
            .execute()
            .await?;

        self.base.convert_to_dtos(response.rows)
    }
}
