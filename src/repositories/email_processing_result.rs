// Email processing result repository
// Table: email_processing_results, one row per (user, email)

use serde_json::Value;

use super::base::{optional, BaseRepository, Entity};
use crate::error::StoreError;
use crate::models::{EmailProcessingResultDto, EmailProcessingResultInput};
use crate::store::SupabaseClient;

impl Entity for EmailProcessingResultDto {
    const TABLE: &'static str = "email_processing_results";
}

const ON_CONFLICT: &str = "user_id,email_id";
const DEFAULT_LIST_LIMIT: u64 = 50;

#[derive(Clone)]
pub struct EmailProcessingResultRepository {
    base: BaseRepository<EmailProcessingResultDto>,
}

impl EmailProcessingResultRepository {
    pub fn new(client: SupabaseClient) -> Self {
        Self {
            base: BaseRepository::new(client),
        }
    }

    /// Insert the result for an email, or merge into the existing one
    pub async fn upsert(
        &self,
        user_id: &str,
        email_id: &str,
        data: EmailProcessingResultInput,
    ) -> Result<EmailProcessingResultDto, StoreError> {
        let mut row = self.base.owned_row(user_id, &data)?;
        row.insert("email_id".to_string(), Value::from(email_id));

        let written = self.base.table().upsert(row, ON_CONFLICT).single().await?;
        let result = self.base.convert_to_dto(written)?;

        tracing::info!(
            "Stored processing result for email {} (user {}): {:?}",
            email_id,
            user_id,
            result.classification
        );
        Ok(result)
    }

    pub async fn find_by_email_id(
        &self,
        user_id: &str,
        email_id: &str,
    ) -> Result<Option<EmailProcessingResultDto>, StoreError> {
        let row = optional(
            self.base
                .table()
                .eq("user_id", user_id)
                .eq("email_id", email_id)
                .single()
                .await,
        )?;
        row.map(|r| self.base.convert_to_dto(r)).transpose()
    }

    /// Most recently received first, 50 by default
    pub async fn list_by_account_id(
        &self,
        user_id: &str,
        account_id: &str,
        limit: Option<u64>,
    ) -> Result<Vec<EmailProcessingResultDto>, StoreError> {
        let response = self
            .base
            .table()
            .eq("user_id", user_id)
            .eq("account_id", account_id)
            .order("received_at", false)
            .limit(limit.unwrap_or(DEFAULT_LIST_LIMIT))
            .execute()
            .await?;

        self.base.convert_to_dtos(response.rows)
    }
}
