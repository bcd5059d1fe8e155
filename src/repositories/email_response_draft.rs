// Email response draft repository
// Table: email_response_drafts

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::base::{optional, BaseRepository, Entity};
use crate::error::StoreError;
use crate::models::{DraftStatus, EmailResponseDraftDto, EmailResponseDraftInput};
use crate::store::{Row, SupabaseClient};

impl Entity for EmailResponseDraftDto {
    const TABLE: &'static str = "email_response_drafts";
}

const DEFAULT_REVIEW_LIMIT: u64 = 20;

#[derive(Clone)]
pub struct EmailResponseDraftRepository {
    base: BaseRepository<EmailResponseDraftDto>,
}

impl EmailResponseDraftRepository {
    pub fn new(client: SupabaseClient) -> Self {
        Self {
            base: BaseRepository::new(client),
        }
    }

    pub async fn create(
        &self,
        user_id: &str,
        data: EmailResponseDraftInput,
    ) -> Result<EmailResponseDraftDto, StoreError> {
        let data = EmailResponseDraftInput {
            reply_to_all: data.reply_to_all.or(Some(false)),
            requires_review: data.requires_review.or(Some(true)),
            status: data.status.or(Some(DraftStatus::PendingReview)),
            ..data
        };
        let row = self.base.owned_row(user_id, &data)?;

        let created = self.base.table().insert(row).single().await?;
        let draft = self.base.convert_to_dto(created)?;

        tracing::info!("Created response draft {} for email {}", draft.id, draft.email_id);
        Ok(draft)
    }

    /// Latest draft written for an email
    pub async fn find_by_email_id(
        &self,
        user_id: &str,
        email_id: &str,
    ) -> Result<Option<EmailResponseDraftDto>, StoreError> {
        let row = optional(
            self.base
                .table()
                .eq("user_id", user_id)
                .eq("email_id", email_id)
                .order("created_at", false)
                .limit(1)
                .single()
                .await,
        )?;
        row.map(|r| self.base.convert_to_dto(r)).transpose()
    }

    /// An explicit `sent_at` wins; otherwise sending stamps now
    pub async fn update_status(
        &self,
        user_id: &str,
        draft_id: &str,
        status: DraftStatus,
        sent_at: Option<DateTime<Utc>>,
    ) -> Result<Option<EmailResponseDraftDto>, StoreError> {
        let sent_at = sent_at.or_else(|| (status == DraftStatus::Sent).then(Utc::now));

        let mut row = Row::new();
        row.insert("status".to_string(), Value::from(status.as_str()));
        if let Some(at) = sent_at {
            row.insert("sent_at".to_string(), Value::from(at.to_rfc3339()));
        }

        let updated = optional(
            self.base
                .table()
                .update(row)
                .eq("user_id", user_id)
                .eq("id", draft_id)
                .single()
                .await,
        )?;

        match updated {
            Some(row) => {
                let dto = self.base.convert_to_dto(row)?;
                tracing::info!("Response draft {} is now {}", draft_id, status.as_str());
                Ok(Some(dto))
            }
            None => Ok(None),
        }
    }

    pub async fn list_pending_review(
        &self,
        user_id: &str,
        limit: Option<u64>,
    ) -> Result<Vec<EmailResponseDraftDto>, StoreError> {
        let response = self
            .base
            .table()
            .eq("user_id", user_id)
            .eq("status", DraftStatus::PendingReview.as_str())
            .order("created_at", false)
            .limit(limit.unwrap_or(DEFAULT_REVIEW_LIMIT))
            .execute()
            .await?;

        self.base.convert_to_dtos(response.rows)
    }
}
