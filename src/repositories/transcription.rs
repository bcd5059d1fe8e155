// Transcription repository
// Table: transcriptions

use super::base::{optional, BaseRepository, Entity};
use crate::error::StoreError;
use crate::models::{TranscriptionDto, TranscriptionInput};
use crate::store::SupabaseClient;

impl Entity for TranscriptionDto {
    const TABLE: &'static str = "transcriptions";
    const OPAQUE_FIELDS: &'static [&'static str] = &["paragraphs"];
}

const DEFAULT_LIST_LIMIT: u64 = 50;

#[derive(Clone)]
pub struct TranscriptionRepository {
    base: BaseRepository<TranscriptionDto>,
}

impl TranscriptionRepository {
    pub fn new(client: SupabaseClient) -> Self {
        Self {
            base: BaseRepository::new(client),
        }
    }

    pub async fn create_for_user(
        &self,
        user_id: &str,
        data: TranscriptionInput,
    ) -> Result<TranscriptionDto, StoreError> {
        let data = TranscriptionInput {
            language: data.language.or_else(|| Some("en".to_string())),
            ..data
        };
        let row = self.base.owned_row(user_id, &data)?;

        let created = self.base.table().insert(row).single().await?;
        let transcription = self.base.convert_to_dto(created)?;

        tracing::info!(
            "Created transcription {} for context {} (user {})",
            transcription.id,
            transcription.context_id,
            user_id
        );
        Ok(transcription)
    }

    pub async fn find_by_user_id_and_id(
        &self,
        user_id: &str,
        transcription_id: &str,
    ) -> Result<Option<TranscriptionDto>, StoreError> {
        let row = optional(
            self.base
                .table()
                .eq("user_id", user_id)
                .eq("id", transcription_id)
                .single()
                .await,
        )?;
        row.map(|r| self.base.convert_to_dto(r)).transpose()
    }

    /// Latest transcription for a meeting or conversation
    pub async fn find_by_context_id(
        &self,
        user_id: &str,
        context_id: &str,
    ) -> Result<Option<TranscriptionDto>, StoreError> {
        let row = optional(
            self.base
                .table()
                .eq("user_id", user_id)
                .eq("context_id", context_id)
                .order("created_at", false)
                .limit(1)
                .single()
                .await,
        )?;
        row.map(|r| self.base.convert_to_dto(r)).transpose()
    }

    /// All transcriptions for the given contexts, newest first
    pub async fn find_by_context_ids(
        &self,
        user_id: &str,
        context_ids: &[String],
    ) -> Result<Vec<TranscriptionDto>, StoreError> {
        if context_ids.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .base
            .table()
            .eq("user_id", user_id)
            .in_("context_id", context_ids)
            .order("created_at", false)
            .execute()
            .await?;

        self.base.convert_to_dtos(response.rows)
    }

    /// Newest transcriptions for a user, 50 by default
    pub async fn list(&self, user_id: &str, limit: Option<u64>) -> Result<Vec<TranscriptionDto>, StoreError> {
        let response = self
            .base
            .table()
            .eq("user_id", user_id)
            .order("created_at", false)
            .limit(limit.unwrap_or(DEFAULT_LIST_LIMIT))
            .execute()
            .await?;

        self.base.convert_to_dtos(response.rows)
    }

    pub async fn delete_for_user(&self, user_id: &str, transcription_id: &str) -> Result<bool, StoreError> {
        let response = self
            .base
            .table()
            .delete()
            .eq("user_id", user_id)
            .eq("id", transcription_id)
            .execute()
            .await?;

        let deleted = !response.rows.is_empty();
        if deleted {
            tracing::info!("Deleted transcription {} for user {}", transcription_id, user_id);
        }
        Ok(deleted)
    }
}
