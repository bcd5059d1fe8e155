// Conversation repository
// Table: conversations, one row per (user, context) with the full message log

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::base::{optional, BaseRepository, Entity};
use crate::error::StoreError;
use crate::models::{
    ConversationDto, ConversationListResponse, ConversationMessage, ConversationQuery, ConversationSummary,
    NewConversation, PageRequest,
};
use crate::store::SupabaseClient;

impl Entity for ConversationDto {
    const TABLE: &'static str = "conversations";
    const OPAQUE_FIELDS: &'static [&'static str] = &["messages"];
}

const DEFAULT_MESSAGE_LIMIT: usize = 50;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConversationUpdate<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    messages: Option<&'a [ConversationMessage]>,
    updated_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct ConversationRepository {
    base: BaseRepository<ConversationDto>,
}

impl ConversationRepository {
    pub fn new(client: SupabaseClient) -> Self {
        Self {
            base: BaseRepository::new(client),
        }
    }

    async fn find_by_context_id(&self, user_id: &str, context_id: &str) -> Result<Option<ConversationDto>, StoreError> {
        let row = optional(
            self.base
                .table()
                .eq("user_id", user_id)
                .eq("context_id", context_id)
                .single()
                .await,
        )?;
        row.map(|r| self.base.convert_to_dto(r)).transpose()
    }

    /// Append `message` to the conversation for `context_id`, creating it if needed
    pub async fn create_or_update(
        &self,
        user_id: &str,
        context_id: &str,
        channel: &str,
        title: &str,
        message: ConversationMessage,
    ) -> Result<ConversationDto, StoreError> {
        if let Some(existing) = self.find_by_context_id(user_id, context_id).await? {
            let mut messages = existing.messages;
            messages.push(message);

            let update = ConversationUpdate {
                title: Some(title).filter(|t| !t.is_empty()),
                messages: Some(&messages),
                updated_at: Utc::now(),
            };
            let row = self.base.convert_to_row(&update)?;

            let updated = self
                .base
                .table()
                .update(row)
                .eq("id", &existing.id)
                .single()
                .await?;

            tracing::info!(
                "Appended message to conversation {} ({} messages)",
                existing.id,
                messages.len()
            );
            return self.base.convert_to_dto(updated);
        }

        let new = NewConversation {
            context_id,
            channel,
            title,
            messages: vec![message],
        };
        let row = self.base.owned_row(user_id, &new)?;

        let created = self.base.table().insert(row).single().await?;
        let conversation = self.base.convert_to_dto(created)?;

        tracing::info!(
            "Created conversation {} for context {} (user {})",
            conversation.id,
            context_id,
            user_id
        );
        Ok(conversation)
    }

    /// The last `limit` messages (50 by default), oldest first
    pub async fn get_messages(
        &self,
        context_id: &str,
        user_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<ConversationMessage>, StoreError> {
        let Some(conversation) = self.find_by_context_id(user_id, context_id).await? else {
            return Ok(Vec::new());
        };

        let limit = limit.unwrap_or(DEFAULT_MESSAGE_LIMIT);
        let mut messages = conversation.messages;
        let skip = messages.len().saturating_sub(limit);
        Ok(messages.split_off(skip))
    }

    pub async fn list(&self, user_id: &str, query: ConversationQuery) -> Result<ConversationListResponse, StoreError> {
        let page = PageRequest::new(query.page, query.limit);
        let (from, to) = page.range();

        let response = self
            .base
            .table()
            .eq("user_id", user_id)
            .count_exact()
            .order("updated_at", false)
            .order("id", true)
            .range(from, to)
            .execute()
            .await?;

        let total = response.count.unwrap_or(0);
        let conversations = self
            .base
            .convert_to_dtos(response.rows)?
            .into_iter()
            .map(ConversationSummary::from)
            .collect();

        Ok(ConversationListResponse { conversations, total })
    }

    pub async fn find_by_user_id_and_id(
        &self,
        user_id: &str,
        conversation_id: &str,
    ) -> Result<Option<ConversationDto>, StoreError> {
        let row = optional(
            self.base
                .table()
                .eq("user_id", user_id)
                .eq("id", conversation_id)
                .single()
                .await,
        )?;
        row.map(|r| self.base.convert_to_dto(r)).transpose()
    }

    pub async fn update_title(
        &self,
        user_id: &str,
        context_id: &str,
        title: &str,
    ) -> Result<Option<ConversationDto>, StoreError> {
        let update = ConversationUpdate {
            title: Some(title),
            messages: None,
            updated_at: Utc::now(),
        };
        let row = self.base.convert_to_row(&update)?;

        let updated = optional(
            self.base
                .table()
                .update(row)
                .eq("user_id", user_id)
                .eq("context_id", context_id)
                .single()
                .await,
        )?;
        updated.map(|r| self.base.convert_to_dto(r)).transpose()
    }

    pub async fn delete_for_user(&self, user_id: &str, conversation_id: &str) -> Result<bool, StoreError> {
        let response = self
            .base
            .table()
            .delete()
            .eq("user_id", user_id)
            .eq("id", conversation_id)
            .execute()
            .await?;

        let deleted = !response.rows.is_empty();
        if deleted {
            tracing::info!("Deleted conversation {} for user {}", conversation_id, user_id);
        }
        Ok(deleted)
    }
}
