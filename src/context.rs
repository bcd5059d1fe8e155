// Kai context - owns the store and workflow handles and hands out repositories

use crate::config::Config;
use crate::error::ConfigError;
use crate::repositories::{
    ContactRepository, ConversationRepository, EmailActionRepository, EmailExtractedTaskRepository,
    EmailProcessingResultRepository, EmailResponseDraftRepository, MeetingAgendaRepository, MeetingRepository,
    TodoRepository, TranscriptionRepository, UserAccountRepository, UserPreferencesRepository,
};
use crate::store::SupabaseClient;
use crate::workflows::{KaiTemporalClient, WorkflowRegistry};

/// Shared handles for one process. Cloning is cheap.
#[derive(Clone)]
pub struct KaiContext {
    store: SupabaseClient,
    temporal: KaiTemporalClient,
}

impl KaiContext {
    pub fn new(store: SupabaseClient, temporal: KaiTemporalClient) -> Self {
        Self { store, temporal }
    }

    /// Build both clients from config. The workflow engine connects on first use.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let url = config.supabase_url.as_deref().ok_or(ConfigError::Missing("SUPABASE_URL"))?;
        let key = config
            .supabase_key
            .as_deref()
            .ok_or(ConfigError::Missing("SUPABASE_SERVICE_ROLE_KEY"))?;

        Ok(Self::new(
            SupabaseClient::new(url, key),
            KaiTemporalClient::new(config.temporal_options()),
        ))
    }

    pub fn store(&self) -> &SupabaseClient {
        &self.store
    }

    pub fn temporal(&self) -> &KaiTemporalClient {
        &self.temporal
    }

    pub fn workflows(&self) -> WorkflowRegistry {
        self.temporal.workflows()
    }

    // =========================================================================
    // REPOSITORIES
    // =========================================================================

    pub fn meetings(&self) -> MeetingRepository {
        MeetingRepository::new(self.store.clone())
    }

    pub fn meeting_agendas(&self) -> MeetingAgendaRepository {
        MeetingAgendaRepository::new(self.store.clone())
    }

    pub fn todos(&self) -> TodoRepository {
        TodoRepository::new(self.store.clone())
    }

    pub fn transcriptions(&self) -> TranscriptionRepository {
        TranscriptionRepository::new(self.store.clone())
    }

    pub fn conversations(&self) -> ConversationRepository {
        ConversationRepository::new(self.store.clone())
    }

    pub fn email_processing_results(&self) -> EmailProcessingResultRepository {
        EmailProcessingResultRepository::new(self.store.clone())
    }

    pub fn email_actions(&self) -> EmailActionRepository {
        EmailActionRepository::new(self.store.clone())
    }

    pub fn email_extracted_tasks(&self) -> EmailExtractedTaskRepository {
        EmailExtractedTaskRepository::new(self.store.clone())
    }

    pub fn email_response_drafts(&self) -> EmailResponseDraftRepository {
        EmailResponseDraftRepository::new(self.store.clone())
    }

    pub fn user_accounts(&self) -> UserAccountRepository {
        UserAccountRepository::new(self.store.clone())
    }

    pub fn user_preferences(&self) -> UserPreferencesRepository {
        UserPreferencesRepository::new(self.store.clone())
    }

    pub fn contacts(&self) -> ContactRepository {
        ContactRepository::new(self.store.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TodoInput;
    use crate::store::memory::InMemoryStore;
    use crate::workflows::engine::MockWorkflowEngine;
    use crate::workflows::ClientState;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_repositories_share_one_store() {
        let store = Arc::new(InMemoryStore::new());
        let context = KaiContext::new(
            SupabaseClient::with_transport(store.clone()),
            KaiTemporalClient::with_engine(Arc::new(MockWorkflowEngine::new())),
        );

        let todo = context.todos().create_for_user("u1", TodoInput::titled("Buy milk")).await.unwrap();
        let found = context.clone().todos().find_by_user_id_and_id("u1", &todo.id).await.unwrap();

        assert_eq!(found.map(|t| t.title), Some("Buy milk".to_string()));
        assert_eq!(store.rows("todos").len(), 1);
        assert_eq!(context.temporal().state(), ClientState::Uninitialized);
    }

    #[test]
    fn test_from_config_requires_store_settings() {
        let config = Config {
            supabase_url: None,
            supabase_key: Some("key".into()),
            temporal_address: "localhost:7243".into(),
            temporal_namespace: "default".into(),
            temporal_api_key: None,
            temporal_tls: false,
            log_file: "/tmp/kai-sdk.log".into(),
            user_id: None,
        };
        assert!(matches!(
            KaiContext::from_config(&config),
            Err(ConfigError::Missing("SUPABASE_URL"))
        ));
    }
}
