// User account repository
// Table: user_accounts, one row per user

use super::base::{optional, BaseRepository, Entity};
use crate::error::StoreError;
use crate::models::{AuthProvider, AuthProviderKind, AuthProviders, UserAccountDto, UserAccountInput};
use crate::store::SupabaseClient;

impl Entity for UserAccountDto {
    const TABLE: &'static str = "user_accounts";
    const OPAQUE_FIELDS: &'static [&'static str] = &["preferences"];
}

pub(crate) const FREE_TIER: &str = "free";

#[derive(Clone)]
pub struct UserAccountRepository {
    base: BaseRepository<UserAccountDto>,
}

impl UserAccountRepository {
    pub fn new(client: SupabaseClient) -> Self {
        Self {
            base: BaseRepository::new(client),
        }
    }

    pub async fn create_for_user(&self, user_id: &str, data: UserAccountInput) -> Result<UserAccountDto, StoreError> {
        let data = UserAccountInput {
            total_credits: data.total_credits.or(Some(0)),
            used_credits: data.used_credits.or(Some(0)),
            subscription_tier: data.subscription_tier.or_else(|| Some(FREE_TIER.to_string())),
            enabled_tools: data.enabled_tools.or_else(|| Some(Vec::new())),
            auth_providers: data.auth_providers.or_else(|| Some(AuthProviders::default())),
            preferences: data.preferences.or_else(|| Some(Default::default())),
            ..data
        };
        let row = self.base.owned_row(user_id, &data)?;

        let created = self.base.table().insert(row).single().await?;
        let account = self.base.convert_to_dto(created)?;

        tracing::info!("Created account for user {} ({} tier)", user_id, account.subscription_tier);
        Ok(account)
    }

    pub async fn find_by_user_id(&self, user_id: &str) -> Result<Option<UserAccountDto>, StoreError> {
        let row = optional(self.base.table().eq("user_id", user_id).single().await)?;
        row.map(|r| self.base.convert_to_dto(r)).transpose()
    }

    pub async fn update_for_user(
        &self,
        user_id: &str,
        updates: UserAccountInput,
    ) -> Result<Option<UserAccountDto>, StoreError> {
        let row = self.base.convert_to_row(&updates)?;

        let updated = optional(self.base.table().update(row).eq("user_id", user_id).single().await)?;
        updated.map(|r| self.base.convert_to_dto(r)).transpose()
    }

    pub async fn delete_for_user(&self, user_id: &str) -> Result<bool, StoreError> {
        let response = self.base.table().delete().eq("user_id", user_id).execute().await?;

        let deleted = !response.rows.is_empty();
        if deleted {
            tracing::info!("Deleted account for user {}", user_id);
        }
        Ok(deleted)
    }

    /// Delete the auth user; owned rows are removed by the database cascade
    pub async fn delete_user_and_account(&self, user_id: &str) -> Result<(), StoreError> {
        self.base.client().delete_auth_user(user_id).await?;
        tracing::info!("Deleted auth user {} and their account", user_id);
        Ok(())
    }

    /// Link (or relink) one provider. `None` when the user has no account.
    pub async fn update_auth_provider(
        &self,
        user_id: &str,
        provider: AuthProvider,
    ) -> Result<Option<UserAccountDto>, StoreError> {
        let kind = provider.kind();
        let updated = self
            .modify_auth_providers(user_id, |providers| providers.set(provider))
            .await?;
        if updated.is_some() {
            tracing::info!("Linked {} for user {}", kind.as_str(), user_id);
        }
        Ok(updated)
    }

    pub async fn remove_auth_provider(
        &self,
        user_id: &str,
        kind: AuthProviderKind,
    ) -> Result<Option<UserAccountDto>, StoreError> {
        let updated = self
            .modify_auth_providers(user_id, |providers| providers.remove(kind))
            .await?;
        if updated.is_some() {
            tracing::info!("Unlinked {} for user {}", kind.as_str(), user_id);
        }
        Ok(updated)
    }

    async fn modify_auth_providers(
        &self,
        user_id: &str,
        modify: impl FnOnce(&mut AuthProviders),
    ) -> Result<Option<UserAccountDto>, StoreError> {
        let Some(account) = self.find_by_user_id(user_id).await? else {
            return Ok(None);
        };

        let mut providers = account.auth_providers.unwrap_or_default();
        modify(&mut providers);

        self.update_for_user(
            user_id,
            UserAccountInput {
                auth_providers: Some(providers),
                ..Default::default()
            },
        )
        .await
    }
}
