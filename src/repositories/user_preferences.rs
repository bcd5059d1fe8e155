// User preferences repository
// Reads and writes user_accounts.preferences

use serde_json::Value;

use super::base::{optional, BaseRepository};
use super::user_account::FREE_TIER;
use crate::error::StoreError;
use crate::models::{UserAccountDto, UserPreferences};
use crate::store::{Row, SupabaseClient};

#[derive(Clone)]
pub struct UserPreferencesRepository {
    base: BaseRepository<UserAccountDto>,
}

impl UserPreferencesRepository {
    pub fn new(client: SupabaseClient) -> Self {
        Self {
            base: BaseRepository::new(client),
        }
    }

    /// Stored preferences over the defaults
    pub async fn get(&self, user_id: &str) -> Result<UserPreferences, StoreError> {
        let stored = self.stored(user_id).await?.flatten().unwrap_or_default();
        Ok(UserPreferences::defaults().merge(stored))
    }

    /// Merge `partial` onto the current preferences and return what was saved.
    /// Creates a free-tier account when the user has none yet.
    pub async fn update(&self, user_id: &str, partial: UserPreferences) -> Result<UserPreferences, StoreError> {
        let stored = self.stored(user_id).await?;
        let account_exists = stored.is_some();

        let merged = UserPreferences::defaults()
            .merge(stored.flatten().unwrap_or_default())
            .merge(partial);
        let preferences = serde_json::to_value(&merged)?;

        let saved = if account_exists {
            let mut row = Row::new();
            row.insert("preferences".to_string(), preferences);
            self.base.table().update(row).eq("user_id", user_id).single().await?
        } else {
            let mut row = Row::new();
            row.insert("user_id".to_string(), Value::from(user_id));
            row.insert("preferences".to_string(), preferences);
            row.insert("total_credits".to_string(), Value::from(0));
            row.insert("used_credits".to_string(), Value::from(0));
            row.insert("subscription_tier".to_string(), Value::from(FREE_TIER));
            let created = self.base.table().insert(row).single().await?;
            tracing::info!("Created account for user {} while saving preferences", user_id);
            created
        };

        tracing::info!("Updated preferences for user {}", user_id);
        Ok(decode_preferences(saved)?.unwrap_or(merged))
    }

    /// `None` without an account, `Some(None)` when the column is empty
    async fn stored(&self, user_id: &str) -> Result<Option<Option<UserPreferences>>, StoreError> {
        let row = optional(
            self.base
                .table()
                .select("preferences")
                .eq("user_id", user_id)
                .single()
                .await,
        )?;

        row.map(decode_preferences).transpose()
    }
}

/// The `preferences` column of an account row, `None` when empty
fn decode_preferences(mut row: Row) -> Result<Option<UserPreferences>, StoreError> {
    match row.remove("preferences") {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| StoreError::decode("user_accounts", e)),
    }
}
