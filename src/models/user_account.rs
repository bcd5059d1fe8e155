// User account models - credits, subscription, linked providers and preferences
// Table: user_accounts (keyed by user_id, preferences stored verbatim)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::null_as_default;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GmailAuth {
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: String,
    #[serde(default)]
    pub scopes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelegramAuth {
    pub chat_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// Linked login/integration providers, one slot per provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthProviders {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gmail: Option<GmailAuth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telegram: Option<TelegramAuth>,
}

impl AuthProviders {
    /// Store credentials in the provider's slot, replacing what was there
    pub fn set(&mut self, provider: AuthProvider) {
        match provider {
            AuthProvider::Gmail(auth) => self.gmail = Some(auth),
            AuthProvider::Telegram(auth) => self.telegram = Some(auth),
        }
    }

    pub fn remove(&mut self, kind: AuthProviderKind) {
        match kind {
            AuthProviderKind::Gmail => self.gmail = None,
            AuthProviderKind::Telegram => self.telegram = None,
        }
    }
}

/// Credentials for one provider, tagged by provider name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    Gmail(GmailAuth),
    Telegram(TelegramAuth),
}

impl AuthProvider {
    pub fn kind(&self) -> AuthProviderKind {
        match self {
            AuthProvider::Gmail(_) => AuthProviderKind::Gmail,
            AuthProvider::Telegram(_) => AuthProviderKind::Telegram,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProviderKind {
    Gmail,
    Telegram,
}

impl AuthProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthProviderKind::Gmail => "gmail",
            AuthProviderKind::Telegram => "telegram",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kai_personality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dark_mode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_key: Option<String>,
}

impl UserPreferences {
    /// Preferences for a user who has never changed anything
    pub fn defaults() -> Self {
        Self {
            kai_personality: Some("professional".to_string()),
            color_theme: Some("default".to_string()),
            dark_mode: Some(false),
            language_key: Some("en".to_string()),
        }
    }

    /// Overlay the fields set in `partial`
    pub fn merge(self, partial: UserPreferences) -> Self {
        Self {
            kai_personality: partial.kai_personality.or(self.kai_personality),
            color_theme: partial.color_theme.or(self.color_theme),
            dark_mode: partial.dark_mode.or(self.dark_mode),
            language_key: partial.language_key.or(self.language_key),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccountDto {
    pub id: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_providers: Option<AuthProviders>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub enabled_tools: Vec<String>,
    pub total_credits: i64,
    pub used_credits: i64,
    pub subscription_tier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<UserPreferences>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccountInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_providers: Option<AuthProviders>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled_tools: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_credits: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_credits: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_tier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<UserPreferences>,
}
