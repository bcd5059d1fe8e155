// Configuration - Environment variables

use std::env;

use crate::error::ConfigError;
use crate::workflows::client::{DEFAULT_TEMPORAL_ADDRESS, DEFAULT_TEMPORAL_NAMESPACE};
use crate::workflows::KaiTemporalClientOptions;

pub const DEFAULT_LOG_FILE: &str = "/tmp/kai-sdk.log";

/// SDK configuration loaded from environment
#[derive(Clone)]
pub struct Config {
    /// Supabase project URL
    pub supabase_url: Option<String>,
    /// Service role key (falls back to SUPABASE_KEY)
    pub supabase_key: Option<String>,
    /// Temporal HTTP API address, host:port
    pub temporal_address: String,
    pub temporal_namespace: String,
    pub temporal_api_key: Option<String>,
    pub temporal_tls: bool,
    pub log_file: String,
    /// User the CLI acts as
    pub user_id: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            supabase_url: env::var("SUPABASE_URL").ok(),
            supabase_key: env::var("SUPABASE_SERVICE_ROLE_KEY")
                .ok()
                .or_else(|| env::var("SUPABASE_KEY").ok()),
            temporal_address: env::var("TEMPORAL_ADDRESS").unwrap_or_else(|_| DEFAULT_TEMPORAL_ADDRESS.to_string()),
            temporal_namespace: env::var("TEMPORAL_NAMESPACE")
                .unwrap_or_else(|_| DEFAULT_TEMPORAL_NAMESPACE.to_string()),
            temporal_api_key: env::var("TEMPORAL_API_KEY").ok(),
            temporal_tls: env::var("TEMPORAL_TLS")
                .ok()
                .map(|v| parse_bool(&v))
                .unwrap_or(false),
            log_file: env::var("KAI_LOG_FILE").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string()),
            user_id: env::var("KAI_USER_ID").ok(),
        }
    }

    /// Store settings are required; the rest only warn
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.supabase_url.is_none() {
            return Err(ConfigError::Missing("SUPABASE_URL"));
        }
        if self.supabase_key.is_none() {
            return Err(ConfigError::Missing("SUPABASE_SERVICE_ROLE_KEY"));
        }
        if self.temporal_api_key.is_none() {
            tracing::warn!("TEMPORAL_API_KEY not set - connecting to {} without auth", self.temporal_address);
        }
        if self.user_id.is_none() {
            tracing::warn!("KAI_USER_ID not set - user-scoped CLI commands will fail");
        }
        Ok(())
    }

    pub fn temporal_options(&self) -> KaiTemporalClientOptions {
        KaiTemporalClientOptions {
            address: self.temporal_address.clone(),
            namespace: self.temporal_namespace.clone(),
            tls: self.temporal_tls,
            api_key: self.temporal_api_key.clone(),
            ..Default::default()
        }
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
