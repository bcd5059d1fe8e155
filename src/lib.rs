// Kai SDK - typed workflow client and Supabase data access for the Kai assistant

pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod models;
pub mod naming;
pub mod repositories;
pub mod store;
pub mod workflows;

pub use config::Config;
pub use context::KaiContext;
pub use error::{ConfigError, ExecutionOutcome, StoreError, WorkflowError};
pub use store::SupabaseClient;
pub use workflows::{KaiTemporalClient, KaiTemporalClientOptions, WorkflowRegistry};
