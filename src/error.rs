// Error types for the store, workflow and configuration layers

use std::fmt;

use thiserror::Error;

/// PostgREST code for "the result contains 0 rows" on a single-object request
pub const NOT_FOUND_CODE: &str = "PGRST116";

/// PostgREST code for "requested range not satisfiable"
pub const RANGE_NOT_SATISFIABLE_CODE: &str = "PGRST103";

/// Errors raised by the Supabase store and the repositories built on it
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store answered with an error body
    #[error("store request failed ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
        details: Option<String>,
        hint: Option<String>,
    },

    #[error("store transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A row came back in a shape the DTO cannot represent
    #[error("failed to decode {table} row: {source}")]
    Decode {
        table: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("invalid input: {0}")]
    Validation(String),
}

impl StoreError {
    /// The "no matching row" signal, which repositories turn into `None`/`false`
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::Api { code: Some(code), .. } if code == NOT_FOUND_CODE)
    }

    /// Build the error PostgREST returns when a single-object request matches no row
    pub fn not_found(table: &str) -> Self {
        StoreError::Api {
            status: 406,
            code: Some(NOT_FOUND_CODE.to_string()),
            message: format!("JSON object requested, multiple (or no) rows returned from {}", table),
            details: Some("The result contains 0 rows".to_string()),
            hint: None,
        }
    }

    /// Parse a PostgREST error body (`{code, message, details, hint}`)
    pub fn from_response(status: u16, body: &str) -> Self {
        #[derive(serde::Deserialize)]
        struct ErrorBody {
            code: Option<String>,
            message: Option<String>,
            details: Option<String>,
            hint: Option<String>,
        }

        match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => StoreError::Api {
                status,
                code: parsed.code,
                message: parsed.message.unwrap_or_else(|| body.to_string()),
                details: parsed.details,
                hint: parsed.hint,
            },
            Err(_) => StoreError::Api {
                status,
                code: None,
                message: body.to_string(),
                details: None,
                hint: None,
            },
        }
    }

    pub fn decode(table: &str, source: serde_json::Error) -> Self {
        StoreError::Decode {
            table: table.to_string(),
            source,
        }
    }
}

/// How a workflow execution ended when it did not complete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Failed,
    TimedOut,
    Terminated,
    Canceled,
}

impl fmt::Display for ExecutionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed => write!(f, "failed"),
            Self::TimedOut => write!(f, "timed out"),
            Self::Terminated => write!(f, "was terminated"),
            Self::Canceled => write!(f, "was canceled"),
        }
    }
}

/// Errors raised by the workflow client.
///
/// `Clone` because a single initialization failure is handed to every caller
/// waiting on the shared connection.
#[derive(Debug, Clone, Error)]
pub enum WorkflowError {
    #[error("failed to connect to workflow engine at {address}: {message}")]
    Connection { address: String, message: String },

    #[error("workflow engine transport error: {0}")]
    Transport(String),

    #[error("workflow engine rejected request ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("workflow {workflow_id} {outcome}: {message}")]
    Execution {
        workflow_id: String,
        outcome: ExecutionOutcome,
        message: String,
    },

    #[error("failed to encode workflow arguments: {0}")]
    Encode(String),

    #[error("failed to decode workflow result: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for WorkflowError {
    fn from(e: reqwest::Error) -> Self {
        WorkflowError::Transport(e.to_string())
    }
}

/// Missing or malformed configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),
}
