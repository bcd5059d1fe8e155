// Mail models - results of the inbox-processing pipeline
// Tables: email_processing_results, email_actions, email_extracted_tasks, email_response_drafts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailClassification {
    Important,
    Personal,
    Work,
    Newsletter,
    Spam,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailPriority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailSentiment {
    Positive,
    Neutral,
    Negative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailActionType {
    Archive,
    Delete,
    Label,
    Forward,
    Reply,
    Snooze,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailActionStatus {
    Pending,
    Completed,
    Failed,
}

impl EmailActionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailActionStatus::Pending => "pending",
            EmailActionStatus::Completed => "completed",
            EmailActionStatus::Failed => "failed",
        }
    }
}

/// Priority of a task extracted from an email
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftStatus {
    #[default]
    PendingReview,
    Approved,
    Sent,
    Rejected,
}

impl DraftStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DraftStatus::PendingReview => "pending_review",
            DraftStatus::Approved => "approved",
            DraftStatus::Sent => "sent",
            DraftStatus::Rejected => "rejected",
        }
    }
}

// ============================================================================
// Processing results
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailProcessingResultDto {
    pub id: String,
    pub user_id: String,
    pub email_id: String,
    pub thread_id: String,
    pub account_id: String,
    pub from_address: String,
    pub subject: String,
    pub received_at: DateTime<Utc>,
    pub classification: EmailClassification,
    pub priority: EmailPriority,
    pub requires_response: bool,
    pub sentiment: EmailSentiment,
    pub summary: String,
    pub confidence_score: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailProcessingResultInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<EmailClassification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<EmailPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_response: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<EmailSentiment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f64>,
}

// ============================================================================
// Actions
// ============================================================================

/// An action proposed by the classifier, before it is stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailAction {
    #[serde(rename = "type")]
    pub action_type: EmailActionType,
    #[serde(default)]
    pub details: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailActionDto {
    pub id: String,
    pub user_id: String,
    pub email_id: String,
    pub account_id: String,
    pub action_type: EmailActionType,
    /// Free-form parameters for the action (label name, forward address, ...)
    #[serde(default)]
    pub action_details: Map<String, Value>,
    pub status: EmailActionStatus,
    pub requires_approval: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row written for each stored action
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NewEmailAction<'a> {
    pub email_id: &'a str,
    pub account_id: &'a str,
    pub action_type: EmailActionType,
    pub action_details: &'a Map<String, Value>,
    pub status: EmailActionStatus,
    pub requires_approval: bool,
}

// ============================================================================
// Extracted tasks
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailExtractedTaskDto {
    pub id: String,
    pub user_id: String,
    pub email_id: String,
    pub email_subject: String,
    pub description: String,
    /// Deadline as written by the extractor (date or timestamp string)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailExtractedTaskInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

// ============================================================================
// Response drafts
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailResponseDraftDto {
    pub id: String,
    pub user_id: String,
    pub email_id: String,
    pub thread_id: String,
    pub original_subject: String,
    pub draft_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_subject: Option<String>,
    pub reply_to_all: bool,
    pub requires_review: bool,
    pub status: DraftStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailResponseDraftInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_all: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_review: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DraftStatus>,
}
