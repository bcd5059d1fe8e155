// Conversation models - chat history per channel context
// Table: conversations (messages stored verbatim)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::null_as_default;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
    Tool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: MessageRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Raw tool calls as emitted by the language model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Value>,
}

impl ConversationMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Some(Utc::now().to_rfc3339()),
            tool_calls: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationDto {
    pub id: String,
    pub user_id: String,
    pub context_id: String,
    /// Message channel, e.g. `TELEGRAM`, `EMAIL`, `API`
    pub channel: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub messages: Vec<ConversationMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row written when a conversation is first created
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NewConversation<'a> {
    pub context_id: &'a str,
    pub channel: &'a str,
    pub title: &'a str,
    pub messages: Vec<ConversationMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub id: String,
    pub context_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub channel: String,
    /// First 100 characters of the latest message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<String>,
    pub message_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ConversationDto> for ConversationSummary {
    fn from(dto: ConversationDto) -> Self {
        let last_message = dto
            .messages
            .last()
            .map(|m| m.content.chars().take(100).collect::<String>());
        Self {
            id: dto.id,
            context_id: dto.context_id,
            title: dto.title,
            channel: dto.channel,
            last_message,
            message_count: dto.messages.len(),
            created_at: dto.created_at,
            updated_at: dto.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationListResponse {
    pub conversations: Vec<ConversationSummary>,
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_truncates_last_message() {
        let long = "x".repeat(150);
        let dto = ConversationDto {
            id: "c1".to_string(),
            user_id: "u1".to_string(),
            context_id: "ctx".to_string(),
            channel: "API".to_string(),
            title: None,
            messages: vec![
                ConversationMessage::new(MessageRole::User, "hi"),
                ConversationMessage::new(MessageRole::Assistant, long),
            ],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let summary = ConversationSummary::from(dto);
        assert_eq!(summary.message_count, 2);
        assert_eq!(summary.last_message.map(|m| m.len()), Some(100));
    }
}
