// Transcription models - speech-to-text output attached to a meeting or conversation
// Table: transcriptions (paragraphs stored verbatim)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::null_as_default;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionSentence {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

/// Paragraph as produced by the speech-to-text provider.
/// Keys are kept exactly as the provider writes them (`num_words`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionParagraph {
    #[serde(default)]
    pub sentences: Vec<TranscriptionSentence>,
    pub speaker: i64,
    pub num_words: i64,
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionDto {
    pub id: String,
    pub user_id: String,
    /// Id of the meeting or conversation this transcription belongs to
    pub context_id: String,
    pub language: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub transcript: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub paragraphs: Vec<TranscriptionParagraph>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating a transcription
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paragraphs: Option<Vec<TranscriptionParagraph>>,
}
