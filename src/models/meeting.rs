// Meeting models
// Table: meetings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{null_as_default, SortDirection};
use super::transcription::{TranscriptionDto, TranscriptionParagraph};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingDto {
    pub id: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcription_id: Option<String>,
    pub title: String,
    /// Meeting date as stored (date or timestamp string)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub key_points: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub action_items: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub decisions_made: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agenda: Option<MeetingAgendaRef>,
    /// Attached on read; never stored on the meeting row
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcription: Option<MeetingTranscription>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Snapshot of the agenda a meeting was run against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingAgendaRef {
    pub id: String,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: Vec<MeetingAgendaCategoryRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingAgendaCategoryRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<MeetingAgendaItemRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingAgendaItemRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub discussed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

/// The transcription view embedded in a meeting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingTranscription {
    pub id: String,
    pub context_id: String,
    pub language: String,
    pub transcript: String,
    pub paragraphs: Vec<TranscriptionParagraph>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TranscriptionDto> for MeetingTranscription {
    fn from(t: TranscriptionDto) -> Self {
        Self {
            id: t.id,
            context_id: t.context_id,
            language: t.language,
            transcript: t.transcript,
            paragraphs: t.paragraphs,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

/// Fields accepted when creating or updating a meeting.
/// Unset fields are left out of the written row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcription_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_points: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_items: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decisions_made: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agenda: Option<MeetingAgendaRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Columns a meeting list can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MeetingSortField {
    #[default]
    Date,
    Title,
    Duration,
    CreatedAt,
    UpdatedAt,
}

impl MeetingSortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingSortField::Date => "date",
            MeetingSortField::Title => "title",
            MeetingSortField::Duration => "duration",
            MeetingSortField::CreatedAt => "createdAt",
            MeetingSortField::UpdatedAt => "updatedAt",
        }
    }
}

/// Query parameters for listing meetings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Case-insensitive match on title or summary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<MeetingSortField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_direction: Option<SortDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_transcription: Option<bool>,
}

/// Agenda item as checked off by the agenda-tracking workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateMeetingAgendaItem {
    pub id: String,
    pub title: String,
    pub discussed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateMeetingAgendaItemsInput {
    pub transcript: String,
    pub items: Vec<UpdateMeetingAgendaItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMeetingAgendaItemsResponse {
    pub discussed_item_ids: Vec<String>,
}
