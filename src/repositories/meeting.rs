// Meeting repository
// Table: meetings, with transcriptions attached by context id on read

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};

use super::base::{optional, BaseRepository, Entity};
use super::transcription::TranscriptionRepository;
use crate::error::StoreError;
use crate::models::{
    DeleteResult, MeetingDto, MeetingInput, MeetingQuery, MeetingTranscription, PageRequest,
    PaginatedResponse, SortDirection,
};
use crate::store::{Filter, SupabaseClient};

impl Entity for MeetingDto {
    const TABLE: &'static str = "meetings";
}

/// Parsed bounds of a date filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct MeetingRepository {
    base: BaseRepository<MeetingDto>,
    transcriptions: TranscriptionRepository,
}

impl MeetingRepository {
    pub fn new(client: SupabaseClient) -> Self {
        Self {
            transcriptions: TranscriptionRepository::new(client.clone()),
            base: BaseRepository::new(client),
        }
    }

    pub async fn create_for_user(&self, user_id: &str, data: MeetingInput) -> Result<MeetingDto, StoreError> {
        let data = MeetingInput {
            duration: data.duration.or(Some(0)),
            key_points: data.key_points.or_else(|| Some(Vec::new())),
            action_items: data.action_items.or_else(|| Some(Vec::new())),
            decisions_made: data.decisions_made.or_else(|| Some(Vec::new())),
            language: data.language.or_else(|| Some("en".to_string())),
            ..data
        };
        let row = self.base.owned_row(user_id, &data)?;

        let created = self.base.table().insert(row).single().await?;
        let meeting = self.base.convert_to_dto(created)?;

        tracing::info!("Created meeting {} for user {}", meeting.id, user_id);
        Ok(meeting)
    }

    pub async fn list(&self, user_id: &str, query: MeetingQuery) -> Result<PaginatedResponse<MeetingDto>, StoreError> {
        let page = PageRequest::new(query.page, query.limit);
        let sort = query.sort.unwrap_or_default();
        let direction = query.sort_direction.unwrap_or(SortDirection::Desc);

        let mut request = self.base.table().eq("user_id", user_id);
        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            request = request.or(vec![
                Filter::ilike_contains("title", search),
                Filter::ilike_contains("summary", search),
            ]);
        }
        if let Some(from) = &query.from_date {
            request = request.gte("date", from);
        }
        if let Some(to) = &query.to_date {
            request = request.lte("date", to);
        }

        let (meetings, total) = self.base.paginate(request, page, sort.as_str(), direction).await?;

        Ok(PaginatedResponse::new(meetings, total, page).with_sort(query.search, sort.as_str(), direction))
    }

    pub async fn find_by_user_id_and_id(&self, user_id: &str, meeting_id: &str) -> Result<Option<MeetingDto>, StoreError> {
        let row = optional(
            self.base
                .table()
                .eq("user_id", user_id)
                .eq("id", meeting_id)
                .single()
                .await,
        )?;
        row.map(|r| self.base.convert_to_dto(r)).transpose()
    }

    pub async fn update_for_user(
        &self,
        user_id: &str,
        meeting_id: &str,
        updates: MeetingInput,
    ) -> Result<Option<MeetingDto>, StoreError> {
        let row = self.base.convert_to_row(&updates)?;

        let updated = optional(
            self.base
                .table()
                .update(row)
                .eq("user_id", user_id)
                .eq("id", meeting_id)
                .single()
                .await,
        )?;

        match updated {
            Some(row) => {
                let meeting = self.base.convert_to_dto(row)?;
                tracing::info!("Updated meeting {} for user {}", meeting_id, user_id);
                Ok(Some(meeting))
            }
            None => Ok(None),
        }
    }

    pub async fn delete_for_user(&self, user_id: &str, meeting_id: &str) -> Result<DeleteResult, StoreError> {
        let response = self
            .base
            .table()
            .delete()
            .eq("user_id", user_id)
            .eq("id", meeting_id)
            .execute()
            .await?;

        let result = DeleteResult::from_row_count(response.rows.len() as u64);
        if result.deleted {
            tracing::info!("Deleted meeting {} for user {}", meeting_id, user_id);
        }
        Ok(result)
    }

    pub async fn find_by_transcription_id(
        &self,
        user_id: &str,
        transcription_id: &str,
    ) -> Result<Option<MeetingDto>, StoreError> {
        let row = optional(
            self.base
                .table()
                .eq("user_id", user_id)
                .eq("transcription_id", transcription_id)
                .single()
                .await,
        )?;
        row.map(|r| self.base.convert_to_dto(r)).transpose()
    }

    /// `list`, with each meeting's latest transcription attached
    pub async fn list_with_transcriptions(
        &self,
        user_id: &str,
        query: MeetingQuery,
    ) -> Result<PaginatedResponse<MeetingDto>, StoreError> {
        let mut response = self.list(user_id, query).await?;

        let meeting_ids: Vec<String> = response.data.iter().map(|m| m.id.clone()).collect();
        let transcriptions = self.transcriptions.find_by_context_ids(user_id, &meeting_ids).await?;

        // newest first, so the first one seen per meeting wins
        let mut latest: HashMap<String, MeetingTranscription> = HashMap::new();
        for transcription in transcriptions {
            latest
                .entry(transcription.context_id.clone())
                .or_insert_with(|| transcription.into());
        }

        for meeting in &mut response.data {
            meeting.transcription = latest.remove(&meeting.id);
        }

        Ok(response)
    }

    pub async fn find_by_user_id_and_id_with_transcription(
        &self,
        user_id: &str,
        meeting_id: &str,
    ) -> Result<Option<MeetingDto>, StoreError> {
        let Some(mut meeting) = self.find_by_user_id_and_id(user_id, meeting_id).await? else {
            return Ok(None);
        };

        meeting.transcription = self
            .transcriptions
            .find_by_context_id(user_id, meeting_id)
            .await?
            .map(MeetingTranscription::from);

        Ok(Some(meeting))
    }

    /// Parse optional `fromDate`/`toDate` bounds (RFC 3339 or `YYYY-MM-DD`)
    pub fn validate_date_range(&self, from_date: Option<&str>, to_date: Option<&str>) -> Result<DateRange, StoreError> {
        let range = DateRange {
            from: from_date.map(|s| parse_date(s, "fromDate")).transpose()?,
            to: to_date.map(|s| parse_date(s, "toDate")).transpose()?,
        };

        if let (Some(from), Some(to)) = (range.from, range.to) {
            if from > to {
                return Err(StoreError::Validation("fromDate cannot be after toDate".to_string()));
            }
        }

        Ok(range)
    }
}

fn parse_date(value: &str, field: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(value)
        .map(|d| d.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|d| d.and_utc())
        })
        .ok_or_else(|| StoreError::Validation(format!("Invalid {} format: {}", field, value)))
}
