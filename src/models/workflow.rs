// Workflow models - start options, results and per-workflow parameters

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::meeting::{MeetingInput, MeetingQuery, UpdateMeetingAgendaItemsInput};
use super::meeting_agenda::{MeetingAgendaInput, MeetingAgendaQuery};
use super::tools::{AuthUser, OpenAIToolCall};

/// Task queue served by the Kai workers
pub const KAI_TASK_QUEUE: &str = "The Kai-munnication Pipeline";

/// Outcome of a completed workflow execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowResult<T> {
    pub workflow_id: String,
    pub run_id: String,
    pub result: T,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowStartOptions {
    /// Defaults to `{workflow name}-{unix millis}`
    pub workflow_id: Option<String>,
    pub workflow_execution_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct GetMeetingsParams {
    pub user: AuthUser,
    pub query_dto: MeetingQuery,
}

#[derive(Debug, Clone)]
pub struct GetMeetingByIdParams {
    pub user: AuthUser,
    pub meeting_id: String,
}

#[derive(Debug, Clone)]
pub struct CreateMeetingParams {
    pub user: AuthUser,
    pub meeting_data: MeetingInput,
}

#[derive(Debug, Clone)]
pub struct UpdateMeetingParams {
    pub user: AuthUser,
    pub meeting_id: String,
    pub meeting_data: MeetingInput,
}

#[derive(Debug, Clone)]
pub struct DeleteMeetingParams {
    pub user: AuthUser,
    pub meeting_id: String,
}

#[derive(Debug, Clone)]
pub struct GetMeetingAgendasParams {
    pub user: AuthUser,
    pub query_filters: MeetingAgendaQuery,
}

#[derive(Debug, Clone)]
pub struct GetMeetingAgendaByIdParams {
    pub user: AuthUser,
    pub agenda_id: String,
}

#[derive(Debug, Clone)]
pub struct CreateMeetingAgendaParams {
    pub user: AuthUser,
    pub meeting_agenda_data: MeetingAgendaInput,
}

#[derive(Debug, Clone)]
pub struct UpdateMeetingAgendaParams {
    pub user: AuthUser,
    pub agenda_id: String,
    pub meeting_agenda_data: MeetingAgendaInput,
}

#[derive(Debug, Clone)]
pub struct DeleteMeetingAgendaParams {
    pub user: AuthUser,
    pub agenda_id: String,
}

#[derive(Debug, Clone)]
pub struct OpenAIToolCallParams {
    pub user: AuthUser,
    pub tool_call_message: OpenAIToolCall,
}

#[derive(Debug, Clone)]
pub struct UpdateMeetingAgendaItemsParams {
    pub user: AuthUser,
    pub input: UpdateMeetingAgendaItemsInput,
}
