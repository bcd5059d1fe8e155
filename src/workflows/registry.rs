// Workflow registry - typed wrappers for every workflow served on the Kai task queue

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::client::KaiTemporalClient;
use crate::error::WorkflowError;
use crate::models::{
    AskKaiResponse, CreateMeetingAgendaParams, CreateMeetingParams, DeleteMeetingAgendaParams, DeleteMeetingParams,
    GetMeetingAgendaByIdParams, GetMeetingAgendasParams, GetMeetingByIdParams, GetMeetingsParams, MeetingAgendaDto,
    MeetingDto, OpenAIToolCallParams, PaginatedResponse, SuccessResponse, UpdateMeetingAgendaItemsParams,
    UpdateMeetingAgendaItemsResponse, UpdateMeetingAgendaParams, UpdateMeetingParams, WorkflowResult,
    WorkflowStartOptions, KAI_TASK_QUEUE,
};

/// A workflow the Kai workers implement
pub trait KaiWorkflow {
    /// Workflow type name registered with the engine
    const NAME: &'static str;
    const TIMEOUT: Duration;

    type Params;
    type Output: DeserializeOwned + Send;

    /// Positional arguments, in the order the workflow function takes them
    fn args(params: Self::Params) -> Result<Vec<Value>, WorkflowError>;
}

fn to_arg<T: Serialize>(value: T) -> Result<Value, WorkflowError> {
    serde_json::to_value(value).map_err(|e| WorkflowError::Encode(e.to_string()))
}

macro_rules! kai_workflows {
    ($(
        $(#[$meta:meta])*
        $method:ident => $marker:ident {
            name: $name:literal,
            timeout_secs: $secs:literal,
            params: $params:ty,
            output: $output:ty,
            args: |$p:ident| [$($arg:expr),+ $(,)?],
        }
    )+) => {
        $(
            pub struct $marker;

            impl KaiWorkflow for $marker {
                const NAME: &'static str = $name;
                const TIMEOUT: Duration = Duration::from_secs($secs);

                type Params = $params;
                type Output = $output;

                fn args($p: $params) -> Result<Vec<Value>, WorkflowError> {
                    Ok(vec![$(to_arg($arg)?),+])
                }
            }
        )+

        impl WorkflowRegistry {
            $(
                $(#[$meta])*
                pub async fn $method(
                    &self,
                    workflow_id: Option<String>,
                    params: $params,
                ) -> Result<WorkflowResult<$output>, WorkflowError> {
                    self.run::<$marker>(workflow_id, params).await
                }
            )+
        }
    };
}

/// Typed entry points, one per workflow. `workflow_id` defaults to
/// `{workflow type}-{unix millis}`.
#[derive(Clone)]
pub struct WorkflowRegistry {
    client: KaiTemporalClient,
}

impl WorkflowRegistry {
    pub fn new(client: KaiTemporalClient) -> Self {
        Self { client }
    }

    /// Run any registered workflow to completion
    pub async fn run<W: KaiWorkflow>(
        &self,
        workflow_id: Option<String>,
        params: W::Params,
    ) -> Result<WorkflowResult<W::Output>, WorkflowError> {
        let args = W::args(params)?;
        tracing::debug!("Running {} on {}", W::NAME, KAI_TASK_QUEUE);

        self.client
            .start_workflow(
                W::NAME,
                KAI_TASK_QUEUE,
                args,
                WorkflowStartOptions {
                    workflow_id,
                    workflow_execution_timeout: W::TIMEOUT,
                },
            )
            .await
    }
}

kai_workflows! {
    get_meetings => GetMeetingsWorkflow {
        name: "getMeetingsWorkflow",
        timeout_secs: 120,
        params: GetMeetingsParams,
        output: PaginatedResponse<MeetingDto>,
        args: |p| [p.user, p.query_dto],
    }

    get_meeting_by_id => GetMeetingByIdWorkflow {
        name: "getMeetingByIdWorkflow",
        timeout_secs: 60,
        params: GetMeetingByIdParams,
        output: Option<MeetingDto>,
        args: |p| [p.user, p.meeting_id],
    }

    create_meeting => CreateMeetingWorkflow {
        name: "createMeetingWorkflow",
        timeout_secs: 60,
        params: CreateMeetingParams,
        output: MeetingDto,
        args: |p| [p.user, p.meeting_data],
    }

    update_meeting => UpdateMeetingWorkflow {
        name: "updateMeetingWorkflow",
        timeout_secs: 60,
        params: UpdateMeetingParams,
        output: MeetingDto,
        args: |p| [p.user, p.meeting_id, p.meeting_data],
    }

    delete_meeting => DeleteMeetingWorkflow {
        name: "deleteMeetingWorkflow",
        timeout_secs: 60,
        params: DeleteMeetingParams,
        output: SuccessResponse,
        args: |p| [p.user, p.meeting_id],
    }

    get_meeting_agendas => GetMeetingAgendasWorkflow {
        name: "getMeetingAgendasWorkflow",
        timeout_secs: 120,
        params: GetMeetingAgendasParams,
        output: PaginatedResponse<MeetingAgendaDto>,
        args: |p| [p.user, p.query_filters],
    }

    get_meeting_agenda_by_id => GetMeetingAgendaByIdWorkflow {
        name: "getMeetingAgendaByIdWorkflow",
        timeout_secs: 60,
        params: GetMeetingAgendaByIdParams,
        output: Option<MeetingAgendaDto>,
        args: |p| [p.user, p.agenda_id],
    }

    create_meeting_agenda => CreateMeetingAgendaWorkflow {
        name: "createMeetingAgendaWorkflow",
        timeout_secs: 60,
        params: CreateMeetingAgendaParams,
        output: MeetingAgendaDto,
        args: |p| [p.user, p.meeting_agenda_data],
    }

    update_meeting_agenda => UpdateMeetingAgendaWorkflow {
        name: "updateMeetingAgendaWorkflow",
        timeout_secs: 60,
        params: UpdateMeetingAgendaParams,
        output: Option<MeetingAgendaDto>,
        args: |p| [p.user, p.agenda_id, p.meeting_agenda_data],
    }

    delete_meeting_agenda => DeleteMeetingAgendaWorkflow {
        name: "deleteMeetingAgendaWorkflow",
        timeout_secs: 60,
        params: DeleteMeetingAgendaParams,
        output: SuccessResponse,
        args: |p| [p.user, p.agenda_id],
    }

    /// Hand a chat message to Kai and wait for the answer
    ask_kai => AskKaiWorkflow {
        name: "askKaiWorkflow",
        timeout_secs: 120,
        params: OpenAIToolCallParams,
        output: AskKaiResponse,
        args: |p| [p.user, p.tool_call_message],
    }

    /// Check agenda items off against a meeting transcript
    update_meeting_agenda_items => UpdateMeetingAgendaItemsWorkflow {
        name: "updateMeetingAgendaItemsWorkflow",
        timeout_secs: 120,
        params: UpdateMeetingAgendaItemsParams,
        output: UpdateMeetingAgendaItemsResponse,
        args: |p| [p.user, p.input],
    }
}
