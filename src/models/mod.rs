// Models module

pub mod common;
pub mod contact;
pub mod conversation;
pub mod mail;
pub mod meeting;
pub mod meeting_agenda;
pub mod todo;
pub mod tools;
pub mod transcription;
pub mod user_account;
pub mod workflow;

pub use common::{DeleteResult, PageRequest, PaginatedResponse, SortDirection, SuccessResponse};
pub use contact::{ContactDto, ContactInput, ContactList};
pub use conversation::{
    ConversationDto, ConversationListResponse, ConversationMessage, ConversationQuery,
    ConversationSummary, MessageRole,
};
pub(crate) use conversation::NewConversation;
pub use mail::{
    DraftStatus, EmailAction, EmailActionDto, EmailActionStatus, EmailActionType,
    EmailClassification, EmailExtractedTaskDto, EmailExtractedTaskInput, EmailPriority,
    EmailProcessingResultDto, EmailProcessingResultInput, EmailResponseDraftDto,
    EmailResponseDraftInput, EmailSentiment, TaskPriority, TaskStatus,
};
pub(crate) use mail::NewEmailAction;
pub use meeting::{
    MeetingAgendaCategoryRef, MeetingAgendaItemRef, MeetingAgendaRef, MeetingDto, MeetingInput,
    MeetingQuery, MeetingSortField, MeetingTranscription, UpdateMeetingAgendaItem, UpdateMeetingAgendaItemsInput,
    UpdateMeetingAgendaItemsResponse,
};
pub use meeting_agenda::{
    MeetingAgendaCategory, MeetingAgendaDto, MeetingAgendaInput, MeetingAgendaItem,
    MeetingAgendaQuery, MeetingAgendaSortField,
};
pub use todo::{TodoDto, TodoInput, TodoPriority, TodoQuery, TodoSortField, TodoStatus};
pub use tools::{AskKaiResponse, AuthUser, OpenAIToolCall};
pub use transcription::{
    TranscriptionDto, TranscriptionInput, TranscriptionParagraph, TranscriptionSentence,
};
pub use user_account::{
    AuthProvider, AuthProviderKind, AuthProviders, GmailAuth, TelegramAuth, UserAccountDto,
    UserAccountInput, UserPreferences,
};
pub use workflow::{
    CreateMeetingAgendaParams, CreateMeetingParams, DeleteMeetingAgendaParams, DeleteMeetingParams,
    GetMeetingAgendaByIdParams, GetMeetingAgendasParams, GetMeetingByIdParams, GetMeetingsParams,
    OpenAIToolCallParams, UpdateMeetingAgendaItemsParams, UpdateMeetingAgendaParams,
    UpdateMeetingParams, WorkflowResult, WorkflowStartOptions, KAI_TASK_QUEUE,
};
