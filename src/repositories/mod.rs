// Repositories - one per table, all built on BaseRepository

pub mod base;
pub mod contact;
pub mod conversation;
pub mod email_action;
pub mod email_extracted_task;
pub mod email_processing_result;
pub mod email_response_draft;
pub mod meeting;
pub mod meeting_agenda;
pub mod todo;
pub mod transcription;
pub mod user_account;
pub mod user_preferences;

pub use base::{optional, BaseRepository, Entity};
pub use contact::ContactRepository;
pub use conversation::ConversationRepository;
pub use email_action::EmailActionRepository;
pub use email_extracted_task::EmailExtractedTaskRepository;
pub use email_processing_result::EmailProcessingResultRepository;
pub use email_response_draft::EmailResponseDraftRepository;
pub use meeting::{DateRange, MeetingRepository};
pub use meeting_agenda::MeetingAgendaRepository;
pub use todo::TodoRepository;
pub use transcription::TranscriptionRepository;
pub use user_account::UserAccountRepository;
pub use user_preferences::UserPreferencesRepository;
