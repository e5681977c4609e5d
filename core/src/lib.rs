//! Core library behind the Chaitanya multimodal chat client.
//!
//! The view layer owns rendering and input widgets; everything it needs to
//! turn a draft into conversation messages lives here:
//! - [`session`] holds the draft (mode, settings, attachment) and runs submissions.
//! - [`genai`] builds provider requests, talks to the Gemini API, polls video
//!   jobs, and normalizes responses.
//! - [`conversation`] is the append-only transcript with placeholder messages.
//! - [`modes`] describes each mode to the UI (labels, models, settings options).
//! - [`errors`] keeps the error catalogue with stable codes.
//! - [`logging`] emits structured diagnostics through the `log` facade.
//! - [`config`] loads API key, endpoint, and polling policy.

pub mod config;
pub mod conversation;
pub mod errors;
pub mod genai;
pub mod logging;
pub mod modes;
pub mod session;
pub mod types;

pub use config::{GenAiConfig, PollPolicy};
pub use conversation::{ContentItem, Conversation, Message, MessageId, Role};
pub use errors::{ConversationError, GenError};
pub use genai::Generator;
pub use session::{ChatSession, SubmitOutcome};
pub use types::{Attachment, GenerationResult, GenerationSettings, MediaType, Mode};
