use thiserror::Error;

use crate::conversation::MessageId;

/// Everything that can go wrong between a submission and its resolved message.
#[derive(Debug, Error)]
pub enum GenError {
    #[error("{0}")] InvalidInput(String),
    #[error("No paid API key is selected")] CredentialMissing,
    #[error("{0}")] GenerationFailed(String),
    #[error("network error: {0}")] Transport(#[from] reqwest::Error),
    #[error("provider returned {status}: {message}")]
    Provider { status: u16, message: String },
    #[error("malformed provider response: {0}")] Decode(#[from] serde_json::Error),
    #[error("video generation still pending after {attempts} polls")]
    PollTimeout { attempts: u32 },
    #[error("generation cancelled")] Cancelled,
}

impl GenError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "GEN-1001",
            Self::CredentialMissing => "GEN-1002",
            Self::GenerationFailed(_) => "GEN-1003",
            Self::Transport(_) => "NET-1001",
            Self::Provider { .. } => "NET-1002",
            Self::Decode(_) => "NET-1003",
            Self::PollTimeout { .. } => "VID-1001",
            Self::Cancelled => "VID-1002",
        }
    }
    pub fn explain(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "The submission was rejected before contacting the provider.",
            Self::CredentialMissing => "This mode needs a billable API key and none is active.",
            Self::GenerationFailed(_) => "The provider finished but produced no usable text or media.",
            Self::Transport(_) => "The request to the generation API could not be completed.",
            Self::Provider { .. } => "The generation API rejected the request.",
            Self::Decode(_) => "The generation API answered with a payload we could not read.",
            Self::PollTimeout { .. } => "The video job did not finish within the configured attempts.",
            Self::Cancelled => "The caller cancelled the request while it was in flight.",
        }
    }
}

/// Bookkeeping failures in the conversation store. These indicate a bug in the
/// caller, never a provider problem.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversationError {
    #[error("message {0} does not exist")] UnknownMessage(MessageId),
    #[error("message {0} was already resolved")] AlreadyResolved(MessageId),
}

impl ConversationError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownMessage(_) => "MSG-1001",
            Self::AlreadyResolved(_) => "MSG-1002",
        }
    }
}
