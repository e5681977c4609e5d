//! Append-only conversation transcript with placeholder-then-resolve updates.
//!
//! A submission appends the user's message and a loading placeholder for the
//! model in one step; the placeholder is later patched exactly once through
//! [`Conversation::resolve`]. Messages are never removed.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::errors::ConversationError;
use crate::types::{Attachment, GenerationResult, MediaType};

/// Time-ordered message identifier.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    fn next() -> Self {
        Self(Uuid::now_v7())
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
    System,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImageSource {
    Url(String),
    Inline(Attachment),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentItem {
    Text { text: String },
    Image { source: ImageSource },
    Video {
        #[serde(rename = "mediaUrl")]
        media_url: String,
    },
}

impl ContentItem {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            _ => None,
        }
    }
}

impl GenerationResult {
    /// Text first, then media, matching how results are displayed.
    pub fn into_content(self) -> Vec<ContentItem> {
        let mut items = Vec::with_capacity(2);
        if let Some(text) = self.text.filter(|t| !t.is_empty()) {
            items.push(ContentItem::Text { text });
        }
        if let Some(url) = self.media_url {
            items.push(match self.media_type {
                Some(MediaType::Video) => ContentItem::Video { media_url: url },
                _ => ContentItem::Image {
                    source: ImageSource::Url(url),
                },
            });
        }
        items
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: Vec<ContentItem>,
    /// Unix time in milliseconds.
    pub timestamp: i64,
    pub is_loading: bool,
}

impl Message {
    fn new(role: Role, content: Vec<ContentItem>, is_loading: bool) -> Self {
        Self {
            id: MessageId::next(),
            role,
            content,
            timestamp: now_millis(),
            is_loading,
        }
    }
}

/// Final content for a placeholder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Content(Vec<ContentItem>),
    Error(String),
}

#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    index: HashMap<MessageId, usize>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the user's message and a loading model placeholder; returns the
    /// placeholder id.
    pub fn submit(&mut self, user_content: Vec<ContentItem>) -> MessageId {
        self.push(Message::new(Role::User, user_content, false));
        self.push(Message::new(Role::Model, Vec::new(), true))
    }

    pub fn resolve(
        &mut self,
        id: MessageId,
        resolution: Resolution,
    ) -> Result<&Message, ConversationError> {
        let idx = *self
            .index
            .get(&id)
            .ok_or(ConversationError::UnknownMessage(id))?;
        let message = &mut self.messages[idx];
        if !message.is_loading {
            return Err(ConversationError::AlreadyResolved(id));
        }
        message.content = match resolution {
            Resolution::Content(items) => items,
            Resolution::Error(text) => vec![ContentItem::text(format!("Error: {text}"))],
        };
        message.is_loading = false;
        Ok(message)
    }

    /// Append an already-final system notice.
    pub fn push_system(&mut self, text: impl Into<String>) -> MessageId {
        self.push(Message::new(Role::System, vec![ContentItem::text(text)], false))
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.index.get(&id).map(|&idx| &self.messages[idx])
    }

    /// Id of the placeholder still waiting for its result.
    pub fn pending(&self) -> Option<MessageId> {
        self.messages.iter().rev().find(|m| m.is_loading).map(|m| m.id)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn push(&mut self, message: Message) -> MessageId {
        let id = message.id;
        self.index.insert(id, self.messages.len());
        self.messages.push(message);
        id
    }
}

fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}
