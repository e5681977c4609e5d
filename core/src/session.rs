//! Chat session: the draft a user is composing plus the transcript it feeds.
//!
//! [`ChatSession::submit`] is the single place where generation failures turn
//! into visible model messages. It borrows the session mutably for the whole
//! request, so only one submission can be in flight at a time. If the submit
//! future is dropped mid-request the placeholder is still resolved, as a
//! cancellation error.

use std::sync::Arc;

use log::Level;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::conversation::{ContentItem, Conversation, ImageSource, MessageId, Resolution};
use crate::errors::{ConversationError, GenError};
use crate::genai::Generator;
use crate::logging::log_event;
use crate::modes::{mode_info, ModeInfo};
use crate::types::{Attachment, GenerationSettings, Mode, SettingsPatch};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing to send; the transcript is unchanged.
    Ignored,
    Completed(MessageId),
    /// The placeholder was resolved with an error message.
    Failed { message_id: MessageId, code: &'static str },
}

pub struct ChatSession {
    generator: Arc<Generator>,
    conversation: Conversation,
    mode: Mode,
    settings: GenerationSettings,
    attachment: Option<Attachment>,
}

impl ChatSession {
    pub fn new(generator: Arc<Generator>) -> Self {
        Self {
            generator,
            conversation: Conversation::new(),
            mode: Mode::default(),
            settings: GenerationSettings::default(),
            attachment: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn mode_info(&self) -> &'static ModeInfo {
        mode_info(self.mode)
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub fn update_settings(&mut self, patch: SettingsPatch) {
        self.settings.apply(patch);
    }

    pub fn attach(&mut self, attachment: Attachment) {
        self.attachment = Some(attachment);
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    pub fn clear_attachment(&mut self) -> Option<Attachment> {
        self.attachment.take()
    }

    /// True while a placeholder is waiting for its reply.
    pub fn is_loading(&self) -> bool {
        self.conversation.pending().is_some()
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub async fn submit(&mut self, input: &str) -> Result<SubmitOutcome, ConversationError> {
        self.submit_with_cancel(input, &CancellationToken::new()).await
    }

    /// Send the draft. Returns `Err` only for transcript bookkeeping bugs;
    /// generation failures are written into the placeholder message.
    pub async fn submit_with_cancel(
        &mut self,
        input: &str,
        cancel: &CancellationToken,
    ) -> Result<SubmitOutcome, ConversationError> {
        if input.trim().is_empty() && self.attachment.is_none() {
            return Ok(SubmitOutcome::Ignored);
        }

        let attachment = self.attachment.take();
        let mut user_content = Vec::with_capacity(2);
        if !input.is_empty() {
            user_content.push(ContentItem::text(input));
        }
        if let Some(att) = &attachment {
            user_content.push(ContentItem::Image {
                source: ImageSource::Inline(att.clone()),
            });
        }
        let reply = PendingReply::open(&mut self.conversation, user_content);
        let placeholder = reply.id;

        let outcome = self
            .generator
            .generate(self.mode, input, attachment.as_ref(), &self.settings, cancel)
            .await;

        match outcome {
            Ok(result) => {
                reply.resolve(Resolution::Content(result.into_content()))?;
                Ok(SubmitOutcome::Completed(placeholder))
            }
            Err(err) => {
                log_event(
                    Level::Error,
                    Some(err.code()),
                    "session",
                    &err.to_string(),
                    Some(err.explain()),
                    Some(json!({ "mode": self.mode.as_str(), "message_id": placeholder.to_string() })),
                );
                reply.resolve(Resolution::Error(err.to_string()))?;
                Ok(SubmitOutcome::Failed {
                    message_id: placeholder,
                    code: err.code(),
                })
            }
        }
    }
}

/// A placeholder awaiting its reply. Dropped unresolved, it resolves the
/// message with a cancellation error so no message stays loading.
struct PendingReply<'a> {
    conversation: &'a mut Conversation,
    id: MessageId,
    armed: bool,
}

impl<'a> PendingReply<'a> {
    fn open(conversation: &'a mut Conversation, user_content: Vec<ContentItem>) -> Self {
        let id = conversation.submit(user_content);
        Self {
            conversation,
            id,
            armed: true,
        }
    }

    fn resolve(mut self, resolution: Resolution) -> Result<(), ConversationError> {
        self.armed = false;
        let resolved = self.conversation.resolve(self.id, resolution).map(|_| ());
        resolved
    }
}

impl Drop for PendingReply<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let err = GenError::Cancelled;
        log_event(
            Level::Warn,
            Some(err.code()),
            "session",
            "Submission dropped before the reply arrived",
            Some(err.explain()),
            Some(json!({ "message_id": self.id.to_string() })),
        );
        let _ = self
            .conversation
            .resolve(self.id, Resolution::Error(err.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::conversation::Role;
    use crate::genai::gateway::tests::ScriptedGateway;
    use crate::genai::tests::test_config;
    use crate::genai::AlwaysActive;

    fn session(gw: Arc<ScriptedGateway>) -> ChatSession {
        let generator = Generator::new(test_config(), gw, Arc::new(AlwaysActive));
        ChatSession::new(Arc::new(generator))
    }

    fn text_reply(text: &str) -> crate::genai::wire::GenerateContentResponse {
        serde_json::from_value(json!({"candidates": [{"content": {"parts": [{"text": text}]}}]}))
            .unwrap()
    }

    fn photo() -> Attachment {
        Attachment::new("iVBORw0", "image/png").unwrap()
    }

    #[tokio::test]
    async fn empty_submission_is_a_no_op_in_every_mode() {
        for mode in Mode::ALL {
            let gw = Arc::new(ScriptedGateway::default());
            let mut s = session(gw.clone());
            s.set_mode(mode);
            assert_eq!(s.submit("  ").await.unwrap(), SubmitOutcome::Ignored);
            assert!(s.conversation().is_empty());
            assert!(gw.calls().is_empty());
        }
    }

    #[tokio::test]
    async fn chat_submission_appends_user_and_resolved_model_message() {
        let gw = Arc::new(ScriptedGateway::with_content(text_reply("Hi! How can I help?")));
        let mut s = session(gw);
        let outcome = s.submit("Hello").await.unwrap();
        let SubmitOutcome::Completed(id) = outcome else {
            panic!("unexpected {outcome:?}");
        };

        let msgs = s.conversation().messages();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].role, Role::User);
        assert_eq!(msgs[0].content, vec![ContentItem::text("Hello")]);
        assert_eq!(msgs[1].id, id);
        assert_eq!(msgs[1].role, Role::Model);
        assert!(!msgs[1].is_loading);
        assert_eq!(msgs[1].content, vec![ContentItem::text("Hi! How can I help?")]);
        assert!(!s.is_loading());
    }

    #[tokio::test]
    async fn image_edit_without_attachment_resolves_with_error() {
        let gw = Arc::new(ScriptedGateway::default());
        let mut s = session(gw.clone());
        s.set_mode(Mode::ImageEdit);
        let outcome = s.submit("add a hat").await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Failed { code: "GEN-1001", .. }));
        assert!(gw.calls().is_empty());

        let model = &s.conversation().messages()[1];
        assert!(!model.is_loading);
        assert_eq!(model.content, vec![ContentItem::text("Error: Please upload an image to edit.")]);
    }

    #[tokio::test]
    async fn image_edit_text_only_reply_is_plain_text() {
        let gw = Arc::new(ScriptedGateway::with_content(text_reply("I can't edit that photo.")));
        let mut s = session(gw);
        s.set_mode(Mode::ImageEdit);
        s.attach(photo());
        s.submit("make it night").await.unwrap();

        let msgs = s.conversation().messages();
        assert_eq!(
            msgs[0].content,
            vec![
                ContentItem::text("make it night"),
                ContentItem::Image { source: ImageSource::Inline(photo()) }
            ]
        );
        assert_eq!(msgs[1].content, vec![ContentItem::text("I can't edit that photo.")]);
        assert!(s.attachment().is_none());
    }

    #[tokio::test]
    async fn attachment_alone_is_a_valid_submission() {
        let gw = Arc::new(ScriptedGateway::with_content(text_reply("A cat.")));
        let mut s = session(gw.clone());
        s.attach(photo());
        s.submit("").await.unwrap();
        assert_eq!(gw.calls(), vec!["content:gemini-3-pro-preview".to_string()]);
        assert_eq!(
            s.conversation().messages()[0].content,
            vec![ContentItem::Image { source: ImageSource::Inline(photo()) }]
        );
    }

    #[tokio::test]
    async fn video_submission_resolves_with_video_item() {
        let gw = Arc::new(ScriptedGateway::with_video(1, "https://files/v?alt=media"));
        let mut s = session(gw);
        s.set_mode(Mode::VideoGen);
        s.update_settings(SettingsPatch {
            aspect_ratio: Some("4:3".into()),
            ..SettingsPatch::default()
        });
        s.submit("a cat driving").await.unwrap();
        let model = &s.conversation().messages()[1];
        assert_eq!(
            model.content,
            vec![ContentItem::Video { media_url: "https://files/v?alt=media&key=test-key".into() }]
        );
        assert!(matches!(s.mode_info().aspect_ratios.first(), Some(&"16:9")));
    }

    #[tokio::test]
    async fn transport_failures_become_error_messages() {
        let gw = Arc::new(ScriptedGateway::default());
        gw.push_content(Err(crate::errors::GenError::Provider {
            status: 500,
            message: "backend exploded".into(),
        }));
        let mut s = session(gw);
        let outcome = s.submit("hi").await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Failed { code: "NET-1002", .. }));
        let model = &s.conversation().messages()[1];
        assert!(!model.is_loading);
        assert_eq!(
            model.content[0].as_text(),
            Some("Error: provider returned 500: backend exploded")
        );
        assert!(!s.is_loading());
    }

    #[tokio::test]
    async fn each_submission_adds_exactly_two_messages() {
        let gw = Arc::new(ScriptedGateway::default());
        gw.push_content(Ok(text_reply("one")));
        gw.push_content(Ok(text_reply("two")));
        let mut s = session(gw);
        s.submit("first").await.unwrap();
        s.submit("second").await.unwrap();
        let msgs = s.conversation().messages();
        assert_eq!(msgs.len(), 4);
        assert!(msgs.iter().all(|m| !m.is_loading));
        assert_eq!(msgs[3].content[0].as_text(), Some("two"));
    }

    #[tokio::test]
    async fn dropped_submission_resolves_placeholder_as_cancelled() {
        let gw = Arc::new(ScriptedGateway::with_video(1, "https://files/v"));
        let mut config = test_config();
        config.poll.interval = Duration::from_secs(3600);
        let generator = Generator::new(config, gw.clone(), Arc::new(AlwaysActive));
        let mut s = ChatSession::new(Arc::new(generator));
        s.set_mode(Mode::VideoGen);

        let timed_out = tokio::time::timeout(Duration::from_millis(50), s.submit("a cat")).await;
        assert!(timed_out.is_err());
        assert_eq!(gw.poll_count(), 0);

        let msgs = s.conversation().messages();
        assert_eq!(msgs.len(), 2);
        assert!(!msgs[1].is_loading);
        assert_eq!(msgs[1].content, vec![ContentItem::text("Error: generation cancelled")]);
        assert_eq!(s.conversation().pending(), None);
        assert!(!s.is_loading());
    }
}
