use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::error::{DictationError, ReplyError, ValidationError};
use crate::models::attachment::StagedAttachment;
use crate::models::composer::{Composer, DictationUpdate};
use crate::models::conversation_log::ConversationLog;
use crate::models::message::Message;
use crate::models::notifications::NotificationStore;
use crate::models::session_event::{
    SessionEvent, SessionEventReceiver, SessionEventSender, session_channel,
};
use crate::services::reply_manager::{ReplyManager, ReplyStatus};
use crate::services::reply_producer::ReplyProducer;
use crate::services::speech_capture::{PlatformCapabilities, SpeechCapture};

pub const DICTATION_START_FAILED: &str = "Failed to start voice recording. Please try again.";
pub const DICTATION_FAILED: &str = "Voice recording failed. Please try again.";
pub const REPLY_FAILED: &str = "Failed to send message. Please try again.";

/// One chat surface: the composer, the log it feeds, and the reply in flight.
///
/// Asynchronous work reports back over the channel returned by
/// [`ChatSession::new`]; the host forwards every received event to
/// [`ChatSession::handle_event`].
pub struct ChatSession {
    composer: Composer,
    log: ConversationLog,
    replies: ReplyManager,
    producer: Arc<dyn ReplyProducer>,
    notifications: NotificationStore,
    events: SessionEventSender,
}

impl ChatSession {
    pub fn new(
        producer: Arc<dyn ReplyProducer>,
        speech: Arc<dyn SpeechCapture>,
        notifications: NotificationStore,
    ) -> (Self, SessionEventReceiver) {
        let (events, receiver) = session_channel();
        let capabilities = PlatformCapabilities::detect(speech.as_ref());
        let composer = Composer::new(speech, capabilities, events.clone());

        let session = Self {
            composer,
            log: ConversationLog::new(),
            replies: ReplyManager::new(),
            producer,
            notifications,
            events,
        };
        (session, receiver)
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    pub fn notifications(&self) -> &NotificationStore {
        &self.notifications
    }

    pub fn is_pending(&self) -> bool {
        self.log.is_pending()
    }

    pub fn can_submit(&self) -> bool {
        self.composer.can_submit(self.log.is_pending())
    }

    pub fn active_reply_generation(&self) -> Option<u64> {
        self.replies.active_generation()
    }

    pub fn update_draft_text(&mut self, text: impl Into<String>) {
        self.composer.update_draft_text(text);
    }

    pub fn stage_attachment(&mut self, attachment: StagedAttachment) {
        self.composer.stage_attachment(attachment);
    }

    pub fn clear_attachment(&mut self) {
        self.composer.clear_attachment();
    }

    pub fn start_dictation(&mut self) -> Result<(), DictationError> {
        self.composer.start_dictation().map(|_| ()).inspect_err(|_| {
            self.notifications.transient_error(DICTATION_START_FAILED);
        })
    }

    pub fn stop_dictation(&mut self) {
        self.composer.stop_dictation();
    }

    /// Mic button: stop when recording, otherwise start
    pub fn toggle_dictation(&mut self) -> Result<(), DictationError> {
        if self.composer.is_recording() {
            self.composer.stop_dictation();
            Ok(())
        } else {
            self.start_dictation()
        }
    }

    /// Send the draft and schedule the reply.
    ///
    /// Rejections raise a blocking notification and leave everything as it was.
    pub fn submit(&mut self) -> Result<Message, ValidationError> {
        let message = match self.composer.build_submission(self.log.is_pending()) {
            Ok(message) => message,
            Err(e) => {
                debug!(error = %e, "Submission rejected");
                self.notifications.blocking_error(e.to_string());
                return Err(e);
            }
        };

        self.log.append(message.clone());
        self.log.set_pending(true);
        self.spawn_reply(message.clone());

        info!(message_id = message.id(), "Message submitted");
        Ok(message)
    }

    fn spawn_reply(&mut self, latest: Message) {
        let generation = self.replies.next_generation();
        let history = self.log.messages().to_vec();
        let producer = self.producer.clone();
        let events = self.events.clone();

        let task = tokio::spawn(async move {
            let outcome = producer.produce(latest, history).await;
            if events
                .send(SessionEvent::Reply {
                    generation,
                    outcome,
                })
                .is_err()
            {
                debug!(generation, "Session gone before reply finished");
            }
        });

        self.replies.register(generation, task);
    }

    /// Apply an event received from the session channel
    pub fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Reply {
                generation,
                outcome,
            } => self.apply_reply(generation, outcome),
            SessionEvent::Dictation { session, event } => {
                match self.composer.handle_dictation(session, event) {
                    DictationUpdate::Failed(e) => {
                        warn!(error = %e, "Dictation failed");
                        self.notifications.transient_error(DICTATION_FAILED);
                    }
                    DictationUpdate::Ignored
                    | DictationUpdate::Transcribed
                    | DictationUpdate::Ended => {}
                }
            }
        }
    }

    fn apply_reply(&mut self, generation: u64, outcome: Result<Option<String>, ReplyError>) {
        let status = match &outcome {
            Ok(_) => ReplyStatus::Completed,
            Err(e) => ReplyStatus::Failed(e.to_string()),
        };
        if !self.replies.finish(generation, status) {
            return;
        }

        self.log.set_pending(false);
        match outcome {
            Ok(Some(text)) => self.log.append(Message::assistant(text)),
            Ok(None) => {}
            Err(e) => {
                error!(error = ?e, generation, "Reply failed");
                self.notifications.transient_error(REPLY_FAILED);
            }
        }
    }

    /// Start over: cancel the reply in flight, empty the log and the draft
    pub fn new_chat(&mut self) {
        if self.replies.cancel() {
            debug!("Cancelled in-flight reply for new chat");
        }
        self.composer.reset();
        self.log.reset();
        info!("New chat started");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::conversation_log::RenderEntry;
    use crate::models::message::Role;
    use crate::models::notifications::NotificationKind;
    use crate::models::session_event::DictationEvent;
    use crate::services::reply_producer::StubReplyProducer;
    use crate::test_support::{ScriptedReplyProducer, ScriptedSpeechCapture};
    use std::time::Duration;

    fn notifications() -> NotificationStore {
        NotificationStore::new(Duration::from_secs(4), 50)
    }

    fn stub_session() -> (ChatSession, SessionEventReceiver) {
        ChatSession::new(
            Arc::new(StubReplyProducer::new(Duration::from_millis(1500))),
            ScriptedSpeechCapture::unsupported(),
            notifications(),
        )
    }

    fn contents(session: &ChatSession) -> Vec<&str> {
        session.log().messages().iter().map(|m| m.content()).collect()
    }

    async fn settle(session: &mut ChatSession, rx: &mut SessionEventReceiver) {
        let event = rx.recv().await.expect("session event");
        session.handle_event(event);
    }

    #[tokio::test(start_paused = true)]
    async fn test_whitespace_submission_rejected() {
        let (mut session, _rx) = stub_session();
        session.update_draft_text("  ");

        assert_eq!(session.submit(), Err(ValidationError::EmptyDraft));
        assert!(session.log().is_empty());
        assert!(!session.is_pending());

        let latest = session.notifications().latest().unwrap();
        assert_eq!(latest.message, "Please enter a message");
        assert_eq!(latest.kind, NotificationKind::Blocking);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hello_submission() {
        let (mut session, _rx) = stub_session();
        session.update_draft_text("Hello");

        let message = session.submit().unwrap();
        assert_eq!(message.role(), Role::User);
        assert_eq!(contents(&session), vec!["Hello"]);
        assert_eq!(session.composer().text(), "");
        assert!(session.is_pending());
        assert_eq!(session.log().render_entries().last(), Some(&RenderEntry::Typing));
    }

    #[tokio::test(start_paused = true)]
    async fn test_attachment_only_submission() {
        let (mut session, _rx) = stub_session();
        session.stage_attachment(StagedAttachment::new("report.pdf", 2048));

        session.submit().unwrap();
        assert_eq!(session.log().len(), 1);
        assert!(contents(&session)[0].contains("report.pdf"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_submission_waits_for_reply() {
        let (mut session, mut rx) = stub_session();
        session.update_draft_text("Hi");
        session.submit().unwrap();

        session.update_draft_text("There");
        assert_eq!(session.submit(), Err(ValidationError::ReplyPending));
        assert_eq!(session.log().len(), 1);
        assert_eq!(session.composer().text(), "There");

        // Stub reply clears pending without adding a message
        settle(&mut session, &mut rx).await;
        assert!(!session.is_pending());
        assert_eq!(session.log().len(), 1);

        session.submit().unwrap();
        assert_eq!(contents(&session), vec!["Hi", "There"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stub_reply_takes_configured_delay() {
        let (mut session, mut rx) = stub_session();
        session.update_draft_text("Hi");
        session.submit().unwrap();

        let early = tokio::time::timeout(Duration::from_millis(1400), rx.recv()).await;
        assert!(early.is_err());
        assert!(session.is_pending());

        settle(&mut session, &mut rx).await;
        assert!(!session.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_assistant_reply_is_appended() {
        let producer =
            ScriptedReplyProducer::new(Duration::from_millis(10), Ok(Some("Hello!".into())));
        let (mut session, mut rx) = ChatSession::new(
            producer.clone(),
            ScriptedSpeechCapture::unsupported(),
            notifications(),
        );
        session.update_draft_text("Hi");
        session.submit().unwrap();
        settle(&mut session, &mut rx).await;

        let messages = session.log().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].role(), Role::Assistant);
        assert_eq!(messages[1].content(), "Hello!");
        // Producer sees the latest message and the whole log including it
        assert_eq!(producer.seen(), vec![("Hi".to_string(), 1)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_failure_clears_pending_and_notifies() {
        let producer = ScriptedReplyProducer::new(
            Duration::from_millis(10),
            Err(ReplyError::Failed("offline".into())),
        );
        let (mut session, mut rx) =
            ChatSession::new(producer, ScriptedSpeechCapture::unsupported(), notifications());
        session.update_draft_text("Hi");
        session.submit().unwrap();
        settle(&mut session, &mut rx).await;

        assert!(!session.is_pending());
        assert_eq!(session.log().len(), 1);
        let latest = session.notifications().latest().unwrap();
        assert_eq!(latest.message, REPLY_FAILED);
        assert_eq!(latest.kind, NotificationKind::Transient);

        // User may resubmit
        session.update_draft_text("Again");
        assert!(session.submit().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_chat_discards_late_reply() {
        let producer =
            ScriptedReplyProducer::new(Duration::from_millis(500), Ok(Some("late".into())));
        let (mut session, mut rx) =
            ChatSession::new(producer, ScriptedSpeechCapture::unsupported(), notifications());
        session.update_draft_text("Hi");
        session.submit().unwrap();
        let generation = session.active_reply_generation().unwrap();

        session.new_chat();
        assert!(session.log().is_empty());
        assert!(!session.is_pending());

        // The aborted task never reports
        let waited = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await;
        assert!(waited.is_err());

        // Even an outcome that slipped through is dropped
        session.handle_event(SessionEvent::Reply {
            generation,
            outcome: Ok(Some("late".into())),
        });
        assert!(session.log().is_empty());
        assert!(!session.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_chat_resets_draft_and_dictation() {
        let speech = ScriptedSpeechCapture::supported();
        let (mut session, _rx) = ChatSession::new(
            Arc::new(StubReplyProducer::new(Duration::from_millis(1500))),
            speech.clone(),
            notifications(),
        );
        session.update_draft_text("half typed");
        session.stage_attachment(StagedAttachment::new("a.txt", 1));
        session.start_dictation().unwrap();

        session.new_chat();
        assert_eq!(session.composer().text(), "");
        assert!(session.composer().attachment().is_none());
        assert!(!session.composer().is_recording());
        assert_eq!(speech.stopped().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dictation_transcript_through_channel() {
        let speech = ScriptedSpeechCapture::supported();
        let (mut session, mut rx) = ChatSession::new(
            Arc::new(StubReplyProducer::new(Duration::from_millis(1500))),
            speech.clone(),
            notifications(),
        );
        session.update_draft_text("Hello");
        session.toggle_dictation().unwrap();
        assert!(session.composer().is_recording());

        let sink = speech.last_sink().unwrap();
        sink.transcript("world");
        sink.end();
        settle(&mut session, &mut rx).await;
        settle(&mut session, &mut rx).await;

        assert_eq!(session.composer().text(), "Hello world");
        assert!(!session.composer().is_recording());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dictation_failure_raises_transient() {
        let speech = ScriptedSpeechCapture::supported();
        let (mut session, mut rx) = ChatSession::new(
            Arc::new(StubReplyProducer::new(Duration::from_millis(1500))),
            speech.clone(),
            notifications(),
        );
        session.start_dictation().unwrap();
        speech.last_sink().unwrap().fail("not-allowed");
        settle(&mut session, &mut rx).await;

        assert!(!session.composer().is_recording());
        let latest = session.notifications().latest().unwrap();
        assert_eq!(latest.message, DICTATION_FAILED);
        assert_eq!(latest.kind, NotificationKind::Transient);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dictation_start_failure_notifies() {
        let (mut session, _rx) = ChatSession::new(
            Arc::new(StubReplyProducer::new(Duration::from_millis(1500))),
            ScriptedSpeechCapture::failing_start(),
            notifications(),
        );
        assert!(session.start_dictation().is_err());
        assert_eq!(
            session.notifications().latest().map(|n| n.message),
            Some(DICTATION_START_FAILED.to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_dictation_session_ignored() {
        let speech = ScriptedSpeechCapture::supported();
        let (mut session, _rx) = ChatSession::new(
            Arc::new(StubReplyProducer::new(Duration::from_millis(1500))),
            speech,
            notifications(),
        );
        session.handle_event(SessionEvent::Dictation {
            session: 42,
            event: DictationEvent::Transcript("ghost".into()),
        });
        assert_eq!(session.composer().text(), "");
    }
}
