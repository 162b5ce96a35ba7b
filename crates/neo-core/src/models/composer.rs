//! Draft composition: text, one staged attachment, and dictation into the
//! text field.

use std::sync::Arc;

use tracing::{debug, warn};

use super::attachment::StagedAttachment;
use super::message::Message;
use super::session_event::{DictationEvent, SessionEventSender};
use crate::error::{DictationError, ValidationError};
use crate::services::speech_capture::{
    CaptureHandle, DictationSink, PlatformCapabilities, SpeechCapture,
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Draft {
    pub text: String,
    pub attachment: Option<StagedAttachment>,
    pub recording: bool,
}

/// Result of applying a dictation callback
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DictationUpdate {
    /// Callback came from a session that is no longer active
    Ignored,
    Transcribed,
    Failed(DictationError),
    Ended,
}

struct ActiveCapture {
    session: u64,
    handle: CaptureHandle,
}

pub struct Composer {
    draft: Draft,
    speech: Arc<dyn SpeechCapture>,
    capabilities: PlatformCapabilities,
    active_capture: Option<ActiveCapture>,
    next_session: u64,
    events: SessionEventSender,
}

impl Composer {
    pub fn new(
        speech: Arc<dyn SpeechCapture>,
        capabilities: PlatformCapabilities,
        events: SessionEventSender,
    ) -> Self {
        Self {
            draft: Draft::default(),
            speech,
            capabilities,
            active_capture: None,
            next_session: 1,
            events,
        }
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn text(&self) -> &str {
        &self.draft.text
    }

    pub fn attachment(&self) -> Option<&StagedAttachment> {
        self.draft.attachment.as_ref()
    }

    pub fn is_recording(&self) -> bool {
        self.draft.recording
    }

    pub fn supports_dictation(&self) -> bool {
        self.capabilities.speech_to_text
    }

    pub fn update_draft_text(&mut self, text: impl Into<String>) {
        self.draft.text = text.into();
    }

    /// Stage `attachment`, returning the one it replaced
    pub fn stage_attachment(&mut self, attachment: StagedAttachment) -> Option<StagedAttachment> {
        debug!(name = %attachment.name, size_bytes = attachment.size_bytes, "Attachment staged");
        self.draft.attachment.replace(attachment)
    }

    pub fn clear_attachment(&mut self) -> Option<StagedAttachment> {
        self.draft.attachment.take()
    }

    /// Begin a dictation session.
    ///
    /// Returns `Ok(false)` without doing anything when speech capture is
    /// unsupported or a session is already running.
    pub fn start_dictation(&mut self) -> Result<bool, DictationError> {
        if !self.capabilities.speech_to_text || self.active_capture.is_some() {
            return Ok(false);
        }

        let session = self.next_session;
        self.next_session += 1;

        let sink = DictationSink::new(session, self.events.clone());
        match self.speech.start(sink) {
            Ok(handle) => {
                debug!(session, "Dictation started");
                self.active_capture = Some(ActiveCapture { session, handle });
                self.draft.recording = true;
                Ok(true)
            }
            Err(e) => {
                warn!(error = ?e, "Failed to start dictation");
                self.draft.recording = false;
                Err(e)
            }
        }
    }

    /// Cancel the running session, if any
    pub fn stop_dictation(&mut self) {
        if let Some(active) = self.active_capture.take() {
            debug!(session = active.session, "Dictation stopped");
            self.speech.stop(active.handle);
        }
        self.draft.recording = false;
    }

    pub fn toggle_dictation(&mut self) -> Result<bool, DictationError> {
        if self.active_capture.is_some() {
            self.stop_dictation();
            Ok(false)
        } else {
            self.start_dictation()
        }
    }

    pub fn active_session(&self) -> Option<u64> {
        self.active_capture.as_ref().map(|active| active.session)
    }

    pub fn handle_dictation(&mut self, session: u64, event: DictationEvent) -> DictationUpdate {
        let Some(active) = self.active_capture.as_ref() else {
            debug!(session, "Dictation event with no active session");
            return DictationUpdate::Ignored;
        };
        if active.session != session {
            debug!(session, active = active.session, "Ignoring stale dictation event");
            return DictationUpdate::Ignored;
        }

        match event {
            DictationEvent::Transcript(transcript) => {
                if !self.draft.text.is_empty() {
                    self.draft.text.push(' ');
                }
                self.draft.text.push_str(&transcript);
                DictationUpdate::Transcribed
            }
            DictationEvent::Failed(reason) => {
                warn!(session, reason = %reason, "Dictation failed");
                self.stop_dictation();
                DictationUpdate::Failed(DictationError::CaptureFailed(reason))
            }
            DictationEvent::Ended => {
                self.active_capture = None;
                self.draft.recording = false;
                DictationUpdate::Ended
            }
        }
    }

    /// Whether the send control should be enabled
    pub fn can_submit(&self, pending: bool) -> bool {
        !pending && (!self.draft.text.trim().is_empty() || self.draft.attachment.is_some())
    }

    /// Turn the draft into an outbound user message and clear it.
    ///
    /// On rejection the draft is left as it was.
    pub fn build_submission(&mut self, pending: bool) -> Result<Message, ValidationError> {
        if pending {
            return Err(ValidationError::ReplyPending);
        }

        let trimmed = self.draft.text.trim();
        let content = match (&self.draft.attachment, trimmed.is_empty()) {
            (None, true) => return Err(ValidationError::EmptyDraft),
            (None, false) => trimmed.to_string(),
            (Some(attachment), true) => attachment.marker(),
            (Some(attachment), false) => format!("{}\n\n{}", trimmed, attachment.marker()),
        };

        self.draft.text.clear();
        self.draft.attachment = None;
        Ok(Message::user(content))
    }

    /// Back to an empty draft with no dictation running
    pub fn reset(&mut self) {
        self.stop_dictation();
        self.draft = Draft::default();
    }
}

impl Drop for Composer {
    fn drop(&mut self) {
        if let Some(active) = self.active_capture.take() {
            self.speech.stop(active.handle);
        }
    }
}
