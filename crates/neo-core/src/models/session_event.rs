use tokio::sync::mpsc;

use crate::error::ReplyError;

/// Callback from a dictation session
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DictationEvent {
    Transcript(String),
    Failed(String),
    Ended,
}

/// Asynchronous results delivered back to the host's event loop.
///
/// Background work never touches session state directly; it sends one of
/// these and the host applies it with `ChatSession::handle_event`.
#[derive(Debug)]
pub enum SessionEvent {
    Reply {
        generation: u64,
        outcome: Result<Option<String>, ReplyError>,
    },
    Dictation {
        session: u64,
        event: DictationEvent,
    },
}

pub type SessionEventSender = mpsc::UnboundedSender<SessionEvent>;
pub type SessionEventReceiver = mpsc::UnboundedReceiver<SessionEvent>;

pub fn session_channel() -> (SessionEventSender, SessionEventReceiver) {
    mpsc::unbounded_channel()
}
