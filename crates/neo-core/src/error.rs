use thiserror::Error;

/// Rejected submission. The draft is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a message")]
    EmptyDraft,

    #[error("Please wait for the current reply")]
    ReplyPending,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DictationError {
    #[error("Speech capture is not supported on this platform")]
    Unsupported,

    #[error("Failed to start speech capture: {0}")]
    StartFailed(String),

    #[error("Speech capture failed: {0}")]
    CaptureFailed(String),
}

/// Failure reported by a reply producer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplyError {
    #[error("Reply producer failed: {0}")]
    Failed(String),

    #[error("Reply task ended unexpectedly")]
    Aborted,
}
