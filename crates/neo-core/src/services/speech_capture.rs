//! Speech-to-text capture adapters
//!
//! A capture session is single-shot: it delivers at most one transcript,
//! possibly a failure, and always finishes with `Ended`. Callbacks arrive
//! through a [`DictationSink`] as [`SessionEvent::Dictation`] values.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::DictationError;
use crate::models::session_event::{DictationEvent, SessionEvent, SessionEventSender};
use crate::settings::AppConfig;

/// Environment variable carrying the recognition language to the recognizer
pub const DICTATION_LANG_ENV: &str = "NEO_DICTATION_LANG";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CaptureHandle(pub u64);

/// Where a capture session reports its callbacks
#[derive(Clone, Debug)]
pub struct DictationSink {
    session: u64,
    tx: SessionEventSender,
}

impl DictationSink {
    pub fn new(session: u64, tx: SessionEventSender) -> Self {
        Self { session, tx }
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    pub fn transcript(&self, text: impl Into<String>) -> bool {
        self.send(DictationEvent::Transcript(text.into()))
    }

    pub fn fail(&self, reason: impl Into<String>) -> bool {
        self.send(DictationEvent::Failed(reason.into()))
    }

    pub fn end(&self) -> bool {
        self.send(DictationEvent::Ended)
    }

    fn send(&self, event: DictationEvent) -> bool {
        self.tx
            .send(SessionEvent::Dictation {
                session: self.session,
                event,
            })
            .is_ok()
    }
}

/// Host speech capture service
pub trait SpeechCapture: Send + Sync + 'static {
    fn is_supported(&self) -> bool;

    fn start(&self, sink: DictationSink) -> Result<CaptureHandle, DictationError>;

    fn stop(&self, handle: CaptureHandle);
}

/// Static facts about the host, detected once and then read from here
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlatformCapabilities {
    pub speech_to_text: bool,
}

impl PlatformCapabilities {
    pub fn detect(speech: &dyn SpeechCapture) -> Self {
        let capabilities = Self {
            speech_to_text: speech.is_supported(),
        };
        info!(
            speech_to_text = capabilities.speech_to_text,
            "Detected platform capabilities"
        );
        capabilities
    }
}

/// Capture adapter for hosts without speech recognition
pub struct UnsupportedSpeechCapture;

impl SpeechCapture for UnsupportedSpeechCapture {
    fn is_supported(&self) -> bool {
        false
    }

    fn start(&self, _sink: DictationSink) -> Result<CaptureHandle, DictationError> {
        Err(DictationError::Unsupported)
    }

    fn stop(&self, _handle: CaptureHandle) {}
}

/// Runs an external recognizer and uses its stdout as the transcript.
///
/// The child is spawned with `kill_on_drop`, so aborting the session task
/// also terminates the process.
pub struct CommandSpeechCapture {
    program: String,
    args: Vec<String>,
    language: String,
    sessions: Mutex<HashMap<CaptureHandle, JoinHandle<()>>>,
}

impl CommandSpeechCapture {
    pub fn new(program: impl Into<String>, args: Vec<String>, language: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args,
            language: language.into(),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Build from an argv list, e.g. `["whisper-cli", "--once"]`
    pub fn from_argv(argv: &[String], language: impl Into<String>) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone(), args.to_vec(), language))
    }

    pub fn active_sessions(&self) -> usize {
        let mut sessions = self.sessions.lock();
        sessions.retain(|_, task| !task.is_finished());
        sessions.len()
    }
}

impl SpeechCapture for CommandSpeechCapture {
    fn is_supported(&self) -> bool {
        resolve_program(&self.program).is_some()
    }

    fn start(&self, sink: DictationSink) -> Result<CaptureHandle, DictationError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| DictationError::StartFailed(e.to_string()))?;

        let mut command = tokio::process::Command::new(&self.program);
        command
            .args(&self.args)
            .env(DICTATION_LANG_ENV, &self.language)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let handle = CaptureHandle(sink.session());
        debug!(session = handle.0, program = %self.program, "Starting dictation command");

        let task = runtime.spawn(async move {
            match command.output().await {
                Ok(output) if output.status.success() => {
                    let transcript = String::from_utf8_lossy(&output.stdout).trim().to_string();
                    if transcript.is_empty() {
                        debug!(session = sink.session(), "Recognizer produced no transcript");
                    } else {
                        sink.transcript(transcript);
                    }
                }
                Ok(output) => {
                    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                    warn!(status = %output.status, stderr = %stderr, "Dictation command failed");
                    sink.fail(format!("recognizer exited with {}", output.status));
                }
                Err(e) => {
                    warn!(error = ?e, "Failed to run dictation command");
                    sink.fail(e.to_string());
                }
            }
            sink.end();
        });

        let mut sessions = self.sessions.lock();
        sessions.retain(|_, task| !task.is_finished());
        sessions.insert(handle, task);

        Ok(handle)
    }

    fn stop(&self, handle: CaptureHandle) {
        if let Some(task) = self.sessions.lock().remove(&handle) {
            debug!(session = handle.0, "Stopping dictation command");
            task.abort();
        }
    }
}

/// Locate `program` either as a path or on `PATH`
fn resolve_program(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .flat_map(|dir| {
            let plain = dir.join(program);
            let exe = dir.join(format!("{}.exe", program));
            [plain, exe]
        })
        .find(|path| path.is_file())
}

/// Pick the capture adapter the configuration asks for
pub fn speech_capture_for(config: &AppConfig) -> Arc<dyn SpeechCapture> {
    match config
        .dictation_command
        .as_deref()
        .and_then(|argv| CommandSpeechCapture::from_argv(argv, config.dictation_language.clone()))
    {
        Some(capture) => Arc::new(capture),
        None => Arc::new(UnsupportedSpeechCapture),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::session_event::session_channel;

    #[test]
    fn test_unsupported_capture() {
        let capture = UnsupportedSpeechCapture;
        let (tx, _rx) = session_channel();
        assert!(!capture.is_supported());
        assert_eq!(
            capture.start(DictationSink::new(1, tx)),
            Err(DictationError::Unsupported)
        );
        assert!(!PlatformCapabilities::detect(&capture).speech_to_text);
    }

    #[test]
    fn test_missing_program_is_unsupported() {
        let capture = CommandSpeechCapture::new(
            "neo-definitely-not-a-recognizer",
            Vec::new(),
            "en-US",
        );
        assert!(!capture.is_supported());
    }

    #[test]
    fn test_from_argv_requires_program() {
        assert!(CommandSpeechCapture::from_argv(&[], "en-US").is_none());
        let argv = vec!["rec".to_string(), "--once".to_string()];
        let capture = CommandSpeechCapture::from_argv(&argv, "en-US").unwrap();
        assert_eq!(capture.program, "rec");
        assert_eq!(capture.args, vec!["--once".to_string()]);
    }

    #[test]
    fn test_speech_capture_for_without_command() {
        let config = AppConfig::default();
        assert!(!speech_capture_for(&config).is_supported());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_transcript_then_end() {
        let capture = CommandSpeechCapture::new(
            "sh",
            vec!["-c".to_string(), "echo \"hello $NEO_DICTATION_LANG\"".to_string()],
            "en-US",
        );
        assert!(capture.is_supported());

        let (tx, mut rx) = session_channel();
        let handle = capture.start(DictationSink::new(7, tx)).unwrap();
        assert_eq!(handle, CaptureHandle(7));

        let first = rx.recv().await.unwrap();
        assert!(matches!(
            first,
            SessionEvent::Dictation {
                session: 7,
                event: DictationEvent::Transcript(ref t),
            } if t == "hello en-US"
        ));
        let second = rx.recv().await.unwrap();
        assert!(matches!(
            second,
            SessionEvent::Dictation {
                session: 7,
                event: DictationEvent::Ended
            }
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_failure_reports_failed() {
        let capture = CommandSpeechCapture::new(
            "sh",
            vec!["-c".to_string(), "exit 3".to_string()],
            "en-US",
        );

        let (tx, mut rx) = session_channel();
        capture.start(DictationSink::new(2, tx)).unwrap();

        let first = rx.recv().await.unwrap();
        assert!(matches!(
            first,
            SessionEvent::Dictation {
                event: DictationEvent::Failed(_),
                ..
            }
        ));
        let second = rx.recv().await.unwrap();
        assert!(matches!(
            second,
            SessionEvent::Dictation {
                event: DictationEvent::Ended,
                ..
            }
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stop_aborts_session() {
        let capture = CommandSpeechCapture::new(
            "sh",
            vec!["-c".to_string(), "sleep 30".to_string()],
            "en-US",
        );

        let (tx, mut rx) = session_channel();
        let handle = capture.start(DictationSink::new(3, tx)).unwrap();
        capture.stop(handle);
        // Idempotent
        capture.stop(handle);

        tokio::task::yield_now().await;
        assert_eq!(capture.active_sessions(), 0);
        // The aborted task dropped its sender without reporting anything
        assert!(rx.recv().await.is_none());
    }
}
