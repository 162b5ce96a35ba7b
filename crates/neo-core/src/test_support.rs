//! Test doubles shared by the unit test modules

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{DictationError, ReplyError};
use crate::models::message::Message;
use crate::services::reply_producer::ReplyProducer;
use crate::services::speech_capture::{CaptureHandle, DictationSink, SpeechCapture};

/// Speech capture whose callbacks are driven by the test
#[derive(Default)]
pub struct ScriptedSpeechCapture {
    pub supported: bool,
    pub fail_start: bool,
    sinks: Mutex<Vec<DictationSink>>,
    stopped: Mutex<Vec<CaptureHandle>>,
}

impl ScriptedSpeechCapture {
    pub fn supported() -> Arc<Self> {
        Arc::new(Self {
            supported: true,
            ..Self::default()
        })
    }

    pub fn unsupported() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_start() -> Arc<Self> {
        Arc::new(Self {
            supported: true,
            fail_start: true,
            ..Self::default()
        })
    }

    pub fn start_count(&self) -> usize {
        self.sinks.lock().len()
    }

    /// Sink handed to the most recent `start`
    pub fn last_sink(&self) -> Option<DictationSink> {
        self.sinks.lock().last().cloned()
    }

    pub fn stopped(&self) -> Vec<CaptureHandle> {
        self.stopped.lock().clone()
    }
}

impl SpeechCapture for ScriptedSpeechCapture {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn start(&self, sink: DictationSink) -> Result<CaptureHandle, DictationError> {
        if self.fail_start {
            return Err(DictationError::StartFailed("microphone busy".into()));
        }
        let handle = CaptureHandle(sink.session());
        self.sinks.lock().push(sink);
        Ok(handle)
    }

    fn stop(&self, handle: CaptureHandle) {
        self.stopped.lock().push(handle);
    }
}

/// Reply producer that waits and then returns a fixed outcome
pub struct ScriptedReplyProducer {
    pub delay: Duration,
    pub outcome: Result<Option<String>, ReplyError>,
    seen: Mutex<Vec<(String, usize)>>,
}

impl ScriptedReplyProducer {
    pub fn new(delay: Duration, outcome: Result<Option<String>, ReplyError>) -> Arc<Self> {
        Arc::new(Self {
            delay,
            outcome,
            seen: Mutex::new(Vec::new()),
        })
    }

    /// `(latest content, history length)` per call
    pub fn seen(&self) -> Vec<(String, usize)> {
        self.seen.lock().clone()
    }
}

#[async_trait]
impl ReplyProducer for ScriptedReplyProducer {
    async fn produce(
        &self,
        latest: Message,
        history: Vec<Message>,
    ) -> Result<Option<String>, ReplyError> {
        self.seen
            .lock()
            .push((latest.content().to_string(), history.len()));
        tokio::time::sleep(self.delay).await;
        self.outcome.clone()
    }
}
