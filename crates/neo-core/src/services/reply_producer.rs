use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::ReplyError;
use crate::models::message::Message;
use crate::settings::{AppConfig, ReplyMode};

/// Produces the assistant's reply to the latest submission.
///
/// `Ok(Some(text))` appends an assistant message, `Ok(None)` only ends the
/// pending state.
#[async_trait]
pub trait ReplyProducer: Send + Sync + 'static {
    async fn produce(
        &self,
        latest: Message,
        history: Vec<Message>,
    ) -> Result<Option<String>, ReplyError>;
}

/// Waits, then replies with nothing
pub struct StubReplyProducer {
    delay: Duration,
}

impl StubReplyProducer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl ReplyProducer for StubReplyProducer {
    async fn produce(
        &self,
        latest: Message,
        history: Vec<Message>,
    ) -> Result<Option<String>, ReplyError> {
        debug!(message_id = latest.id(), history = history.len(), "Stub reply started");
        tokio::time::sleep(self.delay).await;
        Ok(None)
    }
}

/// Waits, then repeats the submission back
pub struct EchoReplyProducer {
    delay: Duration,
}

impl EchoReplyProducer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl ReplyProducer for EchoReplyProducer {
    async fn produce(
        &self,
        latest: Message,
        _history: Vec<Message>,
    ) -> Result<Option<String>, ReplyError> {
        tokio::time::sleep(self.delay).await;
        Ok(Some(format!("You said: {}", latest.content())))
    }
}

pub fn reply_producer_for(config: &AppConfig) -> Arc<dyn ReplyProducer> {
    let delay = config.reply_delay();
    match config.reply_mode {
        ReplyMode::Stub => Arc::new(StubReplyProducer::new(delay)),
        ReplyMode::Echo => Arc::new(EchoReplyProducer::new(delay)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_stub_waits_then_returns_nothing() {
        let producer = StubReplyProducer::new(Duration::from_millis(1500));
        let started = Instant::now();

        let reply = producer.produce(Message::user("Hi"), Vec::new()).await;

        assert_eq!(reply, Ok(None));
        assert!(started.elapsed() >= Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_echo_repeats_content() {
        let producer = EchoReplyProducer::new(Duration::from_millis(10));
        let reply = producer
            .produce(Message::user("Hi"), vec![Message::user("Hi")])
            .await;
        assert_eq!(reply, Ok(Some("You said: Hi".to_string())));
    }

    #[tokio::test(start_paused = true)]
    async fn test_factory_follows_reply_mode() {
        let config = AppConfig {
            reply_mode: ReplyMode::Echo,
            reply_delay_ms: 0,
            ..AppConfig::default()
        };
        let reply = reply_producer_for(&config)
            .produce(Message::user("ping"), Vec::new())
            .await;
        assert_eq!(reply, Ok(Some("You said: ping".to_string())));
    }
}
