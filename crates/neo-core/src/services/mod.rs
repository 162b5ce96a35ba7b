pub mod error_collector_layer;
pub mod reply_manager;
pub mod reply_producer;
pub mod search_filter;
pub mod speech_capture;

pub use error_collector_layer::ErrorCollectorLayer;
pub use reply_manager::{ReplyManager, ReplyStatus};
pub use reply_producer::{EchoReplyProducer, ReplyProducer, StubReplyProducer, reply_producer_for};
pub use search_filter::{Searchable, count_label, filter_entries};
pub use speech_capture::{
    CommandSpeechCapture, PlatformCapabilities, SpeechCapture, UnsupportedSpeechCapture,
    speech_capture_for,
};
