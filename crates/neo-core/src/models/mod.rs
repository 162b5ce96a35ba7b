pub mod attachment;
pub mod composer;
pub mod conversation_log;
pub mod error_store;
pub mod library;
pub mod message;
pub mod notifications;
pub mod overlay;
pub mod session_event;

pub use attachment::StagedAttachment;
pub use composer::{Composer, DictationUpdate, Draft};
pub use conversation_log::{Alignment, ConversationLog, RenderEntry};
pub use error_store::{ErrorEntry, ErrorLevel, ErrorStore};
pub use library::{ChatHistoryEntry, Memory, MemoryKind};
pub use message::{Message, Role};
pub use notifications::{Notification, NotificationKind, NotificationLevel, NotificationStore};
pub use overlay::DismissibleOverlay;
pub use session_event::{DictationEvent, SessionEvent, SessionEventReceiver, SessionEventSender};
