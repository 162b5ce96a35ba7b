pub mod app_config;
pub mod session_store;

pub use app_config::{AppConfig, ConfigError, ReplyMode};
pub use session_store::{SessionSettings, SessionStore, Theme};
