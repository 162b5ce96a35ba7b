pub mod chat_session;

pub use chat_session::ChatSession;
