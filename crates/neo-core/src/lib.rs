//! Chat session core for Ask Neo: composer, conversation log, reply
//! dispatch, dictation, notifications and persisted session settings.
//! Frontends drive it through [`ChatSession`] and render from its state.

pub mod controllers;
pub mod error;
pub mod models;
pub mod repositories;
pub mod services;
pub mod settings;

#[cfg(test)]
mod test_support;

pub use controllers::ChatSession;
pub use error::{DictationError, ReplyError, ValidationError};
