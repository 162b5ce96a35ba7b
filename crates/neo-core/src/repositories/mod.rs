pub mod error;
pub mod in_memory_settings_repository;
pub mod settings_json_repository;
pub mod settings_repository;

pub use error::{RepositoryError, RepositoryResult};
pub use in_memory_settings_repository::InMemorySettingsRepository;
pub use settings_json_repository::SettingsJsonRepository;
pub use settings_repository::{SettingsEntries, SettingsRepository};
