use std::collections::BTreeMap;

pub use futures::future::BoxFuture;

use super::error::RepositoryResult;

/// Persisted key/value pairs
pub type SettingsEntries = BTreeMap<String, String>;

pub trait SettingsRepository: Send + Sync + 'static {
    /// Load every stored entry. A missing store loads as empty.
    fn load(&self) -> BoxFuture<'static, RepositoryResult<SettingsEntries>>;

    /// Replace the stored entries
    fn save(&self, entries: SettingsEntries) -> BoxFuture<'static, RepositoryResult<()>>;
}
