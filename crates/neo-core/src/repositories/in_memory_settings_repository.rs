use parking_lot::Mutex;
use std::sync::Arc;

use super::error::RepositoryResult;
use super::settings_repository::{BoxFuture, SettingsEntries, SettingsRepository};

/// In-memory settings store for tests and `--ephemeral` runs
#[derive(Clone, Default)]
pub struct InMemorySettingsRepository {
    entries: Arc<Mutex<SettingsEntries>>,
    saves: Arc<Mutex<usize>>,
}

impl InMemorySettingsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: SettingsEntries) -> Self {
        Self {
            entries: Arc::new(Mutex::new(entries)),
            saves: Arc::default(),
        }
    }

    pub fn snapshot(&self) -> SettingsEntries {
        self.entries.lock().clone()
    }

    /// Number of completed saves
    pub fn save_count(&self) -> usize {
        *self.saves.lock()
    }
}

impl SettingsRepository for InMemorySettingsRepository {
    fn load(&self) -> BoxFuture<'static, RepositoryResult<SettingsEntries>> {
        let entries = self.entries.clone();
        Box::pin(async move {
            let snapshot = entries.lock().clone();
            RepositoryResult::Ok(snapshot)
        })
    }

    fn save(&self, new_entries: SettingsEntries) -> BoxFuture<'static, RepositoryResult<()>> {
        let entries = self.entries.clone();
        let saves = self.saves.clone();
        Box::pin(async move {
            *entries.lock() = new_entries;
            *saves.lock() += 1;
            RepositoryResult::Ok(())
        })
    }
}
