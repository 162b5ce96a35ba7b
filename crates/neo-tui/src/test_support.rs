//! Fixtures shared by the shell's unit tests

use std::sync::Arc;
use std::time::Duration;

use neo_core::ChatSession;
use neo_core::models::error_store::ErrorStore;
use neo_core::models::notifications::NotificationStore;
use neo_core::repositories::settings_repository::BoxFuture;
use neo_core::repositories::{
    InMemorySettingsRepository, RepositoryError, RepositoryResult, SettingsEntries,
    SettingsRepository,
};
use neo_core::services::reply_producer::StubReplyProducer;
use neo_core::services::speech_capture::UnsupportedSpeechCapture;
use neo_core::settings::{AppConfig, SessionStore};

use crate::app::App;

/// Loads fixed entries; every save fails
pub struct ReadOnlySettingsRepository {
    entries: SettingsEntries,
}

impl ReadOnlySettingsRepository {
    pub fn authenticated() -> Self {
        let mut entries = SettingsEntries::new();
        entries.insert("isAuthenticated".into(), "true".into());
        Self { entries }
    }
}

impl SettingsRepository for ReadOnlySettingsRepository {
    fn load(&self) -> BoxFuture<'static, RepositoryResult<SettingsEntries>> {
        let entries = self.entries.clone();
        Box::pin(async move { RepositoryResult::Ok(entries) })
    }

    fn save(&self, _entries: SettingsEntries) -> BoxFuture<'static, RepositoryResult<()>> {
        Box::pin(async {
            Err::<(), _>(RepositoryError::PathError("settings are read-only".into()))
        })
    }
}

pub async fn app_with_repository(repository: Arc<dyn SettingsRepository>) -> App {
    let settings = SessionStore::init(repository).await;
    let notifications = NotificationStore::new(Duration::from_secs(4), 50);
    let (session, _rx) = ChatSession::new(
        Arc::new(StubReplyProducer::new(Duration::from_millis(1500))),
        Arc::new(UnsupportedSpeechCapture),
        notifications.clone(),
    );
    App::new(
        AppConfig::default(),
        session,
        settings,
        notifications,
        ErrorStore::new(100),
        None,
    )
}

pub async fn test_app(authenticated: bool) -> (App, InMemorySettingsRepository) {
    let mut entries = SettingsEntries::new();
    if authenticated {
        entries.insert("isAuthenticated".into(), "true".into());
    }
    let repo = InMemorySettingsRepository::with_entries(entries);
    let app = app_with_repository(Arc::new(repo.clone())).await;
    (app, repo)
}
