use std::sync::Arc;

use tracing::{error, info, warn};

use crate::repositories::{RepositoryResult, SettingsEntries, SettingsRepository};

pub const AUTH_KEY: &str = "isAuthenticated";
pub const THEME_KEY: &str = "theme";
/// Profile blob written by older builds; removed on logout
pub const LEGACY_USER_KEY: &str = "user";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    /// Anything but `"light"` is dark
    pub fn from_value(value: Option<&str>) -> Self {
        match value {
            Some("light") => Self::Light,
            _ => Self::Dark,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionSettings {
    pub authenticated: bool,
    pub theme: Theme,
}

impl SessionSettings {
    pub fn from_entries(entries: &SettingsEntries) -> Self {
        Self {
            authenticated: entries.get(AUTH_KEY).map(String::as_str) == Some("true"),
            theme: Theme::from_value(entries.get(THEME_KEY).map(String::as_str)),
        }
    }

    /// Write these settings into `entries`, leaving unrelated keys alone
    pub fn apply_to(&self, entries: &mut SettingsEntries) {
        entries.insert(AUTH_KEY.to_string(), self.authenticated.to_string());
        entries.insert(THEME_KEY.to_string(), self.theme.as_str().to_string());
    }
}

/// Login flag and theme, loaded once and written through on every change
pub struct SessionStore {
    repository: Arc<dyn SettingsRepository>,
    entries: SettingsEntries,
    settings: SessionSettings,
}

impl SessionStore {
    /// Load persisted settings. Failures fall back to defaults.
    pub async fn init(repository: Arc<dyn SettingsRepository>) -> Self {
        let entries = match repository.load().await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = ?e, "Failed to load session settings, using default settings");
                SettingsEntries::new()
            }
        };
        let settings = SessionSettings::from_entries(&entries);
        info!(
            authenticated = settings.authenticated,
            theme = settings.theme.as_str(),
            "Session settings loaded"
        );

        Self {
            repository,
            entries,
            settings,
        }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn is_authenticated(&self) -> bool {
        self.settings.authenticated
    }

    pub fn theme(&self) -> Theme {
        self.settings.theme
    }

    /// Mark logged in. On a failed save the flag reverts to logged out.
    pub async fn login(&mut self) -> RepositoryResult<()> {
        self.settings.authenticated = true;
        self.entries
            .insert(AUTH_KEY.to_string(), "true".to_string());

        if let Err(e) = self.persist().await {
            error!(error = ?e, "Failed to save login state");
            self.settings.authenticated = false;
            self.entries.remove(AUTH_KEY);
            return Err(e);
        }
        info!("Logged in");
        Ok(())
    }

    /// Mark logged out and forget the stored user.
    ///
    /// The in-memory state is logged out even when the save fails.
    pub async fn logout(&mut self) -> RepositoryResult<()> {
        self.settings.authenticated = false;
        self.entries.remove(AUTH_KEY);
        self.entries.remove(LEGACY_USER_KEY);

        self.persist().await.inspect_err(|e| {
            error!(error = ?e, "Failed to save logout state");
        })?;
        info!("Logged out");
        Ok(())
    }

    /// Switch theme (optimistic; the new theme stays applied if saving fails)
    pub async fn toggle_theme(&mut self) -> RepositoryResult<Theme> {
        let theme = self.settings.theme.toggled();
        self.settings.theme = theme;
        self.entries
            .insert(THEME_KEY.to_string(), theme.as_str().to_string());

        if let Err(e) = self.persist().await {
            error!(error = ?e, "Failed to save theme, changes will be lost on restart");
            return Err(e);
        }
        Ok(theme)
    }

    /// Flush the current state before exit
    pub async fn teardown(mut self) -> RepositoryResult<()> {
        if self.settings.authenticated {
            self.settings.apply_to(&mut self.entries);
        } else {
            self.entries
                .insert(THEME_KEY.to_string(), self.settings.theme.as_str().to_string());
        }
        self.persist().await
    }

    async fn persist(&self) -> RepositoryResult<()> {
        self.repository.save(self.entries.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{InMemorySettingsRepository, RepositoryError};
    use futures::future::BoxFuture;

    fn entries(pairs: &[(&str, &str)]) -> SettingsEntries {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    struct FailingRepository;

    impl SettingsRepository for FailingRepository {
        fn load(&self) -> BoxFuture<'static, RepositoryResult<SettingsEntries>> {
            Box::pin(async {
                Err::<SettingsEntries, _>(RepositoryError::InvalidData {
                    message: "unreadable".into(),
                })
            })
        }

        fn save(&self, _entries: SettingsEntries) -> BoxFuture<'static, RepositoryResult<()>> {
            Box::pin(async { Err::<(), _>(RepositoryError::PathError("read-only".into())) })
        }
    }

    #[test]
    fn test_settings_key_encoding() {
        let parsed = SessionSettings::from_entries(&entries(&[
            ("isAuthenticated", "true"),
            ("theme", "light"),
        ]));
        assert!(parsed.authenticated);
        assert_eq!(parsed.theme, Theme::Light);

        let fallback = SessionSettings::from_entries(&entries(&[
            ("isAuthenticated", "yes"),
            ("theme", "solarized"),
        ]));
        assert!(!fallback.authenticated);
        assert_eq!(fallback.theme, Theme::Dark);

        let mut out = SettingsEntries::new();
        parsed.apply_to(&mut out);
        assert_eq!(out, entries(&[("isAuthenticated", "true"), ("theme", "light")]));
    }

    #[tokio::test]
    async fn test_login_and_logout_write_through() {
        let repo =
            InMemorySettingsRepository::with_entries(entries(&[("user", "{\"name\":\"a\"}")]));
        let mut store = SessionStore::init(Arc::new(repo.clone())).await;
        assert!(!store.is_authenticated());

        store.login().await.unwrap();
        assert!(store.is_authenticated());
        assert_eq!(
            repo.snapshot().get(AUTH_KEY).map(String::as_str),
            Some("true")
        );

        store.logout().await.unwrap();
        assert!(!store.is_authenticated());
        let saved = repo.snapshot();
        assert!(!saved.contains_key(AUTH_KEY));
        assert!(!saved.contains_key(LEGACY_USER_KEY));
    }

    #[tokio::test]
    async fn test_toggle_theme_persists() {
        let repo = InMemorySettingsRepository::new();
        let mut store = SessionStore::init(Arc::new(repo.clone())).await;
        assert_eq!(store.theme(), Theme::Dark);

        assert_eq!(store.toggle_theme().await.unwrap(), Theme::Light);
        assert_eq!(
            repo.snapshot().get(THEME_KEY).map(String::as_str),
            Some("light")
        );
        assert_eq!(store.toggle_theme().await.unwrap(), Theme::Dark);
        assert_eq!(repo.save_count(), 2);
    }

    #[tokio::test]
    async fn test_failed_load_uses_defaults_and_failed_login_reverts() {
        let mut store = SessionStore::init(Arc::new(FailingRepository)).await;
        assert_eq!(store.settings(), &SessionSettings::default());

        assert!(store.login().await.is_err());
        assert!(!store.is_authenticated());

        // Theme change stays applied in memory
        assert!(store.toggle_theme().await.is_err());
        assert_eq!(store.theme(), Theme::Light);
    }

    #[tokio::test]
    async fn test_teardown_flushes_state() {
        let repo = InMemorySettingsRepository::new();
        let mut store = SessionStore::init(Arc::new(repo.clone())).await;
        store.login().await.unwrap();
        store.teardown().await.unwrap();

        let saved = repo.snapshot();
        assert_eq!(saved.get(AUTH_KEY).map(String::as_str), Some("true"));
        assert_eq!(saved.get(THEME_KEY).map(String::as_str), Some("dark"));
    }
}
