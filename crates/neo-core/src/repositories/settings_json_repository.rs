use std::path::PathBuf;

use super::error::{RepositoryError, RepositoryResult};
use super::settings_repository::{BoxFuture, SettingsEntries, SettingsRepository};

pub struct SettingsJsonRepository {
    file_path: PathBuf,
}

impl SettingsJsonRepository {
    /// Create repository with XDG-compliant path
    pub fn new() -> RepositoryResult<Self> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            RepositoryError::PathError("Cannot determine config directory".into())
        })?;

        Ok(Self::with_path(config_dir.join("neo").join("settings.json")))
    }

    pub fn with_path(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    pub fn file_path(&self) -> &PathBuf {
        &self.file_path
    }
}

impl SettingsRepository for SettingsJsonRepository {
    fn load(&self) -> BoxFuture<'static, RepositoryResult<SettingsEntries>> {
        let path = self.file_path.clone();

        Box::pin(async move {
            if !tokio::fs::try_exists(&path).await? {
                return Ok(SettingsEntries::new());
            }

            let contents = tokio::fs::read_to_string(&path).await?;
            if contents.trim().is_empty() {
                return Ok(SettingsEntries::new());
            }

            let entries: SettingsEntries = serde_json::from_str(&contents)?;
            Ok(entries)
        })
    }

    fn save(&self, entries: SettingsEntries) -> BoxFuture<'static, RepositoryResult<()>> {
        let path = self.file_path.clone();

        Box::pin(async move {
            let json = serde_json::to_string_pretty(&entries)?;

            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }

            // Write atomically using temp file + rename
            let temp_path = path.with_extension("json.tmp");
            tokio::fs::write(&temp_path, &json).await?;
            tokio::fs::rename(&temp_path, &path).await?;

            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entries(pairs: &[(&str, &str)]) -> SettingsEntries {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let repo = SettingsJsonRepository::with_path(dir.path().join("settings.json"));
        assert!(repo.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let repo = SettingsJsonRepository::with_path(&path);

        let saved = entries(&[("isAuthenticated", "true"), ("theme", "light")]);
        repo.save(saved.clone()).await.unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(repo.load().await.unwrap(), saved);
    }

    #[tokio::test]
    async fn test_save_replaces_previous_entries() {
        let dir = TempDir::new().unwrap();
        let repo = SettingsJsonRepository::with_path(dir.path().join("settings.json"));

        repo.save(entries(&[("user", "{}"), ("theme", "dark")]))
            .await
            .unwrap();
        repo.save(entries(&[("theme", "dark")])).await.unwrap();

        let loaded = repo.load().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(!loaded.contains_key("user"));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_serialization_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();

        let repo = SettingsJsonRepository::with_path(&path);
        assert!(matches!(
            repo.load().await,
            Err(RepositoryError::SerializationError(_))
        ));
    }
}
