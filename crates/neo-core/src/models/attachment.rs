//! Staged attachment metadata
//!
//! Only the file's name and size are kept. Content is never read or uploaded,
//! and any file type or size is accepted.

use std::path::Path;

pub const ATTACHMENT_MARKER_PREFIX: &str = "📎 Attached: ";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StagedAttachment {
    pub name: String,
    pub size_bytes: u64,
}

impl StagedAttachment {
    pub fn new(name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            size_bytes,
        }
    }

    /// Build an attachment descriptor from a file on disk
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not a file", path.display()),
            ));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self::new(name, metadata.len()))
    }

    /// Line appended to the message content when this attachment is sent
    pub fn marker(&self) -> String {
        format!("{}{}", ATTACHMENT_MARKER_PREFIX, self.name)
    }

    /// Size in kilobytes with one decimal, e.g. "2.0 KB"
    pub fn display_size(&self) -> String {
        format!("{:.1} KB", self.size_bytes as f64 / 1024.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_contains_name() {
        let attachment = StagedAttachment::new("report.pdf", 2048);
        assert_eq!(attachment.marker(), "📎 Attached: report.pdf");
    }

    #[test]
    fn test_display_size() {
        assert_eq!(StagedAttachment::new("a", 2048).display_size(), "2.0 KB");
        assert_eq!(StagedAttachment::new("b", 1536).display_size(), "1.5 KB");
        assert_eq!(StagedAttachment::new("c", 0).display_size(), "0.0 KB");
    }

    #[tokio::test]
    async fn test_from_path_reads_name_and_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, vec![0u8; 300]).unwrap();

        let attachment = StagedAttachment::from_path(&path).await.unwrap();
        assert_eq!(attachment.name, "notes.txt");
        assert_eq!(attachment.size_bytes, 300);
    }

    #[tokio::test]
    async fn test_from_path_rejects_missing_file_and_directories() {
        let dir = tempfile::tempdir().unwrap();
        assert!(
            StagedAttachment::from_path(&dir.path().join("missing.bin"))
                .await
                .is_err()
        );
        assert!(StagedAttachment::from_path(dir.path()).await.is_err());
    }
}
