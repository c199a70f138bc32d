use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use super::DirectorySource;

/// A package directory on disk.
pub struct LocalSource {
    base_dir: PathBuf,
}

impl LocalSource {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

#[async_trait]
impl DirectorySource for LocalSource {
    async fn read_dir(&self) -> Vec<String> {
        let mut entries = match tokio::fs::read_dir(&self.base_dir).await {
            Ok(entries) => entries,
            Err(e) => {
                debug!(dir = %self.base_dir.display(), error = %e, "failed to list directory");
                return Vec::new();
            }
        };

        let mut names = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }

        // directory order is platform dependent
        names.sort();
        names
    }

    async fn read_file(&self, name: &str) -> Option<String> {
        let bytes = tokio::fs::read(self.base_dir.join(name)).await.ok()?;
        Some(String::from_utf8_lossy(&bytes).into_owned())
    }
}
