use async_trait::async_trait;
use tracing::warn;

use super::DirectorySource;

/// Stand-in for repositories on hosts without a supported API.
pub struct NullSource;

impl NullSource {
    /// Logs the unsupported host once, when the source is selected.
    pub fn new(repo_url: &str) -> Self {
        warn!("unsupported repository url \"{}\"", repo_url);
        Self
    }
}

#[async_trait]
impl DirectorySource for NullSource {
    async fn read_dir(&self) -> Vec<String> {
        Vec::new()
    }

    async fn read_file(&self, _name: &str) -> Option<String> {
        None
    }
}
