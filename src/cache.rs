//! File-based cache of license texts fetched from remote repositories.
//!
//! Remote APIs are unauthenticated and rate limited, so every remote lookup
//! (including one that found nothing better than the local files) is stored
//! under the repository URL. One JSON file per key:
//!
//! ```json
//! { "version": 1, "data": [ { "expression": "MIT", "source": "license", "text": "..." } ] }
//! ```
//!
//! Entries written with another schema version are ignored. The cache is an
//! optimization only: read problems are misses and write problems are logged
//! and dropped.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RipError;
use crate::models::ResolvedLicense;

/// Bump whenever the shape or meaning of cached [`ResolvedLicense`] data changes.
pub const CACHE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    version: u32,
    data: Vec<ResolvedLicense>,
}

#[derive(Debug, Clone)]
pub struct Cache {
    dir: Option<PathBuf>,
}

impl Cache {
    /// A cache rooted at `dir`; `None` or an empty path disables caching.
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self {
            dir: dir.filter(|dir| !dir.as_os_str().is_empty()),
        }
    }

    /// Default cache location for a project.
    pub fn default_dir(project_root: &Path) -> PathBuf {
        project_root
            .join("node_modules")
            .join(".cache")
            .join("license-ripper")
    }

    /// Cache keys are percent-encoded so any URL is a valid file name.
    pub fn key_for(repo_url: &str) -> String {
        urlencoding::encode(repo_url).into_owned()
    }

    pub async fn get(&self, key: &str) -> Option<Vec<ResolvedLicense>> {
        let dir = self.dir.as_ref()?;
        let text = tokio::fs::read_to_string(dir.join(key)).await.ok()?;

        match parse_entry(key, &text) {
            Ok(data) => Some(data),
            Err(e) => {
                debug!("{}", e);
                None
            }
        }
    }

    pub async fn put(&self, key: &str, data: &[ResolvedLicense]) {
        let Some(dir) = self.dir.as_ref() else {
            return;
        };

        let entry = CacheEntry {
            version: CACHE_VERSION,
            data: data.to_vec(),
        };

        let result = async {
            tokio::fs::create_dir_all(dir).await?;
            let content = serde_json::to_string(&entry)?;
            tokio::fs::write(dir.join(key), content).await?;
            anyhow::Ok(())
        }
        .await;

        if let Err(e) = result {
            debug!(key, error = %e, "failed to write cache entry");
        }
    }

    /// Remove every cached entry.
    pub async fn clear(&self) -> anyhow::Result<()> {
        let Some(dir) = self.dir.as_ref() else {
            return Ok(());
        };

        match tokio::fs::remove_dir_all(dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn parse_entry(key: &str, text: &str) -> Result<Vec<ResolvedLicense>, RipError> {
    let entry: CacheEntry = serde_json::from_str(text).map_err(|e| RipError::CacheCorrupt {
        key: key.to_string(),
        reason: e.to_string(),
    })?;

    if entry.version != CACHE_VERSION {
        return Err(RipError::CacheCorrupt {
            key: key.to_string(),
            reason: format!("schema version {} != {}", entry.version, CACHE_VERSION),
        });
    }

    Ok(entry.data)
}
