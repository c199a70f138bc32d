use std::path::PathBuf;

use thiserror::Error;

/// Failures that can occur while resolving licenses.
///
/// None of these abort a scan: each is logged where it happens and the affected
/// step degrades to an empty or absent result.
#[derive(Debug, Error)]
pub enum RipError {
    #[error("no readable package.json in {}", .0.display())]
    NotAPackage(PathBuf),

    #[error("failed to parse lock file {}: {reason}", .path.display())]
    UnparsableLockfile { path: PathBuf, reason: String },

    #[error("request to \"{url}\" failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("\"{url}\" responded with {status}\n{body}")]
    NonSuccessHttp {
        url: String,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("cache entry {key} is unusable: {reason}")]
    CacheCorrupt { key: String, reason: String },
}

pub type RipResult<T> = Result<T, RipError>;
