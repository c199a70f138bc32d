//! Directory sources: a package's top-level files, on disk or in its upstream repository.
//!
//! Each source exposes the two operations license extraction needs, listing
//! entries and reading one entry as text. Remote sources swallow network and
//! HTTP failures as empty results, so a package whose repository is down or
//! rate limited resolves exactly like one without license files.

pub mod github;
pub mod gitlab;
pub mod local;
pub mod null;
pub mod repo_url;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::error::{RipError, RipResult};

pub use github::GitHubSource;
pub use gitlab::GitLabSource;
pub use local::LocalSource;
pub use null::NullSource;

#[async_trait]
pub trait DirectorySource: Send + Sync {
    /// Names of the entries at the root of the source.
    async fn read_dir(&self) -> Vec<String>;

    /// Contents of one entry, or `None` if it cannot be read.
    async fn read_file(&self, name: &str) -> Option<String>;
}

/// Pick the remote source for a normalized repository URL.
pub fn remote_source(repo_url: &str, client: &Client) -> Box<dyn DirectorySource> {
    if let Some(source) = GitHubSource::from_url(repo_url, client.clone()) {
        return Box::new(source);
    }
    if let Some(source) = GitLabSource::from_url(repo_url, client.clone()) {
        return Box::new(source);
    }
    Box::new(NullSource::new(repo_url))
}

/// Build the shared HTTP client for remote sources.
pub fn http_client() -> anyhow::Result<Client> {
    Ok(Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .user_agent(concat!("license-ripper/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// GET a URL and return the successful response.
///
/// Transport failures and non-2xx statuses are both errors; the body of a
/// non-2xx response is kept for logging.
pub(crate) async fn fetch(client: &Client, url: &str) -> RipResult<reqwest::Response> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| RipError::Network {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(RipError::NonSuccessHttp {
            url: url.to_string(),
            status,
            body,
        });
    }

    Ok(response)
}

/// Fetch a raw file. A missing file is an expected outcome and only logged at debug level.
pub(crate) async fn fetch_raw_text(client: &Client, url: &str) -> Option<String> {
    let response = match fetch(client, url).await {
        Ok(response) => response,
        Err(e) => {
            debug!("{}", e);
            return None;
        }
    };

    match response.text().await {
        Ok(text) => Some(text),
        Err(e) => {
            debug!(url, error = %e, "failed to read response body");
            None
        }
    }
}
