use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{fetch, fetch_raw_text, DirectorySource};
use crate::error::RipError;

const REPO_PREFIX: &str = "https://github.com/";

/// Root of a GitHub repository's default branch.
///
/// Listing uses the contents API (`GET /repos/{owner}/{repo}/contents`), files
/// are read from the raw content host at `HEAD`.
pub struct GitHubSource {
    client: Client,
    contents_url: String,
    raw_prefix: String,
}

#[derive(Debug, Deserialize)]
struct ContentEntry {
    name: String,
}

impl GitHubSource {
    /// `None` unless `repo_url` is a normalized `https://github.com/{owner}/{repo}` URL.
    pub fn from_url(repo_url: &str, client: Client) -> Option<Self> {
        let repo = repo_url.strip_prefix(REPO_PREFIX)?.trim_end_matches('/');
        if repo.is_empty() {
            return None;
        }

        Some(Self::with_hosts(
            client,
            "https://api.github.com",
            "https://raw.githubusercontent.com",
            repo,
        ))
    }

    /// `owner/repo` served by the given API and raw content hosts.
    pub(crate) fn with_hosts(client: Client, api_base: &str, raw_base: &str, repo: &str) -> Self {
        Self {
            client,
            contents_url: format!("{}/repos/{}/contents", api_base, repo),
            raw_prefix: format!("{}/{}/HEAD/", raw_base, repo),
        }
    }
}

#[async_trait]
impl DirectorySource for GitHubSource {
    async fn read_dir(&self) -> Vec<String> {
        let response = match fetch(&self.client, &self.contents_url).await {
            Ok(response) => response,
            Err(e @ RipError::NonSuccessHttp { .. }) => {
                warn!("{}", e);
                return Vec::new();
            }
            Err(e) => {
                debug!("{}", e);
                return Vec::new();
            }
        };

        match response.json::<Vec<ContentEntry>>().await {
            Ok(entries) => entries.into_iter().map(|entry| entry.name).collect(),
            Err(e) => {
                debug!(url = %self.contents_url, error = %e, "unexpected contents listing");
                Vec::new()
            }
        }
    }

    async fn read_file(&self, name: &str) -> Option<String> {
        fetch_raw_text(&self.client, &format!("{}{}", self.raw_prefix, name)).await
    }
}
