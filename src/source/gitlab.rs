use async_trait::async_trait;
use regex::Regex;
use reqwest::header::LINK;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{fetch, fetch_raw_text, DirectorySource};
use crate::error::RipError;

const REPO_PREFIX: &str = "https://gitlab.com/";

/// Root of a GitLab repository.
///
/// Listing walks the paginated repository-tree API; files are read from the
/// raw blob endpoint on `master`.
pub struct GitLabSource {
    client: Client,
    tree_url: String,
    raw_prefix: String,
}

#[derive(Debug, Deserialize)]
struct TreeEntry {
    name: String,
}

impl GitLabSource {
    /// `None` unless `repo_url` is a normalized `https://gitlab.com/{namespace}/{project}` URL.
    pub fn from_url(repo_url: &str, client: Client) -> Option<Self> {
        let project = repo_url.strip_prefix(REPO_PREFIX)?.trim_end_matches('/');
        if project.is_empty() {
            return None;
        }

        Some(Self::with_host(client, "https://gitlab.com", project))
    }

    /// `namespace/project` on the GitLab instance at `base`.
    pub(crate) fn with_host(client: Client, base: &str, project: &str) -> Self {
        Self {
            client,
            tree_url: format!(
                "{}/api/v4/projects/{}/repository/tree?per_page=100",
                base,
                urlencoding::encode(project)
            ),
            raw_prefix: format!("{}/{}/-/raw/master/", base, project),
        }
    }
}

#[async_trait]
impl DirectorySource for GitLabSource {
    async fn read_dir(&self) -> Vec<String> {
        let mut names = Vec::new();
        let mut next_url = Some(self.tree_url.clone());

        // each page names the next one, so pages are fetched strictly in sequence
        while let Some(url) = next_url.take() {
            let response = match fetch(&self.client, &url).await {
                Ok(response) => response,
                Err(e @ RipError::NonSuccessHttp { .. }) => {
                    warn!("{}", e);
                    break;
                }
                Err(e) => {
                    debug!("{}", e);
                    break;
                }
            };

            next_url = response
                .headers()
                .get(LINK)
                .and_then(|value| value.to_str().ok())
                .and_then(next_page_url);

            match response.json::<Vec<TreeEntry>>().await {
                Ok(entries) => names.extend(entries.into_iter().map(|entry| entry.name)),
                Err(e) => {
                    debug!(url = %url, error = %e, "unexpected tree listing");
                    break;
                }
            }
        }

        names
    }

    async fn read_file(&self, name: &str) -> Option<String> {
        fetch_raw_text(&self.client, &format!("{}{}", self.raw_prefix, name)).await
    }
}

/// The `rel="next"` target of a `Link` header, if any.
fn next_page_url(link_header: &str) -> Option<String> {
    let link_re = Regex::new(r#"<([^>]+)>\s*;\s*rel="next""#).ok()?;

    link_header
        .split(',')
        .find_map(|link| link_re.captures(link.trim()))
        .map(|caps| caps[1].to_string())
}
