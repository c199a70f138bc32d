//! Single-package license resolution.
//!
//! A package's license texts come from, in order of preference:
//!
//! 1. a user override carrying `text` or `file`, used as is;
//! 2. the files in the package directory;
//! 3. the files at the root of its upstream repository, through the cache,
//!    when the package directory has no usable license text.
//!
//! The reported expression prefers declared metadata over what the texts say;
//! an expression derived from text gets a trailing `*`.

use std::path::Path;

use reqwest::Client;
use tracing::{debug, warn};

use crate::cache::Cache;
use crate::config::{ForcedLicense, Options};
use crate::error::{RipError, RipResult};
use crate::license::classifier::{classify_text, merge_expressions, UNKNOWN};
use crate::license::extract::licenses_from_source;
use crate::license::spdx;
use crate::models::{LicenseSource, PackageMeta, ResolvedLicense, ResolvedPackage};
use crate::source::repo_url::normalize_repo_url;
use crate::source::{remote_source, LocalSource};

pub struct Resolver {
    options: Options,
    client: Client,
    cache: Cache,
}

impl Resolver {
    pub fn new(options: Options, client: Client, cache: Cache) -> Self {
        Self {
            options,
            client,
            cache,
        }
    }

    /// Resolve the package in `package_dir`, or `None` if it is not a package
    /// or its name is filtered out.
    pub async fn resolve(&self, package_dir: &Path) -> Option<ResolvedPackage> {
        let meta = match read_package_meta(package_dir).await {
            Ok(meta) => meta,
            Err(e) => {
                debug!("{}", e);
                return None;
            }
        };

        // folder names do not always match package names
        if !self.options.accepts(&meta.name) {
            return None;
        }

        let forced = self.options.overrides.get(&meta.name);

        let licenses = match forced {
            Some(forced) if forced.forces_text() => vec![load_forced(forced).await],
            _ => self.find_license_texts(package_dir, &meta).await,
        };

        let license_expression = forced
            .and_then(|forced| forced.expression.clone())
            .or_else(|| meta.declared_license().map(|declared| spdx::correct(&declared)))
            .unwrap_or_else(|| {
                if licenses.is_empty() {
                    UNKNOWN.to_string()
                } else {
                    format!("{}*", merge_expressions(&licenses))
                }
            });

        let funding = meta.funding_urls();

        Some(ResolvedPackage {
            name: meta.name.clone(),
            version: meta.version_or_default(),
            path: package_dir.to_path_buf(),
            license_expression,
            licenses,
            homepage: meta.homepage.clone().filter(|_| self.options.include_homepage),
            repository: meta
                .repository_url()
                .and_then(normalize_repo_url)
                .filter(|_| self.options.include_repository),
            funding: Some(funding).filter(|urls| self.options.include_funding && !urls.is_empty()),
        })
    }

    async fn find_license_texts(&self, package_dir: &Path, meta: &PackageMeta) -> Vec<ResolvedLicense> {
        let local = licenses_from_source(&LocalSource::new(package_dir)).await;

        if !needs_remote(&local) {
            return local;
        }

        let Some(repo_url) = meta.repository_url().and_then(normalize_repo_url) else {
            return local;
        };

        let key = Cache::key_for(&repo_url);
        if let Some(cached) = self.cache.get(&key).await {
            return cached;
        }

        debug!(package = %meta.name, repo = %repo_url, "looking up license in repository");
        let source = remote_source(&repo_url, &self.client);
        let remote = licenses_from_source(source.as_ref()).await;

        if remote.is_empty() {
            // remember that the repository had nothing better
            self.cache.put(&key, &local).await;
            local
        } else {
            self.cache.put(&key, &remote).await;
            remote
        }
    }
}

/// Local texts are good enough when there is a license file, or a readme
/// section that names a recognised license.
fn needs_remote(local: &[ResolvedLicense]) -> bool {
    !local.iter().any(|license| match license.source {
        LicenseSource::License => true,
        LicenseSource::Readme => license.expression.as_deref() != Some(UNKNOWN),
        LicenseSource::Notice | LicenseSource::Forced => false,
    })
}

async fn read_package_meta(package_dir: &Path) -> RipResult<PackageMeta> {
    let not_a_package = || RipError::NotAPackage(package_dir.to_path_buf());

    let content = tokio::fs::read_to_string(package_dir.join("package.json"))
        .await
        .map_err(|_| not_a_package())?;
    let meta: PackageMeta = serde_json::from_str(&content).map_err(|_| not_a_package())?;

    if meta.name.is_empty() {
        return Err(not_a_package());
    }

    Ok(meta)
}

/// Build a license entry from user-supplied data. `file` wins over `text`;
/// without an explicit expression the text is classified.
pub async fn load_forced(forced: &ForcedLicense) -> ResolvedLicense {
    let text = match (&forced.file, &forced.text) {
        (Some(file), _) => match tokio::fs::read_to_string(file).await {
            Ok(text) => text,
            Err(e) => {
                warn!(file = %file.display(), error = %e, "failed to read license file");
                String::new()
            }
        },
        (None, Some(text)) => text.clone(),
        (None, None) => String::new(),
    };

    let expression = match &forced.expression {
        Some(expression) => expression.clone(),
        None if text.is_empty() => UNKNOWN.to_string(),
        None => classify_text(&text),
    };

    ResolvedLicense {
        expression: Some(expression),
        source: LicenseSource::Forced,
        text,
    }
}
