use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use futures::future::join_all;
use indicatif::ProgressBar;
use reqwest::Client;

use crate::cache::Cache;
use crate::config::Options;
use crate::discover::discover;
use crate::license::classifier::UNKNOWN;
use crate::models::{ErrorManifest, Output, ResolvedLicense, ResolvedPackage};
use crate::resolver::{load_forced, Resolver};
use crate::version::{is_newer, parse_version};

/// Packages resolved concurrently per batch.
const BATCH_SIZE: usize = 75;

/// The cache to use for a project: the configured folder, or the project default when unset.
pub fn project_cache(project_root: &Path, options: &Options) -> Cache {
    match &options.cache_folder {
        Some(folder) => Cache::new(Some(folder.clone())),
        None => Cache::new(Some(Cache::default_dir(project_root))),
    }
}

/// Resolve every dependency of the project at `project_root`.
///
/// `progress` is sized to the number of discovered packages and advanced as
/// each one resolves.
pub async fn rip_all(
    project_root: &Path,
    options: &Options,
    client: Client,
    progress: Option<&ProgressBar>,
) -> Output {
    let folders: Vec<PathBuf> = discover(project_root, options);
    if let Some(pb) = progress {
        pb.set_length(folders.len() as u64);
    }

    let resolver = Resolver::new(options.clone(), client, project_cache(project_root, options));
    let mut fold = Fold::default();

    for batch in folders.chunks(BATCH_SIZE) {
        let results = join_all(batch.iter().map(|folder| resolver.resolve(folder))).await;

        for result in results {
            if let Some(pb) = progress {
                pb.inc(1);
            }
            if let Some(package) = result {
                fold.add(package);
            }
        }
    }

    for entry in &options.append {
        let license = load_forced(&entry.license).await;
        let licenses = if license.text.is_empty() {
            Vec::new()
        } else {
            vec![license.clone()]
        };

        fold.output.resolved.push(ResolvedPackage {
            name: entry.name.clone(),
            version: entry.version.clone().unwrap_or_default(),
            path: PathBuf::new(),
            license_expression: license.expression.unwrap_or_else(|| UNKNOWN.to_string()),
            licenses,
            homepage: entry.homepage.clone(),
            repository: entry.repository.clone(),
            funding: None,
        });
    }

    fold.output
}

/// Sequential accumulator for resolved packages.
#[derive(Default)]
struct Fold {
    output: Output,
    /// Indices into `output.resolved` per package name, with the parsed version stored there.
    by_name: HashMap<String, Vec<(usize, Vec<u64>)>>,
}

impl Fold {
    fn add(&mut self, package: ResolvedPackage) {
        record_errors(&mut self.output.errors, &package);

        let version = parse_version(&package.version);
        let resolved = &mut self.output.resolved;
        let known = self.by_name.entry(package.name.clone()).or_default();

        // same name with the same texts is the same package at another version
        let existing = known
            .iter()
            .position(|(index, _)| same_texts(&resolved[*index].licenses, &package.licenses));

        match existing {
            Some(slot) => {
                let (index, kept_version) = &mut known[slot];
                if is_newer(&version, kept_version) {
                    resolved[*index] = package;
                    *kept_version = version;
                }
            }
            None => {
                known.push((resolved.len(), version));
                resolved.push(package);
            }
        }
    }
}

fn record_errors(errors: &mut ErrorManifest, package: &ResolvedPackage) {
    if package.license_expression.contains(UNKNOWN) {
        errors.invalid_license.push(package.name.clone());
    }
    if package.licenses.is_empty() {
        errors.missing_license_text.push(package.name.clone());
    }
}

fn same_texts(a: &[ResolvedLicense], b: &[ResolvedLicense]) -> bool {
    text_set(a) == text_set(b)
}

fn text_set(licenses: &[ResolvedLicense]) -> HashSet<&str> {
    licenses.iter().map(|license| license.text.as_str()).collect()
}
