//! Package-set discovery: which installed package directories belong to a project.
//!
//! Strategies are tried in order and the first that applies wins:
//!
//! 1. [`npm::NpmLockfile`] — `package-lock.json`
//! 2. [`pnpm::PnpmLockfile`] — the `.pnpm` store's lock file
//! 3. [`walk::GuidedWalk`] (or [`walk::FullWalk`] with `includeDev`) — `node_modules` itself
//!
//! Every strategy applies the same include/exclude name filter.

pub mod npm;
pub mod pnpm;
pub mod walk;

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::Options;
use crate::error::RipError;

/// Result of one discovery strategy.
#[derive(Debug)]
pub enum DiscoveryOutcome {
    Found(Vec<PathBuf>),
    /// The package manager this strategy reads is not in use.
    NotApplicable,
    ParseError(RipError),
}

pub trait Discovery {
    fn name(&self) -> &'static str;
    fn discover(&self, project_root: &Path, options: &Options) -> DiscoveryOutcome;
}

/// Ordered list of absolute package directories to resolve.
pub fn discover(project_root: &Path, options: &Options) -> Vec<PathBuf> {
    let walk: Box<dyn Discovery> = if options.include_dev {
        // dev edges are not declared transitively, so walk everything
        Box::new(walk::FullWalk)
    } else {
        Box::new(walk::GuidedWalk)
    };
    let strategies: Vec<Box<dyn Discovery>> =
        vec![Box::new(npm::NpmLockfile), Box::new(pnpm::PnpmLockfile), walk];

    for strategy in strategies {
        match strategy.discover(project_root, options) {
            DiscoveryOutcome::Found(folders) => {
                debug!(strategy = strategy.name(), count = folders.len(), "discovered packages");
                return folders;
            }
            DiscoveryOutcome::NotApplicable => continue,
            DiscoveryOutcome::ParseError(e) => {
                warn!("{}", e);
                continue;
            }
        }
    }

    Vec::new()
}

/// Names of the packages installed directly in a `node_modules` directory.
///
/// Scoped packages are unwrapped to `@scope/name`; dot-directories such as
/// `.bin` and `.cache` are skipped.
pub(crate) fn installed_packages(modules_dir: &Path) -> Vec<String> {
    let mut names = Vec::new();

    for entry in sorted_subdirs(modules_dir) {
        if entry.starts_with('@') {
            for scoped in sorted_subdirs(&modules_dir.join(&entry)) {
                names.push(format!("{}/{}", entry, scoped));
            }
        } else {
            names.push(entry);
        }
    }

    names
}

/// Visible subdirectory names of `dir`, sorted; symlinks to directories count.
pub(crate) fn sorted_subdirs(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut names: Vec<String> = entries
        .flatten()
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| !name.starts_with('.'))
        .collect();

    names.sort();
    names
}


#[cfg(test)]
mod tests {
    use super::fixtures::write_package;
    use super::*;

    #[test]
    fn test_installed_packages_unwraps_scopes() {
        let dir = tempfile::tempdir().unwrap();
        let modules = dir.path().join("node_modules");
        write_package(&modules.join("lodash"), r#"{"name":"lodash"}"#);
        write_package(&modules.join("@babel").join("core"), r#"{"name":"@babel/core"}"#);
        std::fs::create_dir_all(modules.join(".bin")).unwrap();

        assert_eq!(installed_packages(&modules), vec!["@babel/core", "lodash"]);
    }

    #[test]
    fn test_npm_lockfile_wins_over_walk() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write_package(root, r#"{"name":"app","dependencies":{"a":"1","b":"1"}}"#);
        write_package(&root.join("node_modules/a"), r#"{"name":"a"}"#);
        write_package(&root.join("node_modules/b"), r#"{"name":"b"}"#);
        std::fs::write(
            root.join("package-lock.json"),
            r#"{"packages":{"":{"name":"app"},"node_modules/a":{}}}"#,
        )
        .unwrap();

        assert_eq!(
            discover(root, &Options::default()),
            vec![root.join("node_modules/a")]
        );
    }

    #[test]
    fn test_broken_lockfile_falls_through_to_walk() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write_package(root, r#"{"name":"app","dependencies":{"a":"1"}}"#);
        write_package(&root.join("node_modules/a"), r#"{"name":"a"}"#);
        std::fs::write(root.join("package-lock.json"), "{ nope").unwrap();

        assert_eq!(
            discover(root, &Options::default()),
            vec![root.join("node_modules/a")]
        );
    }
}
