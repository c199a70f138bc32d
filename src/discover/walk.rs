use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};

use super::{installed_packages, sorted_subdirs, Discovery, DiscoveryOutcome};
use crate::config::Options;
use crate::models::PackageMeta;

/// Follows declared runtime dependencies from the root `package.json`.
pub struct GuidedWalk;

/// Every package directory under `node_modules`, dev or not.
pub struct FullWalk;

impl Discovery for GuidedWalk {
    fn name(&self) -> &'static str {
        "guided walk"
    }

    fn discover(&self, project_root: &Path, options: &Options) -> DiscoveryOutcome {
        let modules_root = project_root.join("node_modules");

        let mut folders = Vec::new();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([project_root.to_path_buf()]);

        while let Some(folder) = queue.pop_front() {
            let Some(meta) = read_meta(&folder) else {
                continue;
            };

            let modules_path = folder.join("node_modules");
            let stored = installed_packages(&modules_path);

            let mut names: Vec<&str> = meta
                .dependencies
                .keys()
                .chain(meta.optional_dependencies.keys())
                .chain(meta.peer_dependencies.keys())
                .map(String::as_str)
                .collect();
            // HashMap order is arbitrary
            names.sort_unstable();

            // a nested node_modules only exists because this package needed it
            if modules_path != modules_root {
                names.extend(stored.iter().map(String::as_str));
            }

            for name in names {
                if !options.accepts(name) {
                    continue;
                }

                let package_path = if stored.iter().any(|s| s == name) {
                    modules_path.join(name)
                } else {
                    modules_root.join(name)
                };

                if seen.insert(package_path.clone()) {
                    folders.push(package_path.clone());
                    queue.push_back(package_path);
                }
            }
        }

        DiscoveryOutcome::Found(folders)
    }
}

impl Discovery for FullWalk {
    fn name(&self) -> &'static str {
        "full walk"
    }

    fn discover(&self, project_root: &Path, options: &Options) -> DiscoveryOutcome {
        let mut folders = Vec::new();
        let mut queue = VecDeque::from([project_root.join("node_modules")]);

        while let Some(modules_path) = queue.pop_front() {
            for entry in sorted_subdirs(&modules_path) {
                let entry_path = modules_path.join(&entry);

                if entry.starts_with('@') {
                    for scoped in sorted_subdirs(&entry_path) {
                        let name = format!("{}/{}", entry, scoped);
                        visit(&entry_path.join(scoped), &name, options, &mut folders, &mut queue);
                    }
                } else {
                    visit(&entry_path, &entry, options, &mut folders, &mut queue);
                }
            }
        }

        DiscoveryOutcome::Found(folders)
    }
}

fn visit(
    package_path: &Path,
    name: &str,
    options: &Options,
    folders: &mut Vec<PathBuf>,
    queue: &mut VecDeque<PathBuf>,
) {
    queue.push_back(package_path.join("node_modules"));
    if options.accepts(name) {
        folders.push(package_path.to_path_buf());
    }
}

fn read_meta(folder: &Path) -> Option<PackageMeta> {
    let content = std::fs::read_to_string(folder.join("package.json")).ok()?;
    serde_json::from_str(&content).ok()
}
