use std::path::Path;

use serde_json::Value;

use super::{Discovery, DiscoveryOutcome};
use crate::config::Options;
use crate::error::RipError;

/// Reads the `packages` map of `package-lock.json` (lockfile v2/v3).
pub struct NpmLockfile;

impl Discovery for NpmLockfile {
    fn name(&self) -> &'static str {
        "npm lockfile"
    }

    fn discover(&self, project_root: &Path, options: &Options) -> DiscoveryOutcome {
        let lock_path = project_root.join("package-lock.json");
        let Ok(content) = std::fs::read_to_string(&lock_path) else {
            return DiscoveryOutcome::NotApplicable;
        };

        let json: Value = match serde_json::from_str(&content) {
            Ok(json) => json,
            Err(e) => {
                return DiscoveryOutcome::ParseError(RipError::UnparsableLockfile {
                    path: lock_path,
                    reason: e.to_string(),
                })
            }
        };

        // lockfile v1 has no `packages` map, so the directory walk takes over
        let Some(packages) = json.get("packages").and_then(|v| v.as_object()) else {
            return DiscoveryOutcome::NotApplicable;
        };

        let mut folders = Vec::new();

        for (pkg_path, info) in packages {
            // the root entry is the project itself
            if pkg_path.is_empty() {
                continue;
            }

            let is_dev = info.get("dev").and_then(|v| v.as_bool()).unwrap_or(false);
            if is_dev && !options.include_dev {
                continue;
            }

            let name = info
                .get("name")
                .and_then(|v| v.as_str())
                .unwrap_or_else(|| name_from_path(pkg_path));
            if !options.accepts(name) {
                continue;
            }

            folders.push(project_root.join(pkg_path));
        }

        DiscoveryOutcome::Found(folders)
    }
}

/// `node_modules/a/node_modules/@scope/b` → `@scope/b`
fn name_from_path(pkg_path: &str) -> &str {
    match pkg_path.rfind("node_modules/") {
        Some(index) => &pkg_path[index + "node_modules/".len()..],
        None => pkg_path,
    }
}
