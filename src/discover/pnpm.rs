use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_yaml::Value;

use super::{Discovery, DiscoveryOutcome};
use crate::config::Options;
use crate::error::RipError;
use crate::version::{is_newer, parse_version};

/// Reads the lock file of a pnpm virtual store (`node_modules/.pnpm`).
pub struct PnpmLockfile;

/// One `packages` entry of a pnpm lock file, decoded.
#[derive(Debug, PartialEq)]
struct StoreEntry {
    name: String,
    version: String,
    store_dir: String,
}

impl Discovery for PnpmLockfile {
    fn name(&self) -> &'static str {
        "pnpm lockfile"
    }

    fn discover(&self, project_root: &Path, options: &Options) -> DiscoveryOutcome {
        let store = project_root.join("node_modules").join(".pnpm");
        if !store.is_dir() {
            return DiscoveryOutcome::NotApplicable;
        }

        let lock_path = [store.join("lock.yaml"), project_root.join("pnpm-lock.yaml")]
            .into_iter()
            .find(|path| path.is_file());
        let Some(lock_path) = lock_path else {
            return DiscoveryOutcome::NotApplicable;
        };
        let Ok(content) = std::fs::read_to_string(&lock_path) else {
            return DiscoveryOutcome::NotApplicable;
        };

        let lock: Value = match serde_yaml::from_str(&content) {
            Ok(lock) => lock,
            Err(e) => {
                return DiscoveryOutcome::ParseError(RipError::UnparsableLockfile {
                    path: lock_path,
                    reason: e.to_string(),
                })
            }
        };

        let mut entries = Vec::new();

        if let Some(packages) = lock.get("packages").and_then(Value::as_mapping) {
            for (key, info) in packages {
                let Some(key) = key.as_str() else {
                    continue;
                };

                let is_dev = info.get("dev").and_then(Value::as_bool).unwrap_or(false);
                if is_dev && !options.include_dev {
                    continue;
                }

                let Some(entry) = decode_key(key) else {
                    continue;
                };
                if !options.accepts(&entry.name) {
                    continue;
                }

                entries.push(entry);
            }
        }

        DiscoveryOutcome::Found(select_installed(project_root, &store, entries))
    }
}

/// `/@scope/name@1.0.0(peer@2.0.0)` → name `@scope/name`, version `1.0.0`,
/// store dir `@scope+name@1.0.0_peer@2.0.0`.
fn decode_key(key: &str) -> Option<StoreEntry> {
    let key = key.strip_prefix('/').unwrap_or(key);

    // a scoped name starts with '@', so the separator is the first '@' after it
    let name_end = key.get(1..)?.find('@')? + 1;
    let name = &key[..name_end];
    let rest = &key[name_end + 1..];
    let version = rest.split('(').next().unwrap_or(rest);

    let store_dir: String = key
        .chars()
        .filter(|&c| c != ')')
        .map(|c| match c {
            '/' => '+',
            '(' => '_',
            c => c,
        })
        .collect();

    Some(StoreEntry {
        name: name.to_string(),
        version: version.to_string(),
        store_dir,
    })
}

/// One directory per package name. When several versions are stored, keep
/// the one hoisted to `<root>/node_modules/<name>`, otherwise the newest.
fn select_installed(project_root: &Path, store: &Path, entries: Vec<StoreEntry>) -> Vec<PathBuf> {
    let mut order: Vec<String> = Vec::new();
    let mut by_name: HashMap<String, Vec<(PathBuf, Vec<u64>)>> = HashMap::new();

    for entry in entries {
        let path = store
            .join(&entry.store_dir)
            .join("node_modules")
            .join(&entry.name);
        let version = parse_version(&entry.version);

        by_name
            .entry(entry.name.clone())
            .or_insert_with(|| {
                order.push(entry.name.clone());
                Vec::new()
            })
            .push((path, version));
    }

    let mut folders = Vec::with_capacity(order.len());

    for name in order {
        let Some(mut candidates) = by_name.remove(&name) else {
            continue;
        };
        if candidates.len() == 1 {
            folders.push(candidates.remove(0).0);
            continue;
        }

        let hoisted = std::fs::canonicalize(project_root.join("node_modules").join(&name)).ok();
        let linked = hoisted.and_then(|target| {
            candidates
                .iter()
                .position(|(path, _)| std::fs::canonicalize(path).ok().as_ref() == Some(&target))
        });

        let index = linked.unwrap_or_else(|| {
            let mut newest = 0;
            for (i, (_, version)) in candidates.iter().enumerate().skip(1) {
                if is_newer(version, &candidates[newest].1) {
                    newest = i;
                }
            }
            newest
        });

        folders.push(candidates.swap_remove(index).0);
    }

    folders
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCK: &str = r#"
lockfileVersion: '6.0'
packages:
  /lodash@4.17.21:
    resolution: {integrity: sha512-x}
    dev: false
  /@babel/core@7.22.0(supports-color@8.1.1):
    resolution: {integrity: sha512-y}
    dev: false
  /ava@5.3.1:
    resolution: {integrity: sha512-z}
    dev: true
"#;

    fn project(lock: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("node_modules").join(".pnpm");
        std::fs::create_dir_all(&store).unwrap();
        std::fs::write(store.join("lock.yaml"), lock).unwrap();
        dir
    }

    fn found(outcome: DiscoveryOutcome) -> Vec<PathBuf> {
        match outcome {
            DiscoveryOutcome::Found(folders) => folders,
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_decode_key() {
        assert_eq!(
            decode_key("/@babel/core@7.22.0(supports-color@8.1.1)"),
            Some(StoreEntry {
                name: "@babel/core".into(),
                version: "7.22.0".into(),
                store_dir: "@babel+core@7.22.0_supports-color@8.1.1".into(),
            })
        );
        assert_eq!(decode_key("lodash@4.17.21").unwrap().store_dir, "lodash@4.17.21");
        assert_eq!(decode_key("/no-version"), None);
    }

    #[test]
    fn test_store_paths() {
        let dir = project(LOCK);
        let store = dir.path().join("node_modules/.pnpm");

        let folders = found(PnpmLockfile.discover(dir.path(), &Options::default()));
        assert_eq!(
            folders,
            vec![
                store.join("lodash@4.17.21/node_modules/lodash"),
                store.join("@babel+core@7.22.0_supports-color@8.1.1/node_modules/@babel/core"),
            ]
        );
    }

    #[test]
    fn test_include_dev() {
        let dir = project(LOCK);
        let options = Options {
            include_dev: true,
            ..Options::default()
        };
        assert_eq!(found(PnpmLockfile.discover(dir.path(), &options)).len(), 3);
    }

    #[test]
    fn test_duplicate_names_keep_newest() {
        let dir = project("packages:\n  /debug@2.6.9: {}\n  /debug@4.3.4: {}\n  /debug@3.2.7: {}\n");
        let folders = found(PnpmLockfile.discover(dir.path(), &Options::default()));
        assert_eq!(
            folders,
            vec![dir.path().join("node_modules/.pnpm/debug@4.3.4/node_modules/debug")]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_duplicate_names_prefer_hoisted_link() {
        let dir = project("packages:\n  /debug@2.6.9: {}\n  /debug@4.3.4: {}\n");
        let store = dir.path().join("node_modules/.pnpm");
        let old = store.join("debug@2.6.9/node_modules/debug");
        std::fs::create_dir_all(&old).unwrap();
        std::fs::create_dir_all(store.join("debug@4.3.4/node_modules/debug")).unwrap();
        std::os::unix::fs::symlink(&old, dir.path().join("node_modules/debug")).unwrap();

        let folders = found(PnpmLockfile.discover(dir.path(), &Options::default()));
        assert_eq!(folders, vec![old]);
    }

    #[test]
    fn test_root_lockfile_needs_store() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("pnpm-lock.yaml"), LOCK).unwrap();
        assert!(matches!(
            PnpmLockfile.discover(dir.path(), &Options::default()),
            DiscoveryOutcome::NotApplicable
        ));

        std::fs::create_dir_all(dir.path().join("node_modules/.pnpm")).unwrap();
        assert_eq!(found(PnpmLockfile.discover(dir.path(), &Options::default())).len(), 2);
    }

    #[test]
    fn test_broken_lockfile() {
        let dir = project("packages: [unclosed");
        assert!(matches!(
            PnpmLockfile.discover(dir.path(), &Options::default()),
            DiscoveryOutcome::ParseError(_)
        ));
    }
}
