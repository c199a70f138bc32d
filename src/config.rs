use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Scan options, deserialized from a config file (camelCase keys) and layered with CLI flags.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Options {
    /// Include devDependencies.
    pub include_dev: bool,
    pub include_homepage: bool,
    pub include_repository: bool,
    pub include_funding: bool,
    /// When non-empty, only these package names are reported.
    pub include: Vec<String>,
    /// Package names never reported, e.g. when a parent package carries their license.
    pub exclude: Vec<String>,
    /// Per-package forced license expression and/or text.
    pub overrides: HashMap<String, ForcedLicense>,
    /// Extra entries that scanning cannot discover.
    pub append: Vec<AppendEntry>,
    /// Cache root. Unset means the project default; an empty path disables caching.
    pub cache_folder: Option<PathBuf>,
}

/// A license supplied by the user instead of being discovered.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ForcedLicense {
    pub expression: Option<String>,
    pub text: Option<String>,
    /// Path to a file holding the license text; takes precedence over `text`.
    pub file: Option<PathBuf>,
}

impl ForcedLicense {
    /// Whether this override replaces license text scanning entirely.
    pub fn forces_text(&self) -> bool {
        self.text.is_some() || self.file.is_some()
    }
}

/// A package added to the output by hand.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppendEntry {
    pub name: String,
    pub version: Option<String>,
    pub homepage: Option<String>,
    pub repository: Option<String>,
    #[serde(flatten)]
    pub license: ForcedLicense,
}

impl Options {
    /// Name filter shared by every discovery strategy and the resolver.
    pub fn accepts(&self, name: &str) -> bool {
        if !self.include.is_empty() && !self.include.iter().any(|n| n == name) {
            return false;
        }
        !self.exclude.iter().any(|n| n == name)
    }
}

/// Load options, searching in order:
///
/// 1. `config_override` — path passed via `--config` (JSON if it ends in `.json`, TOML otherwise)
/// 2. `<project_path>/.license-ripper/config.toml`
/// 3. `~/.config/license-ripper/config.toml`
/// 4. Built-in [`Options::default`]
pub fn load_config(project_path: &Path, config_override: Option<&Path>) -> Result<Options> {
    if let Some(path) = config_override {
        return read_options(path);
    }

    let project_config = project_path.join(".license-ripper").join("config.toml");
    if project_config.exists() {
        return read_options(&project_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home
            .join(".config")
            .join("license-ripper")
            .join("config.toml");
        if home_config.exists() {
            return read_options(&home_config);
        }
    }

    Ok(Options::default())
}

fn read_options(path: &Path) -> Result<Options> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;

    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let options = if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?
    } else {
        toml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?
    };

    Ok(options)
}
