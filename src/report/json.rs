use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::models::ResolvedPackage;

/// Resolved packages with every distinct license text stored once.
///
/// A package's `licenses[].text` holds the key of its text in `license_text`.
/// Keys are `name@version/index` of the first package carrying that text.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressedReport {
    pub license_text: BTreeMap<String, String>,
    pub packages: Vec<ResolvedPackage>,
}

pub fn compress(resolved: &[ResolvedPackage]) -> CompressedReport {
    let mut license_text = BTreeMap::new();
    let mut key_by_text: HashMap<&str, String> = HashMap::new();
    let mut packages = Vec::with_capacity(resolved.len());

    for package in resolved {
        let mut compressed = package.clone();

        for (i, license) in compressed.licenses.iter_mut().enumerate() {
            let original = package.licenses[i].text.as_str();
            let key = key_by_text
                .entry(original)
                .or_insert_with(|| {
                    let base = format!("{}@{}/{}", package.name, package.version, i);
                    let key = unused_key(&license_text, base);
                    license_text.insert(key.clone(), original.to_string());
                    key
                })
                .clone();
            license.text = key;
        }

        packages.push(compressed);
    }

    CompressedReport {
        license_text,
        packages,
    }
}

/// `base`, or `base~2`, `base~3`... when two entries share a name and version.
fn unused_key(taken: &BTreeMap<String, String>, base: String) -> String {
    let mut key = base.clone();
    let mut n = 1;
    while taken.contains_key(&key) {
        n += 1;
        key = format!("{}~{}", base, n);
    }
    key
}

/// Number of packages per license expression.
pub fn summary(resolved: &[ResolvedPackage]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for package in resolved {
        *counts.entry(package.license_expression.clone()).or_insert(0) += 1;
    }
    counts
}

/// Pretty JSON to stdout, or compact JSON to `output`.
pub fn write<T: Serialize>(report: &T, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let json = serde_json::to_string(report)?;
            std::fs::write(path, json)
                .with_context(|| format!("failed to write report to {}", path.display()))?;
        }
        None => println!("{}", serde_json::to_string_pretty(report)?),
    }
    Ok(())
}
