use std::collections::HashMap;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// The contents of a dependency's `package.json` that license resolution cares about.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub version: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub license: Option<LicenseField>,
    /// Legacy `licenses: [{ type, url }]` form still found in old packages.
    #[serde(default, deserialize_with = "lenient")]
    pub licenses: Option<Vec<LicenseObject>>,
    #[serde(default, deserialize_with = "lenient")]
    pub repository: Option<RepositoryField>,
    #[serde(default, deserialize_with = "lenient")]
    pub homepage: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub funding: Option<FundingField>,
    #[serde(default, deserialize_with = "lenient_map")]
    pub dependencies: HashMap<String, serde_json::Value>,
    #[serde(default, deserialize_with = "lenient_map")]
    pub optional_dependencies: HashMap<String, serde_json::Value>,
    #[serde(default, deserialize_with = "lenient_map")]
    pub peer_dependencies: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LicenseField {
    Id(String),
    Object(LicenseObject),
    List(Vec<LicenseObject>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct LicenseObject {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RepositoryField {
    Url(String),
    Object { url: Option<String> },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FundingField {
    One(FundingEntry),
    List(Vec<FundingEntry>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FundingEntry {
    Url(String),
    Object { url: Option<String> },
}

impl PackageMeta {
    /// Declared license(s) as a single expression; several declared licenses are joined with AND.
    pub fn declared_license(&self) -> Option<String> {
        let ids: Vec<&str> = match &self.license {
            Some(LicenseField::Id(id)) => vec![id.as_str()],
            Some(LicenseField::Object(obj)) => obj.kind.as_deref().into_iter().collect(),
            Some(LicenseField::List(list)) => list.iter().filter_map(|l| l.kind.as_deref()).collect(),
            None => self
                .licenses
                .iter()
                .flatten()
                .filter_map(|l| l.kind.as_deref())
                .collect(),
        };

        let ids: Vec<&str> = ids.into_iter().map(str::trim).filter(|id| !id.is_empty()).collect();

        match ids.as_slice() {
            [] => None,
            [one] => Some(one.to_string()),
            many => Some(format!("({})", many.join(" AND "))),
        }
    }

    pub fn repository_url(&self) -> Option<&str> {
        match self.repository.as_ref()? {
            RepositoryField::Url(url) => Some(url.as_str()),
            RepositoryField::Object { url } => url.as_deref(),
        }
    }

    /// Funding info flattened to a list of URLs, whatever shape `funding` had.
    pub fn funding_urls(&self) -> Vec<String> {
        let entries: Vec<&FundingEntry> = match &self.funding {
            Some(FundingField::One(entry)) => vec![entry],
            Some(FundingField::List(list)) => list.iter().collect(),
            None => Vec::new(),
        };

        entries
            .into_iter()
            .filter_map(|entry| match entry {
                FundingEntry::Url(url) => Some(url.clone()),
                FundingEntry::Object { url } => url.clone(),
            })
            .collect()
    }

    pub fn version_or_default(&self) -> String {
        self.version.clone().unwrap_or_default()
    }
}

/// A field that fails to deserialize is treated as absent instead of failing the whole manifest.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn lenient_map<'de, D>(deserializer: D) -> Result<HashMap<String, serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseSource {
    License,
    Readme,
    Notice,
    Forced,
}

impl std::fmt::Display for LicenseSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LicenseSource::License => write!(f, "license"),
            LicenseSource::Readme => write!(f, "readme"),
            LicenseSource::Notice => write!(f, "notice"),
            LicenseSource::Forced => write!(f, "forced"),
        }
    }
}

/// One piece of license text found for a package, with its classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLicense {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    pub source: LicenseSource,
    pub text: String,
}

impl ResolvedLicense {
    pub fn notice(text: String) -> Self {
        Self {
            expression: None,
            source: LicenseSource::Notice,
            text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPackage {
    pub name: String,
    pub version: String,
    pub path: PathBuf,
    /// Never empty; `UNKNOWN` when nothing could be resolved, `*`-suffixed when derived from text.
    pub license_expression: String,
    pub licenses: Vec<ResolvedLicense>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funding: Option<Vec<String>>,
}

impl ResolvedPackage {
    pub fn resolved_from_text(&self) -> bool {
        self.license_expression.ends_with('*')
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorManifest {
    pub missing_license_text: Vec<String>,
    pub invalid_license: Vec<String>,
}

impl ErrorManifest {
    pub fn is_empty(&self) -> bool {
        self.missing_license_text.is_empty() && self.invalid_license.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Output {
    pub resolved: Vec<ResolvedPackage>,
    pub errors: ErrorManifest,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> PackageMeta {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_declared_license_shapes() {
        assert_eq!(
            parse(r#"{"name":"a","license":"MIT"}"#).declared_license().as_deref(),
            Some("MIT")
        );
        assert_eq!(
            parse(r#"{"name":"a","license":{"type":"ISC","url":"x"}}"#)
                .declared_license()
                .as_deref(),
            Some("ISC")
        );
        assert_eq!(
            parse(r#"{"name":"a","license":[{"type":"MIT"},{"type":"Apache-2.0"}]}"#)
                .declared_license()
                .as_deref(),
            Some("(MIT AND Apache-2.0)")
        );
        assert_eq!(
            parse(r#"{"name":"a","licenses":[{"type":"BSD-3-Clause"}]}"#)
                .declared_license()
                .as_deref(),
            Some("BSD-3-Clause")
        );
        assert_eq!(parse(r#"{"name":"a"}"#).declared_license(), None);
    }

    #[test]
    fn test_funding_shapes() {
        assert_eq!(
            parse(r#"{"name":"a","funding":"https://hello"}"#).funding_urls(),
            vec!["https://hello"]
        );
        assert_eq!(
            parse(r#"{"name":"a","funding":{"type":"x","url":"https://hello"}}"#).funding_urls(),
            vec!["https://hello"]
        );
        assert_eq!(
            parse(r#"{"name":"a","funding":["https://hello",{"url":"https://world"}]}"#)
                .funding_urls(),
            vec!["https://hello", "https://world"]
        );
    }

    #[test]
    fn test_malformed_optional_fields_are_ignored() {
        let meta = parse(r#"{"name":"a","homepage":42,"dependencies":"nope","version":"1.0.0"}"#);
        assert_eq!(meta.homepage, None);
        assert!(meta.dependencies.is_empty());
        assert_eq!(meta.version.as_deref(), Some("1.0.0"));
    }

    #[test]
    fn test_repository_shapes() {
        assert_eq!(
            parse(r#"{"name":"a","repository":"foo/bar"}"#).repository_url(),
            Some("foo/bar")
        );
        assert_eq!(
            parse(r#"{"name":"a","repository":{"type":"git","url":"git+https://github.com/foo/bar.git"}}"#)
                .repository_url(),
            Some("git+https://github.com/foo/bar.git")
        );
    }
}
