use crate::license::classifier::classify_text;
use crate::license::markdown::license_section;
use crate::models::{LicenseSource, ResolvedLicense};
use crate::source::DirectorySource;

/// Collect license texts from the root of a directory source.
///
/// Notices come first, then license files, then the license section of the
/// last readme that has one.
pub async fn licenses_from_source(source: &dyn DirectorySource) -> Vec<ResolvedLicense> {
    let mut notices = Vec::new();
    let mut licenses = Vec::new();
    let mut readme: Option<ResolvedLicense> = None;

    for entry in source.read_dir().await {
        let lowercase = entry.to_lowercase();

        if lowercase.contains("notice") {
            if let Some(text) = source.read_file(&entry).await {
                notices.push(ResolvedLicense::notice(text));
            }
            continue;
        }

        if lowercase.contains("license")
            || lowercase.contains("licence")
            || lowercase.contains("copying")
        {
            if let Some(text) = source.read_file(&entry).await {
                licenses.push(ResolvedLicense {
                    expression: Some(classify_text(&text)),
                    source: LicenseSource::License,
                    text,
                });
            }
            continue;
        }

        if lowercase.starts_with("readme") {
            let section = source
                .read_file(&entry)
                .await
                .and_then(|text| license_section(&text));

            if let Some(text) = section {
                readme = Some(ResolvedLicense {
                    expression: Some(classify_text(&text)),
                    source: LicenseSource::Readme,
                    text,
                });
            }
        }
    }

    notices.extend(licenses);
    notices.extend(readme);
    notices
}
