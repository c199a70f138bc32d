use colored::*;

use crate::license::classifier::{merge_expressions, UNKNOWN};
use crate::license::expression::agrees_with_text;
use crate::models::{Output, ResolvedPackage};

/// A declared expression that the license texts do not back up.
#[derive(Debug, PartialEq)]
pub struct Mismatch<'a> {
    pub name: &'a str,
    pub declared: &'a str,
    pub resolved: String,
    /// Set when the declared expression could not be parsed.
    pub parse_error: Option<String>,
}

/// Print warnings, then errors, to stderr. Returns `true` when there were errors.
pub fn print(output: &Output) -> bool {
    let from_text = resolved_from_text(&output.resolved);
    if !from_text.is_empty() {
        warning(&format!(
            "resolved license expression from text:\n  {}",
            from_text.join("\n  ")
        ));
    }

    let mismatched = mismatches(&output.resolved);
    for mismatch in &mismatched {
        if let Some(reason) = &mismatch.parse_error {
            error(&format!(
                "failed to parse \"{}\" from {}:\n{}",
                mismatch.declared,
                mismatch.name.blue(),
                reason
            ));
        }
    }
    if !mismatched.is_empty() {
        let lines: Vec<String> = mismatched
            .iter()
            .map(|m| format!("{}: defined: \"{}\", resolved: \"{}\"", m.name.blue(), m.declared, m.resolved))
            .collect();
        warning(&format!(
            "mismatched license expression and text:\n  {}",
            lines.join("\n  ")
        ));
    }

    let errors = &output.errors;
    if !errors.invalid_license.is_empty() {
        error(&format!(
            "invalid license:\n  {}",
            errors.invalid_license.join("\n  ").blue()
        ));
    }
    if !errors.missing_license_text.is_empty() {
        error(&format!(
            "missing license text:\n  {}",
            errors.missing_license_text.join("\n  ").blue()
        ));
    }

    !errors.is_empty()
}

pub fn resolved_from_text(resolved: &[ResolvedPackage]) -> Vec<&str> {
    resolved
        .iter()
        .filter(|package| package.resolved_from_text())
        .map(|package| package.name.as_str())
        .collect()
}

/// Packages whose declared expression disagrees with the expression of their texts.
pub fn mismatches(resolved: &[ResolvedPackage]) -> Vec<Mismatch<'_>> {
    let mut found = Vec::new();

    for package in resolved {
        // derived from the texts, so it cannot disagree with them
        if package.resolved_from_text() {
            continue;
        }

        let declared = package.license_expression.as_str();
        if declared.starts_with("SEE LICENSE IN") {
            continue;
        }

        let resolved = merge_expressions(&package.licenses);
        let (agrees, parse_error) = if resolved.contains(UNKNOWN) {
            (false, None)
        } else {
            match agrees_with_text(declared, &resolved) {
                Ok(agrees) => (agrees, None),
                Err(e) => (false, Some(e.to_string())),
            }
        };

        if !agrees {
            found.push(Mismatch {
                name: &package.name,
                declared,
                resolved,
                parse_error,
            });
        }
    }

    found
}

fn warning(message: &str) {
    eprintln!("{}: {}", "warning".yellow(), message);
}

fn error(message: &str) {
    eprintln!("{}: {}", "error".red(), message);
}
