//! Dotted-numeric version comparison used when collapsing duplicate installs.

/// Split a version string into its numeric components.
///
/// Each component contributes its leading digits, so `3-beta.1` yields `3`;
/// components without any leading digit count as `0`.
pub fn parse_version(version: &str) -> Vec<u64> {
    if version.trim().is_empty() {
        return Vec::new();
    }

    version
        .trim()
        .trim_start_matches('v')
        .split('.')
        .map(|part| {
            let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse().unwrap_or(0)
        })
        .collect()
}

/// `true` only when `sample` is strictly newer than `against`.
///
/// Components are compared pairwise up to the shorter length; missing trailing
/// components never make a version newer.
pub fn is_newer(sample: &[u64], against: &[u64]) -> bool {
    for (a, b) in sample.iter().zip(against) {
        if a > b {
            return true;
        }
        if a < b {
            return false;
        }
    }

    false
}
