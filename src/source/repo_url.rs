//! Repository URL normalization.
//!
//! `package.json` repository fields come in many shapes (`git+ssh://`,
//! `git@host:`, `github:` shorthand, bare `owner/repo`). Remote lookups and
//! cache keys both need one canonical `https://host/owner/repo` form.

/// Normalize a repository URL to an `https://` URL of the repository root.
///
/// Returns `None` for an empty input.
pub fn normalize_repo_url(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let mut url = if let Some(rest) = raw.strip_prefix("git://") {
        format!("https://{}", rest)
    } else if let Some(rest) = raw.strip_prefix("git@") {
        // git@github.com:owner/repo.git
        format!("https://{}", rest.replacen(':', "/", 1))
    } else if let Some(rest) = raw.strip_prefix("git+") {
        match rest.strip_prefix("ssh://") {
            Some(ssh) => format!("https://{}", strip_credentials(ssh)),
            None => rest.to_string(),
        }
    } else if let Some(ssh) = raw.strip_prefix("ssh://") {
        format!("https://{}", strip_credentials(ssh))
    } else if let Some(rest) = raw.strip_prefix("github:") {
        format!("https://github.com/{}", rest)
    } else if let Some(rest) = raw.strip_prefix("gitlab:") {
        format!("https://gitlab.com/{}", rest)
    } else if let Some(rest) = raw.strip_prefix("bitbucket:") {
        format!("https://bitbucket.org/{}", rest)
    } else if !raw.starts_with("http") && !raw.contains("://") {
        // bare owner/repo means GitHub
        format!("https://github.com/{}", raw)
    } else {
        raw.to_string()
    };

    url = url.replacen("://www.", "://", 1);
    if let Some(rest) = url.strip_prefix("http://") {
        url = format!("https://{}", rest);
    }

    if url.starts_with("https://github.com/") || url.starts_with("https://gitlab.com/") {
        if let Some(index) = url.find(|c: char| c == '#' || c == '?') {
            url.truncate(index);
        }

        // license files live at the repository root; deeper paths only cost extra API calls
        if let Some(index) = nth_index_of(&url, '/', 4) {
            url.truncate(index);
        }

        if let Some(stripped) = url.strip_suffix(".git") {
            url = stripped.to_string();
        }
    }

    Some(url)
}

/// Drop a `user@` or `user:password@` prefix from the authority of an ssh URL.
fn strip_credentials(rest: &str) -> &str {
    let authority_end = rest.find('/').unwrap_or(rest.len());
    match rest[..authority_end].rfind('@') {
        Some(at) => &rest[at + 1..],
        None => rest,
    }
}

/// Byte index of the `n`th (0-based) occurrence of `needle`.
fn nth_index_of(text: &str, needle: char, n: usize) -> Option<usize> {
    text.match_indices(needle).nth(n).map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(url: &str) -> String {
        normalize_repo_url(url).unwrap()
    }

    #[test]
    fn test_already_canonical() {
        assert_eq!(norm("https://github.com/foo/bar"), "https://github.com/foo/bar");
    }

    #[test]
    fn test_git_prefixes() {
        assert_eq!(norm("git://github.com/foo/bar.git"), "https://github.com/foo/bar");
        assert_eq!(norm("git+https://github.com/foo/bar.git"), "https://github.com/foo/bar");
        assert_eq!(norm("git@github.com:foo/bar.git"), "https://github.com/foo/bar");
        assert_eq!(norm("git@gitlab.com:foo/bar.git"), "https://gitlab.com/foo/bar");
    }

    #[test]
    fn test_ssh_credentials_are_stripped() {
        assert_eq!(norm("git+ssh://git@github.com/foo/bar.git"), "https://github.com/foo/bar");
        assert_eq!(norm("ssh://github.com/foo/bar"), "https://github.com/foo/bar");
    }

    #[test]
    fn test_shorthands() {
        assert_eq!(norm("github:foo/bar"), "https://github.com/foo/bar");
        assert_eq!(norm("gitlab:foo/bar"), "https://gitlab.com/foo/bar");
        assert_eq!(norm("bitbucket:foo/bar"), "https://bitbucket.org/foo/bar");
        assert_eq!(norm("foo/bar"), "https://github.com/foo/bar");
    }

    #[test]
    fn test_truncates_to_repository_root() {
        assert_eq!(
            norm("https://github.com/babel/babel/tree/main/packages/babel-core"),
            "https://github.com/babel/babel"
        );
        assert_eq!(norm("https://www.github.com/foo/bar#readme"), "https://github.com/foo/bar");
        assert_eq!(norm("http://github.com/foo/bar"), "https://github.com/foo/bar");
    }

    #[test]
    fn test_other_hosts_are_left_alone() {
        assert_eq!(
            norm("https://example.com/a/b/c/d.git"),
            "https://example.com/a/b/c/d.git"
        );
    }

    #[test]
    fn test_empty() {
        assert_eq!(normalize_repo_url("  "), None);
    }
}
