use super::expression::{tokenize, Token};

/// SPDX identifiers accepted as-is (compared case-insensitively).
///
/// Deprecated identifiers such as `GPL-3.0` are listed on purpose: a declared
/// license is corrected, never upgraded to `-only` / `-or-later`.
const KNOWN_IDS: &[&str] = &[
    "0BSD",
    "AFL-1.1",
    "AFL-1.2",
    "AFL-2.0",
    "AFL-2.1",
    "AFL-3.0",
    "AGPL-1.0",
    "AGPL-3.0",
    "AGPL-3.0-only",
    "AGPL-3.0-or-later",
    "Apache-1.0",
    "Apache-1.1",
    "Apache-2.0",
    "APSL-2.0",
    "Artistic-1.0",
    "Artistic-2.0",
    "BlueOak-1.0.0",
    "BSD-1-Clause",
    "BSD-2-Clause",
    "BSD-3-Clause",
    "BSD-4-Clause",
    "BSL-1.0",
    "CC-BY-3.0",
    "CC-BY-4.0",
    "CC-BY-SA-4.0",
    "CC0-1.0",
    "CDDL-1.0",
    "CDDL-1.1",
    "EPL-1.0",
    "EPL-2.0",
    "EUPL-1.1",
    "EUPL-1.2",
    "GPL-2.0",
    "GPL-2.0-only",
    "GPL-2.0-or-later",
    "GPL-3.0",
    "GPL-3.0-only",
    "GPL-3.0-or-later",
    "ISC",
    "LGPL-2.0",
    "LGPL-2.0-only",
    "LGPL-2.0-or-later",
    "LGPL-2.1",
    "LGPL-2.1-only",
    "LGPL-2.1-or-later",
    "LGPL-3.0",
    "LGPL-3.0-only",
    "LGPL-3.0-or-later",
    "MIT",
    "MIT-0",
    "MPL-1.1",
    "MPL-2.0",
    "OFL-1.1",
    "OSL-3.0",
    "PSF-2.0",
    "Python-2.0",
    "Unlicense",
    "UPL-1.0",
    "WTFPL",
    "X11",
    "Zlib",
];

/// Correct a declared license string to SPDX spelling.
///
/// Tolerates case differences and the common free-form spellings seen in
/// `package.json` files. Compound expressions are corrected identifier by
/// identifier. Anything that cannot be corrected is returned unchanged.
pub fn correct(raw: &str) -> String {
    let trimmed = raw.trim();

    if trimmed.is_empty() || trimmed.to_uppercase().starts_with("SEE LICENSE IN") {
        return trimmed.to_string();
    }

    if let Some(id) = correct_single(trimmed) {
        return id;
    }

    let tokens = tokenize(trimmed);
    let is_compound = tokens
        .iter()
        .any(|t| matches!(t, Token::And | Token::Or | Token::With | Token::LParen));
    if !is_compound {
        return trimmed.to_string();
    }

    let mut out = String::new();
    for token in tokens {
        match token {
            Token::LParen => {
                push_spaced(&mut out, "(");
            }
            Token::RParen => out.push(')'),
            Token::And => push_spaced(&mut out, "AND"),
            Token::Or => push_spaced(&mut out, "OR"),
            Token::With => push_spaced(&mut out, "WITH"),
            Token::Id(id) => {
                let fixed = correct_single(&id).unwrap_or(id);
                push_spaced(&mut out, &fixed);
            }
        }
    }
    out
}

fn push_spaced(out: &mut String, word: &str) {
    if !out.is_empty() && !out.ends_with('(') {
        out.push(' ');
    }
    out.push_str(word);
}

fn correct_single(raw: &str) -> Option<String> {
    if let Some(id) = KNOWN_IDS.iter().find(|id| id.eq_ignore_ascii_case(raw)) {
        return Some(id.to_string());
    }

    normalize(raw).map(str::to_string)
}

/// Map common non-SPDX spellings to their SPDX equivalents.
fn normalize(raw: &str) -> Option<&'static str> {
    let lower = raw.trim().to_lowercase();
    let id = match lower.as_str() {
        "apache 2.0" | "apache2" | "apache 2" | "apache-2" | "apache license 2.0"
        | "apache license, version 2.0" | "apache license version 2.0" | "apache v2" => {
            "Apache-2.0"
        }
        "mit license" | "the mit license" | "mit/x11" | "expat" => "MIT",
        "bsd" | "bsd license" | "new bsd" | "modified bsd" | "bsd 3-clause" | "bsd-3"
        | "bsd3" => "BSD-3-Clause",
        "bsd 2-clause" | "simplified bsd" | "freebsd" | "bsd-2" | "bsd2" => "BSD-2-Clause",
        "gnu gpl v2" | "gnu general public license v2" | "gpl v2" | "gplv2" | "gpl-2" | "gpl2" => {
            "GPL-2.0"
        }
        "gnu gpl v3" | "gnu general public license v3" | "gpl v3" | "gplv3" | "gpl-3" | "gpl3" => {
            "GPL-3.0"
        }
        "gnu lgpl v2.1" | "lgpl v2.1" | "lgplv2.1" | "lgpl-2.1+" => "LGPL-2.1",
        "gnu lgpl v3" | "lgpl v3" | "lgplv3" | "lgpl-3" => "LGPL-3.0",
        "mozilla public license 2.0" | "mpl 2.0" | "mplv2" | "mpl-2" => "MPL-2.0",
        "isc license" => "ISC",
        "cc0" | "public domain" | "cc0 1.0" => "CC0-1.0",
        "agpl v3" | "agplv3" | "gnu agpl v3" => "AGPL-3.0",
        "unlicence" | "the unlicense" => "Unlicense",
        "zlib license" => "Zlib",
        "wtfpl v2" => "WTFPL",
        _ => return None,
    };
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_ids_pass_through() {
        assert_eq!(correct("MIT"), "MIT");
        assert_eq!(correct("Apache-2.0"), "Apache-2.0");
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(correct("mit"), "MIT");
        assert_eq!(correct("apache-2.0"), "Apache-2.0");
        assert_eq!(correct("bsd-3-clause"), "BSD-3-Clause");
    }

    #[test]
    fn test_common_spellings() {
        assert_eq!(correct("MIT License"), "MIT");
        assert_eq!(correct("Apache License 2.0"), "Apache-2.0");
        assert_eq!(correct("GPLv3"), "GPL-3.0");
        assert_eq!(correct("BSD"), "BSD-3-Clause");
    }

    #[test]
    fn test_deprecated_ids_are_not_upgraded() {
        assert_eq!(correct("GPL-3.0"), "GPL-3.0");
        assert_eq!(correct("LGPL-2.1"), "LGPL-2.1");
    }

    #[test]
    fn test_compound_expressions() {
        assert_eq!(correct("(mit OR apache-2.0)"), "(MIT OR Apache-2.0)");
        assert_eq!(correct("MIT AND isc"), "MIT AND ISC");
        assert_eq!(
            correct("gpl-2.0 WITH Classpath-exception-2.0"),
            "GPL-2.0 WITH Classpath-exception-2.0"
        );
    }

    #[test]
    fn test_uncorrectable_passes_through() {
        assert_eq!(correct("SEE LICENSE IN LICENSE.md"), "SEE LICENSE IN LICENSE.md");
        assert_eq!(correct("UNLICENSED"), "UNLICENSED");
        assert_eq!(correct("My Custom License"), "My Custom License");
    }
}
