use crate::models::{LicenseSource, ResolvedLicense};

pub const UNKNOWN: &str = "UNKNOWN";

/// A license family recognised by the presence of its defining phrases.
struct Family {
    id: &'static str,
    /// Any of these appearing anywhere is enough.
    links: &'static [&'static str],
    /// Every one of these must appear, in this order.
    phrases: &'static [&'static str],
}

const AFL_3: Family = Family {
    id: "AFL-3.0",
    links: &[],
    phrases: &["Licensed under the Academic Free License version 3.0"],
};

const AFL_2_1: Family = Family {
    id: "AFL-2.1",
    links: &[],
    phrases: &["Licensed under the Academic Free License version 2.1"],
};

const APACHE_2: Family = Family {
    id: "Apache-2.0",
    links: &["http://www.apache.org/licenses/LICENSE-2.0"],
    phrases: &[
        "Apache License Version 2.0, January 2004 http://www.apache.org/licenses/",
        "You must give any other recipients of the Work or Derivative Works a copy of this License",
        "You must cause any modified files to carry prominent notices stating that You changed the files",
        "You must retain, in the Source form of any Derivative Works that You distribute, all copyright, patent, trademark, and attribution notices from the Source form of the Work",
        "If the Work includes a \"NOTICE\" text file as part of its distribution,",
    ],
};

const BSD_0: Family = Family {
    id: "0BSD",
    links: &[],
    phrases: &["Permission to use, copy, modify, and/or distribute this software for any purpose with or without fee is hereby granted. THE SOFTWARE IS PROVIDED"],
};

const BLUE_OAK: Family = Family {
    id: "BlueOak-1.0.0",
    links: &["https://blueoakcouncil.org/license/1.0.0"],
    phrases: &["Blue Oak Model License", "Version 1.0.0"],
};

const CC0: Family = Family {
    id: "CC0-1.0",
    links: &["https://creativecommons.org/publicdomain/zero/1.0/deed"],
    phrases: &["Affirmer understands and acknowledges that Creative Commons is not a party to this document and has no duty or obligation with respect to this CC0 or use of the Work."],
};

const CC_BY_3: Family = Family {
    id: "CC-BY-3.0",
    links: &["http://spdx.org/licenses/CC-BY-3.0"],
    phrases: &[],
};

const CC_BY_4: Family = Family {
    id: "CC-BY-4.0",
    links: &[],
    phrases: &["Creative Commons Attribution 4.0 International Public License By exercising the Licensed Rights (defined below), You accept and agree to be bound by the terms and conditions of this Creative Commons Attribution 4.0 International Public License (\"Public License\"). To the"],
};

const EUPL_1_1: Family = Family {
    id: "EUPL-1.1",
    links: &[],
    phrases: &["Licensed under the EUPL V.1.1"],
};

const EUPL_1_2: Family = Family {
    id: "EUPL-1.2",
    links: &[],
    phrases: &["EUROPEAN UNION PUBLIC LICENCE v. 1.2"],
};

const GPL_3: Family = Family {
    id: "GPL-3.0-only",
    links: &[],
    phrases: &["\"This License\" refers to version 3 of the GNU General Public License."],
};

const LGPL_3: Family = Family {
    id: "LGPL-3.0-only",
    links: &[],
    phrases: &["\"this License\" refers to version 3 of the GNU Lesser General Public License"],
};

const LGPL_2_1: Family = Family {
    id: "LGPL-2.1-only",
    links: &[],
    phrases: &["[This is the first released version of the Lesser GPL. It also counts as the successor of the GNU Library Public License, version 2, hence the version number 2.1.]"],
};

const ISC: Family = Family {
    id: "ISC",
    links: &[],
    phrases: &["Permission to use, copy, modify, and/or distribute this software for any purpose with or without fee is hereby granted, provided that the above copyright notice and this permission notice appear in all copies."],
};

const MIT: Family = Family {
    id: "MIT",
    links: &[
        "http://www.opensource.org/licenses/mit-license.php",
        "http://opensource.org/licenses/MIT",
    ],
    // "sub" + "license" covers both `sublicense` and `sub-license`
    phrases: &[
        "Permission is hereby granted, free of charge,",
        "obtaining",
        "software",
        "documentation",
        "use",
        "copy",
        "modify",
        "merge",
        "publish",
        "distribute",
        "sub",
        "license",
        "sell",
        "The above copyright notice and this permission notice",
    ],
};

const MPL_2: Family = Family {
    id: "MPL-2.0",
    links: &["http://mozilla.org/MPL/2.0/", "https://mozilla.org/MPL/2.0/"],
    phrases: &["Mozilla Public License Version 2.0", "Definitions"],
};

const UNLICENSE: Family = Family {
    id: "Unlicense",
    links: &[],
    phrases: &["This is free and unencumbered software released into the public domain."],
};

const WTFPL: Family = Family {
    id: "WTFPL",
    links: &[],
    phrases: &["DO WHAT THE FUCK YOU WANT TO PUBLIC LICENSE", "You just DO WHAT THE FUCK YOU WANT TO."],
};

const ZLIB: Family = Family {
    id: "Zlib",
    links: &[],
    phrases: &[
        "Permission is granted to anyone to use this software for any purpose, including commercial applications, and to alter it and redistribute it freely, subject to the following restrictions:",
        "The origin of this software must not be misrepresented; you must not claim that you wrote the original software. If you use this software in a product, an acknowledgment in the product documentation would be appreciated but is not required.",
        "Altered source versions must be plainly marked as such, and must not be misrepresented as being the original software.",
        "This notice may not be removed or altered from any source distribution.",
    ],
};

// `of this software` sits between the first two phrases in some variants and not others
const BSD_BASE: &[&str] = &[
    "Redistribution and use",
    "in source and binary forms, with or without modification, are permitted provided that the following conditions are met:",
    "Redistributions of source code must retain the above copyright notice, this list of conditions and the following disclaimer.",
];
const BSD_CLAUSE_2: &[&str] = &["Redistributions in binary form must reproduce the above copyright notice, this list of conditions and the following disclaimer in the documentation and/or other materials provided with the distribution."];
const BSD_CLAUSE_3: &[&str] = &["endorse or promote"];

/// Classify raw license text into an SPDX identifier or a `(A AND B)` expression.
///
/// Every family is tested independently, so dual-licensed text yields a
/// compound expression. Returns [`UNKNOWN`] when nothing matches.
pub fn classify_text(text: &str) -> String {
    let text = collapse_whitespace(text);
    let mut matches: Vec<&str> = Vec::new();

    if matches_family(&text, &AFL_3) {
        matches.push(AFL_3.id);
    } else if matches_family(&text, &AFL_2_1) {
        matches.push(AFL_2_1.id);
    }

    for family in [&APACHE_2, &BSD_0] {
        if matches_family(&text, family) {
            matches.push(family.id);
        }
    }

    if includes_sequential(&text, BSD_BASE) {
        if includes_sequential(&text, BSD_CLAUSE_3) {
            matches.push("BSD-3-Clause");
        } else if includes_sequential(&text, BSD_CLAUSE_2) {
            matches.push("BSD-2-Clause");
        } else {
            matches.push("BSD-1-Clause");
        }
    }

    for family in [&BLUE_OAK, &CC0, &CC_BY_3, &CC_BY_4, &EUPL_1_1, &EUPL_1_2] {
        if matches_family(&text, family) {
            matches.push(family.id);
        }
    }

    // the GNU family texts quote each other, only the most specific marker counts
    if let Some(family) = [&GPL_3, &LGPL_3, &LGPL_2_1]
        .into_iter()
        .find(|family| matches_family(&text, family))
    {
        matches.push(family.id);
    }

    for family in [&ISC, &MIT, &MPL_2, &UNLICENSE, &WTFPL, &ZLIB] {
        if matches_family(&text, family) {
            matches.push(family.id);
        }
    }

    join_and(&matches)
}

/// Merge the expressions of a package's license entries into one expression.
///
/// Notices carry no expression and are skipped, as are readme entries that
/// classified as `UNKNOWN` (usually a bare mention such as "MIT" with no text).
/// Compound `(A AND B)` expressions are flattened before deduplication.
pub fn merge_expressions(licenses: &[ResolvedLicense]) -> String {
    let mut identifiers: Vec<&str> = Vec::new();

    for license in licenses {
        let Some(expression) = license.expression.as_deref() else {
            continue;
        };

        if license.source == LicenseSource::Readme && expression == UNKNOWN {
            continue;
        }

        for identifier in split_and(expression) {
            if !identifiers.contains(&identifier) {
                identifiers.push(identifier);
            }
        }
    }

    join_and(&identifiers)
}

/// The constituents of an expression produced by [`join_and`].
pub fn split_and(expression: &str) -> Vec<&str> {
    match expression
        .strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
    {
        Some(inner) => inner.split(" AND ").map(str::trim).collect(),
        None => vec![expression],
    }
}

/// Zero ids is `UNKNOWN`, one is itself, several are `(A AND B ...)`.
fn join_and(identifiers: &[&str]) -> String {
    match identifiers {
        [] => UNKNOWN.to_string(),
        [one] => one.to_string(),
        many => format!("({})", many.join(" AND ")),
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn matches_family(text: &str, family: &Family) -> bool {
    family.links.iter().any(|link| text.contains(link))
        || (!family.phrases.is_empty() && includes_sequential(text, family.phrases))
}

/// Every phrase occurs in order; each search starts where the previous match ended.
fn includes_sequential(text: &str, phrases: &[&str]) -> bool {
    let mut offset = 0;

    for phrase in phrases {
        match text[offset..].find(phrase) {
            Some(index) => offset += index + phrase.len(),
            None => return false,
        }
    }

    true
}


#[cfg(test)]
mod tests {
    use super::corpus;
    use super::*;

    fn license(expression: &str, source: LicenseSource) -> ResolvedLicense {
        ResolvedLicense {
            expression: Some(expression.to_string()),
            source,
            text: String::new(),
        }
    }

    #[test]
    fn test_canonical_texts() {
        let cases = [
            (corpus::ZERO_BSD, "0BSD"),
            (corpus::AFL_2_1, "AFL-2.1"),
            (corpus::APACHE_2, "Apache-2.0"),
            (corpus::BLUE_OAK, "BlueOak-1.0.0"),
            (corpus::BSD_1, "BSD-1-Clause"),
            (corpus::BSD_2, "BSD-2-Clause"),
            (corpus::BSD_3, "BSD-3-Clause"),
            (corpus::CC0, "CC0-1.0"),
            (corpus::CC_BY_3, "CC-BY-3.0"),
            (corpus::CC_BY_4, "CC-BY-4.0"),
            (corpus::EUPL_1_1, "EUPL-1.1"),
            (corpus::GPL_3, "GPL-3.0-only"),
            (corpus::ISC, "ISC"),
            (corpus::LGPL_2_1, "LGPL-2.1-only"),
            (corpus::LGPL_3, "LGPL-3.0-only"),
            (corpus::MIT, "MIT"),
            (corpus::MPL_2, "MPL-2.0"),
            (corpus::UNLICENSE, "Unlicense"),
            (corpus::WTFPL, "WTFPL"),
            (corpus::ZLIB, "Zlib"),
        ];

        for (text, expected) in cases {
            assert_eq!(classify_text(text), expected, "expected {}", expected);
        }
    }

    #[test]
    fn test_dual_license_is_joined_with_and() {
        let forward = classify_text(&format!("{}\n\n{}", corpus::MIT, corpus::APACHE_2));
        let backward = classify_text(&format!("{}\n\n{}", corpus::APACHE_2, corpus::MIT));

        assert_eq!(forward, "(Apache-2.0 AND MIT)");
        let mut a = split_and(&forward);
        let mut b = split_and(&backward);
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unknown() {
        assert_eq!(classify_text(""), UNKNOWN);
        assert_eq!(
            classify_text("This package does things with strings. Contributions welcome."),
            UNKNOWN
        );
        assert_eq!(classify_text("MIT"), UNKNOWN);
    }

    #[test]
    fn test_phrases_must_appear_in_order() {
        let shuffled = "The above copyright notice and this permission notice shall be included.
Permission is hereby granted, free of charge, to any person obtaining a copy of this
software and associated documentation files, to use, copy, modify, merge, publish,
distribute, sublicense, and/or sell copies.";
        assert_eq!(classify_text(shuffled), UNKNOWN);
    }

    #[test]
    fn test_whitespace_is_normalized() {
        let wrapped = corpus::ISC.replace(' ', "\r\n  ");
        assert_eq!(classify_text(&wrapped), "ISC");
    }

    #[test]
    fn test_merge_empty() {
        assert_eq!(merge_expressions(&[]), UNKNOWN);
    }

    #[test]
    fn test_merge_single() {
        assert_eq!(merge_expressions(&[license("MIT", LicenseSource::License)]), "MIT");
    }

    #[test]
    fn test_merge_dedups_compound() {
        let licenses = [
            license("(MIT AND ISC)", LicenseSource::License),
            license("MIT", LicenseSource::License),
        ];
        assert_eq!(merge_expressions(&licenses), "(MIT AND ISC)");
    }

    #[test]
    fn test_merge_skips_unknown_readme_and_notice() {
        let licenses = [
            ResolvedLicense::notice("Copyright notice".to_string()),
            license("Apache-2.0", LicenseSource::License),
            license(UNKNOWN, LicenseSource::Readme),
        ];
        assert_eq!(merge_expressions(&licenses), "Apache-2.0");

        // an UNKNOWN license file is still reported
        let licenses = [
            license(UNKNOWN, LicenseSource::License),
            license("MIT", LicenseSource::Readme),
        ];
        assert_eq!(merge_expressions(&licenses), "(UNKNOWN AND MIT)");
    }
}
