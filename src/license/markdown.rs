use pulldown_cmark::{Event, Parser, Tag, TagEnd};

/// Extract the license section(s) of a readme.
///
/// A heading mentioning "license"/"licence" opens a section at its depth; the
/// section keeps the raw markdown of the heading and everything nested under
/// it until a heading at the same or a shallower depth that is not itself a
/// license heading. Later license headings open further sections, and the
/// result is every captured region concatenated.
pub fn license_section(readme: &str) -> Option<String> {
    let mut regions: Vec<&str> = Vec::new();
    // (depth, byte offset) of the open section
    let mut open: Option<(usize, usize)> = None;
    // (depth, byte offset, collected title) of the heading being read
    let mut heading: Option<(usize, usize, String)> = None;

    for (event, range) in Parser::new(readme).into_offset_iter() {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                heading = Some((level as usize, range.start, String::new()));
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, _, title)) = heading.as_mut() {
                    title.push_str(&text);
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                let Some((depth, start, title)) = heading.take() else {
                    continue;
                };

                if is_license_title(&title) {
                    open = match open {
                        Some((open_depth, open_start)) => Some((open_depth.min(depth), open_start)),
                        None => Some((depth, start)),
                    };
                } else if let Some((open_depth, open_start)) = open {
                    if depth <= open_depth {
                        regions.push(&readme[open_start..start]);
                        open = None;
                    }
                }
            }
            _ => {}
        }
    }

    if let Some((_, open_start)) = open {
        regions.push(&readme[open_start..]);
    }

    let text = regions.concat();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

fn is_license_title(title: &str) -> bool {
    let lower = title.to_lowercase();
    lower.contains("licens") || lower.contains("licenc")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::license::classifier::{classify_text, corpus};

    #[test]
    fn test_section_until_sibling_heading() {
        let readme = "# brorand\n\nRandom number generator.\n\n## LICENSE\n\nThis software is licensed under the MIT License.\n\n### Details\n\nMore.\n\n## Contributing\n\nPRs welcome.\n";
        let section = license_section(readme).unwrap();
        assert!(section.starts_with("## LICENSE"));
        assert!(section.contains("### Details"));
        assert!(!section.contains("Contributing"));
    }

    #[test]
    fn test_section_runs_to_end_of_document() {
        let readme = format!("# errno\n\nSomething.\n\n## License\n\n{}", corpus::MIT);
        let section = license_section(&readme).unwrap();
        assert_eq!(classify_text(&section), "MIT");
    }

    #[test]
    fn test_shallower_heading_closes_section() {
        let readme = "## Licence\n\nISC\n\n# Next\n\nother\n";
        let section = license_section(readme).unwrap();
        assert_eq!(section, "## Licence\n\nISC\n\n");
    }

    #[test]
    fn test_multiple_disjoint_sections() {
        let readme = "## License\n\nfirst\n\n## Usage\n\nnope\n\n## License (docs)\n\nsecond\n";
        let section = license_section(readme).unwrap();
        assert!(section.contains("first"));
        assert!(section.contains("second"));
        assert!(!section.contains("nope"));
    }

    #[test]
    fn test_setext_heading() {
        let readme = "Title\n=====\n\nLicense\n-------\n\nMIT\n";
        let section = license_section(readme).unwrap();
        assert!(section.starts_with("License\n-------"));
    }

    #[test]
    fn test_no_license_heading() {
        assert_eq!(license_section("# Title\n\nThis is MIT licensed.\n"), None);
        assert_eq!(license_section(""), None);
    }
}
