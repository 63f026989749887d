//! Org-style outline parser
//!
//! Headings are lines starting with one or more `*` followed by a space.
//! File keywords `#+CATEGORY:`, `#+FILETAGS:` and `#+TODO:` are honoured;
//! lines inside `#+BEGIN_...`/`#+END_...` blocks never start headings.

use super::{build_outline, lines_in, parse_tag_list, FileSettings, OutlineParser, RawHeading, TodoKeywords};
use crate::error::ParseError;
use crate::heading::Outline;

/// Org outline parser
#[derive(Debug, Clone, Copy, Default)]
pub struct OrgParser;

impl OrgParser {
    /// Create new org parser
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn keyword(line: &str) -> Option<(String, &str)> {
        let rest = line.trim_start().strip_prefix("#+")?;
        let (key, value) = rest.split_once(':')?;
        Some((key.to_ascii_uppercase(), value.trim()))
    }

    fn heading_level(line: &str) -> Option<usize> {
        let stars = line.bytes().take_while(|&b| b == b'*').count();
        if stars == 0 {
            return None;
        }
        match line.as_bytes().get(stars) {
            Some(b' ' | b'\t') | None => Some(stars),
            _ => None,
        }
    }
}

impl OutlineParser for OrgParser {
    fn parse(&self, text: &str) -> Result<Outline, ParseError> {
        let mut settings = FileSettings::default();
        let mut raw = Vec::new();
        let mut in_block = false;

        for (start, end, _) in lines_in(text, 0, text.len()) {
            let line = &text[start..end];

            let upper = line.trim_start().to_ascii_uppercase();
            if upper.starts_with("#+BEGIN_") {
                in_block = true;
                continue;
            }
            if upper.starts_with("#+END_") {
                in_block = false;
                continue;
            }
            if in_block {
                continue;
            }

            if let Some(level) = Self::heading_level(line) {
                raw.push(RawHeading {
                    level,
                    begin: start,
                    marker_end: start + level,
                    line_end: end,
                    text: line[level..].to_string(),
                });
                continue;
            }

            // File keywords only count before the first heading
            if raw.is_empty() {
                if let Some((key, value)) = Self::keyword(line) {
                    match key.as_str() {
                        "CATEGORY" if !value.is_empty() => settings.category = Some(value.to_string()),
                        "FILETAGS" => settings.file_tags = parse_tag_list(value),
                        "TODO" | "SEQ_TODO" | "TYP_TODO" => {
                            settings.keywords = TodoKeywords::from_spec(value);
                        }
                        _ => {}
                    }
                }
            }
        }

        tracing::debug!(headings = raw.len(), "parsed org outline");
        Ok(build_outline(text, raw, settings))
    }

    fn extensions(&self) -> &[&str] {
        &["org", "txt"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
#+CATEGORY: home
#+FILETAGS: :personal:
* TODO [#B] Groceries :errand:
SCHEDULED: <2024-05-02 Thu>
:PROPERTIES:
:EFFORT: 0:30
:END:
Milk and eggs.
** DONE Bread
* Projects
:PROPERTIES:
:CATEGORY: work
:END:
** NEXT Draft proposal
DEADLINE: <2024-05-10 Fri>
#+BEGIN_SRC text
* not a heading
#+END_SRC
";

    #[test]
    fn parses_structure() {
        let outline = OrgParser.parse(SAMPLE).unwrap();
        let titles: Vec<_> = outline.headings.iter().map(|h| h.title.as_str()).collect();
        assert_eq!(titles, vec!["Groceries", "Bread", "Projects", "Draft proposal"]);
        assert_eq!(outline.headings[1].parent, Some(0));
        assert_eq!(outline.headings[3].path.to_string(), "Projects/Draft proposal");
    }

    #[test]
    fn parses_metadata() {
        let outline = OrgParser.parse(SAMPLE).unwrap();
        let groceries = &outline.headings[0];
        assert_eq!(groceries.todo.as_deref(), Some("TODO"));
        assert_eq!(groceries.priority, Some('B'));
        assert_eq!(groceries.category.as_deref(), Some("home"));
        assert!(groceries.has_tag("personal"));
        assert!(groceries.has_tag("errand"));
        assert!(groceries.planning.scheduled.is_some());
        assert_eq!(groceries.properties.get("EFFORT").map(String::as_str), Some("0:30"));
        assert_eq!(groceries.drawers.len(), 1);
    }

    #[test]
    fn category_property_inherits() {
        let outline = OrgParser.parse(SAMPLE).unwrap();
        assert_eq!(outline.headings[3].category.as_deref(), Some("work"));
        assert!(outline.headings[3].planning.deadline.is_some());
        assert!(outline.headings[1].done);
    }

    #[test]
    fn boundaries() {
        let outline = OrgParser.parse(SAMPLE).unwrap();
        let groceries = &outline.headings[0];
        let bread = &outline.headings[1];
        assert_eq!(groceries.entry_end, bread.begin);
        assert_eq!(groceries.subtree_end, outline.headings[2].begin);
        assert_eq!(outline.headings[3].subtree_end, SAMPLE.len());
        assert!(groceries.is_on_marker(groceries.begin));
        assert!(!groceries.is_on_marker(groceries.begin + 1));
    }

    #[test]
    fn star_without_space_is_text() {
        let outline = OrgParser.parse("*bold* text\n* Real\n").unwrap();
        assert_eq!(outline.headings.len(), 1);
        assert_eq!(outline.headings[0].title, "Real");
    }

    #[test]
    fn custom_keywords() {
        let outline = OrgParser.parse("#+TODO: OPEN | SHUT\n* OPEN a\n* SHUT b\n* TODO c\n").unwrap();
        assert_eq!(outline.headings[0].todo.as_deref(), Some("OPEN"));
        assert!(outline.headings[1].done);
        assert!(outline.headings[2].todo.is_none());
        assert_eq!(outline.headings[2].title, "TODO c");
    }
}
