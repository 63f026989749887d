//! Markdown outline parser
//!
//! Uses pulldown-cmark to locate ATX and setext headings, so `#` lines in
//! code blocks never become entries. Headline text follows the same
//! conventions as org (`TODO [#A] Title :tag:`); a planning line may follow
//! the heading. YAML front matter supplies `category` and `tags`.

use super::{build_outline, parse_tag_list, FileSettings, OutlineParser, RawHeading, TodoKeywords};
use crate::error::ParseError;
use crate::heading::{Outline, Tags};
use pulldown_cmark::{Event, MetadataBlockKind, Options, Parser as MdParser, Tag, TagEnd};

/// Markdown outline parser
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownParser;

impl MarkdownParser {
    /// Create new markdown parser
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Apply YAML front matter to file settings
    fn apply_front_matter(yaml: &str, settings: &mut FileSettings) -> Result<(), ParseError> {
        let value: serde_yaml::Value = serde_yaml::from_str(yaml)
            .map_err(|e| ParseError::FrontMatter(e.to_string()))?;

        if let Some(category) = value.get("category").and_then(serde_yaml::Value::as_str) {
            settings.category = Some(category.to_string());
        }

        match value.get("tags") {
            Some(serde_yaml::Value::String(s)) => settings.file_tags = parse_tag_list(s),
            Some(serde_yaml::Value::Sequence(items)) => {
                settings.file_tags = items
                    .iter()
                    .filter_map(serde_yaml::Value::as_str)
                    .map(str::to_string)
                    .collect::<Tags>();
            }
            _ => {}
        }

        if let Some(spec) = value.get("todo").and_then(serde_yaml::Value::as_str) {
            settings.keywords = TodoKeywords::from_spec(spec);
        }

        Ok(())
    }
}

fn line_start(text: &str, pos: usize) -> usize {
    text[..pos].rfind('\n').map_or(0, |i| i + 1)
}

fn line_end(text: &str, pos: usize) -> usize {
    text[pos..].find('\n').map_or(text.len(), |i| pos + i)
}

impl OutlineParser for MarkdownParser {
    fn parse(&self, text: &str) -> Result<Outline, ParseError> {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_YAML_STYLE_METADATA_BLOCKS);

        let mut settings = FileSettings::default();
        let mut raw: Vec<RawHeading> = Vec::new();
        let mut current: Option<RawHeading> = None;
        let mut front_matter: Option<String> = None;

        for (event, range) in MdParser::new_ext(text, options).into_offset_iter() {
            match event {
                Event::Start(Tag::MetadataBlock(MetadataBlockKind::YamlStyle)) => {
                    front_matter = Some(String::new());
                }
                Event::End(TagEnd::MetadataBlock(_)) => {
                    if let Some(yaml) = front_matter.take() {
                        Self::apply_front_matter(&yaml, &mut settings)?;
                    }
                }
                Event::Start(Tag::Heading { level, .. }) => {
                    let begin = line_start(text, range.start);
                    let leading = &text[begin..];
                    let indent = leading.len() - leading.trim_start_matches(' ').len();
                    let hashes = leading[indent..].bytes().take_while(|&b| b == b'#').count();
                    let mut end = range.end;
                    while end > range.start && text[..end].ends_with(['\n', '\r']) {
                        end -= 1;
                    }
                    current = Some(RawHeading {
                        level: level as usize,
                        begin,
                        marker_end: begin + indent + hashes,
                        line_end: line_end(text, end.max(begin)),
                        text: String::new(),
                    });
                }
                Event::End(TagEnd::Heading(_)) => {
                    if let Some(heading) = current.take() {
                        raw.push(heading);
                    }
                }
                Event::Text(t) | Event::Code(t) => {
                    if let Some(yaml) = front_matter.as_mut() {
                        yaml.push_str(&t);
                    } else if let Some(heading) = current.as_mut() {
                        heading.text.push_str(&t);
                    }
                }
                _ => {}
            }
        }

        tracing::debug!(headings = raw.len(), "parsed markdown outline");
        Ok(build_outline(text, raw, settings))
    }

    fn extensions(&self) -> &[&str] {
        &["md", "markdown"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_headings_and_keywords() {
        let text = "# Inbox\n\n## TODO [#A] Call plumber :home:\nSCHEDULED: <2024-05-02 Thu>\n\nDetails.\n\n## Notes\n";
        let outline = MarkdownParser.parse(text).unwrap();
        assert_eq!(outline.headings.len(), 3);

        let call = &outline.headings[1];
        assert_eq!(call.level, 2);
        assert_eq!(call.todo.as_deref(), Some("TODO"));
        assert_eq!(call.priority, Some('A'));
        assert_eq!(call.title, "Call plumber");
        assert!(call.has_tag("home"));
        assert!(call.planning.scheduled.is_some());
        assert_eq!(call.parent, Some(0));
        assert_eq!(call.marker_end - call.begin, 2);
    }

    #[test]
    fn ignores_hashes_in_code() {
        let text = "# Real\n\n```sh\n# comment\n```\n";
        let outline = MarkdownParser.parse(text).unwrap();
        assert_eq!(outline.headings.len(), 1);
    }

    #[test]
    fn front_matter_sets_category() {
        let text = "---\ncategory: garden\ntags: [outdoor]\n---\n\n# TODO Plant tomatoes\n";
        let outline = MarkdownParser.parse(text).unwrap();
        assert_eq!(outline.category.as_deref(), Some("garden"));
        assert_eq!(outline.headings[0].category.as_deref(), Some("garden"));
        assert!(outline.headings[0].has_tag("outdoor"));
    }

    #[test]
    fn empty_document() {
        let outline = MarkdownParser.parse("").unwrap();
        assert!(outline.headings.is_empty());
    }
}
