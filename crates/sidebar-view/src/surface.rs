//! Rendered surfaces and their tagged text
//!
//! A [`Surface`] is one displayable sidebar pane. Its [`DisplayText`] keeps
//! the visible text and, out of band, one optional [`LineTag`] per line that
//! points back at the entry the line was rendered from.

use serde::{Deserialize, Serialize};
use sidebar_doc::EntryRef;
use std::fmt;
use ulid::Ulid;

/// Unique surface identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SurfaceId(pub Ulid);

impl SurfaceId {
    /// Generate new surface ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for SurfaceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Agenda-style classification of a rendered entry line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    /// Entry with a deadline
    Deadline,
    /// Scheduled entry without a deadline
    Scheduled,
    /// Undated to-do entry
    Todo,
    /// Anything else
    Plain,
}

impl fmt::Display for LineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Deadline => "deadline",
            Self::Scheduled => "scheduled",
            Self::Todo => "todo",
            Self::Plain => "plain",
        })
    }
}

/// Back-reference attached to one rendered line
#[derive(Debug, Clone)]
pub struct LineTag {
    /// Entry the line was rendered from
    pub entry: EntryRef,
    /// Line classification
    pub kind: LineKind,
}

/// One formatted line plus its optional back-reference
#[derive(Debug, Clone)]
pub struct TaggedText {
    /// Visible text, without a trailing newline
    pub text: String,
    /// Back-reference, absent for headers and separators
    pub tag: Option<LineTag>,
}

impl TaggedText {
    /// Untagged line
    #[inline]
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tag: None,
        }
    }

    /// Line tagged with its entry
    #[inline]
    #[must_use]
    pub fn tagged(text: impl Into<String>, tag: LineTag) -> Self {
        Self {
            text: text.into(),
            tag: Some(tag),
        }
    }
}

/// Visible text with per-line back-references
#[derive(Debug, Clone, Default)]
pub struct DisplayText {
    text: String,
    tags: Vec<Option<LineTag>>,
}

impl DisplayText {
    /// Create empty text
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one line; embedded newlines are flattened to spaces
    pub fn push(&mut self, line: TaggedText) {
        if line.text.contains('\n') {
            self.text.push_str(&line.text.replace('\n', " "));
        } else {
            self.text.push_str(&line.text);
        }
        self.text.push('\n');
        self.tags.push(line.tag);
    }

    /// Append an untagged line
    pub fn push_plain(&mut self, text: impl Into<String>) {
        self.push(TaggedText::plain(text));
    }

    /// Visible text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of lines
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.tags.len()
    }

    /// Check if no lines were rendered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Lines with their tags
    pub fn lines(&self) -> impl Iterator<Item = (&str, Option<&LineTag>)> {
        self.text.lines().zip(self.tags.iter().map(Option::as_ref))
    }

    /// Tag on the 0-based `line`
    #[must_use]
    pub fn entry_at_line(&self, line: usize) -> Option<&LineTag> {
        self.tags.get(line).and_then(Option::as_ref)
    }

    /// Tag on the line containing byte `offset`
    #[must_use]
    pub fn entry_at_offset(&self, offset: usize) -> Option<&LineTag> {
        if offset >= self.text.len() {
            return None;
        }
        let line = self.text.as_bytes()[..offset]
            .iter()
            .filter(|b| **b == b'\n')
            .count();
        self.entry_at_line(line)
    }

    /// Entries in display order
    pub fn entries(&self) -> impl Iterator<Item = &EntryRef> {
        self.tags.iter().flatten().map(|t| &t.entry)
    }
}

impl fmt::Display for DisplayText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// One displayable sidebar pane
#[derive(Debug, Clone)]
pub struct Surface {
    id: SurfaceId,
    name: String,
    description: Option<String>,
    content: DisplayText,
}

impl Surface {
    /// Create surface with fresh identity
    #[must_use]
    pub fn new(name: impl Into<String>, content: DisplayText) -> Self {
        Self {
            id: SurfaceId::new(),
            name: name.into(),
            description: None,
            content,
        }
    }

    /// Builder: set help text
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Surface identifier
    #[inline]
    #[must_use]
    pub fn id(&self) -> SurfaceId {
        self.id
    }

    /// Display name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Help text
    #[inline]
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Rendered content
    #[inline]
    #[must_use]
    pub fn content(&self) -> &DisplayText {
        &self.content
    }

    /// Replace name, help text and content, keeping identity
    pub(crate) fn rebuild_from(&mut self, other: Surface) {
        self.name = other.name;
        self.description = other.description;
        self.content = other.content;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sidebar_doc::Document;

    fn entry() -> EntryRef {
        let doc = Document::org("a.org", "* TODO One\n").unwrap();
        let outline = doc.outline();
        EntryRef::new(&doc, &outline, &outline.headings[0]).unwrap()
    }

    #[test]
    fn tags_follow_lines() {
        let mut text = DisplayText::new();
        text.push_plain("Header");
        text.push(TaggedText::tagged(
            "  a: TODO One",
            LineTag {
                entry: entry(),
                kind: LineKind::Todo,
            },
        ));
        text.push_plain("");

        assert_eq!(text.line_count(), 3);
        assert!(text.entry_at_line(0).is_none());
        assert_eq!(text.entry_at_line(1).unwrap().entry.snapshot().title, "One");
        assert!(text.entry_at_line(2).is_none());
        assert!(text.entry_at_line(9).is_none());

        let second_line = "Header\n".len() + 3;
        assert_eq!(text.entry_at_offset(second_line).unwrap().kind, LineKind::Todo);
        assert!(text.entry_at_offset(0).is_none());
        assert_eq!(text.entries().count(), 1);
    }

    #[test]
    fn newlines_are_flattened() {
        let mut text = DisplayText::new();
        text.push_plain("two\nlines");
        assert_eq!(text.as_str(), "two lines\n");
        assert_eq!(text.line_count(), 1);
    }

    #[test]
    fn rebuild_keeps_identity() {
        let mut surface = Surface::new("Old", DisplayText::new());
        let id = surface.id();
        let mut content = DisplayText::new();
        content.push_plain("fresh");
        surface.rebuild_from(Surface::new("New", content).with_description("help"));
        assert_eq!(surface.id(), id);
        assert_eq!(surface.name(), "New");
        assert_eq!(surface.description(), Some("help"));
        assert_eq!(surface.content().as_str(), "fresh\n");
    }
}
