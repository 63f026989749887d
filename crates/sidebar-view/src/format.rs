//! Per-entry formatting
//!
//! The renderer never decides how an entry looks; it hands every entry to
//! an [`EntryFormatter`]. The formatter must tag its line with the entry so
//! jump commands can resolve it later.

use crate::surface::{LineKind, LineTag, TaggedText};
use serde::{Deserialize, Serialize};
use sidebar_doc::{EntryRef, EntrySnapshot};
use std::fmt::{self, Write as _};

/// Formats one entry as one tagged line
pub trait EntryFormatter: Send + Sync + fmt::Debug {
    /// Format `entry`; the result should carry a tag pointing back at it
    fn format(&self, entry: &EntryRef) -> TaggedText;
}

/// Settings for [`AgendaFormatter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatterConfig {
    /// Column width reserved for `category:`
    pub category_width: usize,
    /// Append `:tag:` lists
    pub show_tags: bool,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            category_width: 12,
            show_tags: true,
        }
    }
}

/// Agenda-style line: category, planning, keyword, priority, title, tags
#[derive(Debug, Clone, Copy, Default)]
pub struct AgendaFormatter {
    config: FormatterConfig,
}

impl AgendaFormatter {
    /// Create formatter with settings
    #[inline]
    #[must_use]
    pub fn new(config: FormatterConfig) -> Self {
        Self { config }
    }

    fn kind(s: &EntrySnapshot) -> LineKind {
        if s.deadline.is_some() {
            LineKind::Deadline
        } else if s.scheduled.is_some() {
            LineKind::Scheduled
        } else if s.todo.is_some() {
            LineKind::Todo
        } else {
            LineKind::Plain
        }
    }
}

impl EntryFormatter for AgendaFormatter {
    fn format(&self, entry: &EntryRef) -> TaggedText {
        let s = entry.snapshot();
        let width = self.config.category_width;
        let category: String = format!("{}:", s.category).chars().take(width.max(1)).collect();

        let mut line = format!("  {category:<width$} ");
        if let Some(deadline) = s.deadline {
            let _ = write!(line, "Deadline {deadline}: ");
        } else if let Some(scheduled) = s.scheduled {
            let _ = write!(line, "Scheduled {scheduled}: ");
        }
        if let Some(todo) = &s.todo {
            line.push_str(todo);
            line.push(' ');
        }
        if let Some(p) = s.priority {
            let _ = write!(line, "[#{p}] ");
        }
        line.push_str(&s.title);
        if self.config.show_tags && !s.tags.is_empty() {
            let _ = write!(line, "  :{}:", s.tags.join(":"));
        }

        TaggedText::tagged(
            line.trim_end(),
            LineTag {
                entry: entry.clone(),
                kind: Self::kind(s),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sidebar_doc::Document;

    fn first_entry(text: &str) -> EntryRef {
        let doc = Document::org("notes.org", text).unwrap();
        let outline = doc.outline();
        EntryRef::new(&doc, &outline, &outline.headings[0]).unwrap()
    }

    #[test]
    fn formats_agenda_line() {
        let entry = first_entry("* TODO [#A] Pay rent :money:\nDEADLINE: <2024-05-01 Wed>\n");
        let line = AgendaFormatter::default().format(&entry);
        assert_eq!(
            line.text,
            "  notes:       Deadline 2024-05-01: TODO [#A] Pay rent  :money:"
        );
        let tag = line.tag.unwrap();
        assert_eq!(tag.kind, LineKind::Deadline);
        assert_eq!(tag.entry.snapshot().title, "Pay rent");
    }

    #[test]
    fn category_is_truncated_and_tags_optional() {
        let entry = first_entry("* Plain heading :x:\n");
        let formatter = AgendaFormatter::new(FormatterConfig {
            category_width: 4,
            show_tags: false,
        });
        let line = formatter.format(&entry);
        assert_eq!(line.text, "  note Plain heading");
        assert_eq!(line.tag.unwrap().kind, LineKind::Plain);
    }
}
