//! Entry references
//!
//! An [`EntryRef`] is what the query layer hands to grouping and rendering:
//! a marker at the entry's heading plus a snapshot of the heading metadata
//! taken when the query ran. The marker is the back-reference that rendered
//! lines carry; the snapshot feeds classifiers and formatters without
//! touching the document again.

use crate::document::Document;
use crate::error::DocError;
use crate::heading::{Heading, Outline, Tags, Timestamp};
use crate::marker::Marker;
use crate::path::HeadingPath;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Heading metadata captured at query time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySnapshot {
    /// Name of the owning document
    pub document: String,
    /// Heading title without keyword, cookie or tags
    pub title: String,
    /// To-do keyword, if any
    pub todo: Option<String>,
    /// Whether the keyword is a done state
    pub done: bool,
    /// Priority cookie
    pub priority: Option<char>,
    /// `SCHEDULED:` date
    pub scheduled: Option<Timestamp>,
    /// `DEADLINE:` date
    pub deadline: Option<Timestamp>,
    /// `CLOSED:` date
    pub closed: Option<Timestamp>,
    /// Category, falling back to the document name
    pub category: String,
    /// Own tags plus inherited ones
    pub tags: Tags,
    /// Tags written on the heading itself
    pub local_tags: Tags,
    /// Nesting level, 1 for top-level headings
    pub level: usize,
    /// Titles from the outline root down to this heading
    pub path: HeadingPath,
    /// Title of the parent heading
    pub parent_title: Option<String>,
    /// Property drawer contents
    pub properties: BTreeMap<String, String>,
}

impl EntrySnapshot {
    /// Capture a heading of `outline` belonging to `document`
    #[must_use]
    pub fn from_heading(document: &str, outline: &Outline, heading: &Heading) -> Self {
        let stem = document
            .rsplit_once('.')
            .map_or(document, |(stem, _)| stem)
            .to_string();
        Self {
            document: document.to_string(),
            title: heading.title.clone(),
            todo: heading.todo.clone(),
            done: heading.done,
            priority: heading.priority,
            scheduled: heading.planning.scheduled,
            deadline: heading.planning.deadline,
            closed: heading.planning.closed,
            category: heading.category.clone().unwrap_or(stem),
            tags: heading.tags.clone(),
            local_tags: heading.local_tags.clone(),
            level: heading.level,
            path: heading.path.clone(),
            parent_title: heading
                .parent
                .and_then(|p| outline.headings.get(p))
                .map(|p| p.title.clone()),
            properties: heading.properties.clone(),
        }
    }

    /// Earliest of scheduled and deadline
    #[must_use]
    pub fn date(&self) -> Option<Timestamp> {
        match (self.scheduled, self.deadline) {
            (Some(s), Some(d)) => Some(s.min(d)),
            (s, d) => s.or(d),
        }
    }

    /// Check whether the entry has a to-do keyword that is not done
    #[inline]
    #[must_use]
    pub fn is_open_todo(&self) -> bool {
        self.todo.is_some() && !self.done
    }
}

/// Reference to one matched outline entry
#[derive(Debug, Clone)]
pub struct EntryRef {
    marker: Marker,
    snapshot: Arc<EntrySnapshot>,
}

impl EntryRef {
    /// Reference the heading starting at `heading.begin` in `doc`
    ///
    /// # Errors
    /// Returns error if the document is dead
    pub fn new(doc: &Document, outline: &Outline, heading: &Heading) -> Result<Self, DocError> {
        Ok(Self {
            marker: doc.marker(heading.begin)?,
            snapshot: Arc::new(EntrySnapshot::from_heading(&doc.name(), outline, heading)),
        })
    }

    /// Back-reference marker at the heading start
    #[inline]
    #[must_use]
    pub fn marker(&self) -> &Marker {
        &self.marker
    }

    /// Metadata captured at query time
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> &EntrySnapshot {
        &self.snapshot
    }

    /// Current heading behind the reference
    ///
    /// # Errors
    /// Returns `StaleReference` if the document is gone, `NoHeading` if the
    /// heading was deleted
    pub fn resolve(&self) -> Result<(Document, Heading), DocError> {
        let (doc, pos) = self.marker.resolve()?;
        let heading = doc.heading_at(pos).ok_or(DocError::NoHeading(pos))?;
        Ok((doc, heading))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_falls_back_to_document_name() {
        let doc = Document::org("chores.org", "* TODO Sweep\n** TODO Kitchen\n").unwrap();
        let outline = doc.outline();
        let entry = EntryRef::new(&doc, &outline, &outline.headings[1]).unwrap();
        let snap = entry.snapshot();
        assert_eq!(snap.category, "chores");
        assert_eq!(snap.parent_title.as_deref(), Some("Sweep"));
        assert!(snap.is_open_todo());
    }

    #[test]
    fn resolve_follows_edits() {
        let doc = Document::org("a.org", "* One\n* Two\n").unwrap();
        let outline = doc.outline();
        let entry = EntryRef::new(&doc, &outline, &outline.headings[1]).unwrap();
        doc.insert(0, "* Zero\n").unwrap();
        let (_, heading) = entry.resolve().unwrap();
        assert_eq!(heading.title, "Two");
    }

    #[test]
    fn resolve_stale_after_kill() {
        let doc = Document::org("a.org", "* One\n").unwrap();
        let outline = doc.outline();
        let entry = EntryRef::new(&doc, &outline, &outline.headings[0]).unwrap();
        doc.kill();
        assert!(entry.resolve().unwrap_err().is_stale());
    }
}
