//! Outline entries
//!
//! A [`Heading`] is one parsed entry of an outline: its metadata (to-do
//! state, priority, tags, planning timestamps, properties) and the byte
//! offsets that delimit its heading line, its own body and its subtree.

use crate::path::HeadingPath;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::ops::Range;

/// Tag list; most headings carry few tags
pub type Tags = SmallVec<[String; 4]>;

/// Planning timestamp (`<2024-05-01 Wed 10:00>`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    /// Calendar date
    pub date: NaiveDate,
    /// Optional time of day
    pub time: Option<NaiveTime>,
}

impl Timestamp {
    /// Date-only timestamp
    #[inline]
    #[must_use]
    pub fn on(date: NaiveDate) -> Self {
        Self { date, time: None }
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.time {
            Some(time) => write!(f, "{} {}", self.date, time.format("%H:%M")),
            None => write!(f, "{}", self.date),
        }
    }
}

/// Planning line of an entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Planning {
    /// `SCHEDULED:` timestamp
    pub scheduled: Option<Timestamp>,
    /// `DEADLINE:` timestamp
    pub deadline: Option<Timestamp>,
    /// `CLOSED:` timestamp
    pub closed: Option<Timestamp>,
}

impl Planning {
    /// Check if no planning timestamp is present
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scheduled.is_none() && self.deadline.is_none() && self.closed.is_none()
    }

    /// Earliest of scheduled and deadline
    #[must_use]
    pub fn earliest(&self) -> Option<Timestamp> {
        match (self.scheduled, self.deadline) {
            (Some(s), Some(d)) => Some(s.min(d)),
            (s, d) => s.or(d),
        }
    }
}

/// One outline entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// Nesting level (number of stars / hashes)
    pub level: usize,
    /// To-do keyword, if any
    pub todo: Option<String>,
    /// Whether the keyword is a done-state keyword
    pub done: bool,
    /// Priority cookie (`[#A]`)
    pub priority: Option<char>,
    /// Title without keyword, priority and tags
    pub title: String,
    /// Tags set on this heading
    pub local_tags: Tags,
    /// Tags including inherited and file tags
    pub tags: Tags,
    /// Category (heading property, inherited, or file-level)
    pub category: Option<String>,
    /// Planning timestamps
    pub planning: Planning,
    /// Properties drawer contents
    pub properties: BTreeMap<String, String>,
    /// Titles from the root down to this heading
    pub path: HeadingPath,
    /// Index of the parent heading in the outline
    pub parent: Option<usize>,
    /// Start of the heading line
    pub begin: usize,
    /// End of the leading heading glyphs (stars or hashes)
    pub marker_end: usize,
    /// Start of the line following the heading line
    pub contents_begin: usize,
    /// Start of the next heading of any level
    pub entry_end: usize,
    /// Start of the next heading of equal or lower level
    pub subtree_end: usize,
    /// Drawer blocks within the entry body
    pub drawers: Vec<Range<usize>>,
}

impl Heading {
    /// Check whether `pos` lies on the heading glyphs
    #[inline]
    #[must_use]
    pub fn is_on_marker(&self, pos: usize) -> bool {
        pos >= self.begin && pos < self.marker_end
    }

    /// Check whether `pos` lies within this heading's own entry
    #[inline]
    #[must_use]
    pub fn contains_entry(&self, pos: usize) -> bool {
        pos >= self.begin && pos < self.entry_end
    }

    /// Check whether `pos` lies within this heading's subtree
    #[inline]
    #[must_use]
    pub fn contains_subtree(&self, pos: usize) -> bool {
        pos >= self.begin && pos < self.subtree_end
    }

    /// Byte range of the heading's own body (no descendants)
    #[inline]
    #[must_use]
    pub fn body(&self) -> Range<usize> {
        self.contents_begin..self.entry_end
    }

    /// Check whether the heading has a to-do keyword that is not done
    #[inline]
    #[must_use]
    pub fn is_open_todo(&self) -> bool {
        self.todo.is_some() && !self.done
    }

    /// Check whether the heading carries `tag`, own or inherited
    #[inline]
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// Parsed outline of a document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outline {
    /// Headings in document order
    pub headings: Vec<Heading>,
    /// File-level category (`#+CATEGORY:` or front matter)
    pub category: Option<String>,
    /// File-level tags (`#+FILETAGS:` or front matter)
    pub file_tags: Tags,
}

impl Outline {
    /// Index of the innermost heading whose entry contains `pos`
    #[must_use]
    pub fn heading_index_at(&self, pos: usize) -> Option<usize> {
        let idx = self.headings.partition_point(|h| h.begin <= pos);
        if idx == 0 {
            return None;
        }
        Some(idx - 1)
    }

    /// Innermost heading whose entry contains `pos`
    #[must_use]
    pub fn heading_at(&self, pos: usize) -> Option<&Heading> {
        self.heading_index_at(pos).map(|i| &self.headings[i])
    }

    /// Heading starting exactly at `begin`
    #[must_use]
    pub fn heading_starting_at(&self, begin: usize) -> Option<&Heading> {
        self.headings
            .binary_search_by_key(&begin, |h| h.begin)
            .ok()
            .map(|i| &self.headings[i])
    }

    /// Direct children of the heading at `index`
    pub fn children(&self, index: usize) -> impl Iterator<Item = &Heading> {
        self.headings
            .iter()
            .skip(index + 1)
            .filter(move |h| h.parent == Some(index))
    }

    /// All descendants of the heading at `index`
    pub fn descendants(&self, index: usize) -> impl Iterator<Item = &Heading> {
        let end = self.headings[index].subtree_end;
        self.headings
            .iter()
            .skip(index + 1)
            .take_while(move |h| h.begin < end)
    }

    /// Find a heading by its title path
    #[must_use]
    pub fn find_path(&self, path: &HeadingPath) -> Option<&Heading> {
        self.headings.iter().find(|h| &h.path == path)
    }
}
