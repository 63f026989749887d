//! Sort keys for query results

use crate::error::QueryError;
use serde::{Deserialize, Serialize};
use sidebar_doc::{EntryRef, EntrySnapshot};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Entry field a sort key reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    /// Earliest of scheduled and deadline
    Date,
    /// Deadline date
    Deadline,
    /// Scheduled date
    Scheduled,
    /// Closing date
    Closed,
    /// Priority cookie, highest first
    Priority,
    /// Open keywords, then done ones, then plain headings
    Todo,
    /// Heading title
    Title,
}

impl SortField {
    fn name(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Deadline => "deadline",
            Self::Scheduled => "scheduled",
            Self::Closed => "closed",
            Self::Priority => "priority",
            Self::Todo => "todo",
            Self::Title => "title",
        }
    }
}

/// One sort key, optionally reversed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortKey {
    /// Property compared
    pub field: SortField,
    /// Descending instead of ascending
    pub reverse: bool,
}

impl SortKey {
    /// Ascending key on `field`
    #[inline]
    #[must_use]
    pub const fn new(field: SortField) -> Self {
        Self {
            field,
            reverse: false,
        }
    }

    /// Reverse this key
    #[inline]
    #[must_use]
    pub const fn reversed(mut self) -> Self {
        self.reverse = !self.reverse;
        self
    }

    /// Compare two snapshots; entries lacking the field sort last
    #[must_use]
    pub fn compare(&self, a: &EntrySnapshot, b: &EntrySnapshot) -> Ordering {
        let ordering = match self.field {
            SortField::Date => missing_last(a.date(), b.date()),
            SortField::Deadline => missing_last(a.deadline, b.deadline),
            SortField::Scheduled => missing_last(a.scheduled, b.scheduled),
            SortField::Closed => missing_last(a.closed, b.closed),
            SortField::Priority => missing_last(a.priority, b.priority),
            SortField::Todo => todo_rank(a).cmp(&todo_rank(b)),
            SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        };
        if self.reverse {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

fn missing_last<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Open keywords, then done keywords, then plain headings
fn todo_rank(s: &EntrySnapshot) -> (u8, Option<&str>) {
    match (&s.todo, s.done) {
        (Some(k), false) => (0, Some(k.as_str())),
        (Some(k), true) => (1, Some(k.as_str())),
        (None, _) => (2, None),
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reverse {
            f.write_str("reverse-")?;
        }
        f.write_str(self.field.name())
    }
}

impl FromStr for SortKey {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let (reverse, name) = match lower.strip_prefix("reverse-") {
            Some(rest) => (true, rest),
            None => (false, lower.as_str()),
        };
        let field = match name {
            "date" => SortField::Date,
            "deadline" => SortField::Deadline,
            "scheduled" => SortField::Scheduled,
            "closed" => SortField::Closed,
            "priority" => SortField::Priority,
            "todo" => SortField::Todo,
            "title" => SortField::Title,
            _ => return Err(QueryError::UnknownSortKey(s.to_string())),
        };
        Ok(Self { field, reverse })
    }
}

/// Parse a list of sort key names
///
/// # Errors
/// Returns `UnknownSortKey` for the first unrecognised name
pub fn parse_sort_keys<S: AsRef<str>>(names: &[S]) -> Result<Vec<SortKey>, QueryError> {
    names.iter().map(|n| n.as_ref().parse()).collect()
}

/// Stable sort applying `keys` lexicographically
pub fn sort_entries(entries: &mut [EntryRef], keys: &[SortKey]) {
    if keys.is_empty() {
        return;
    }
    entries.sort_by(|a, b| {
        keys.iter()
            .map(|k| k.compare(a.snapshot(), b.snapshot()))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        let key: SortKey = "reverse-priority".parse().unwrap();
        assert!(key.reverse);
        assert_eq!(key.field, SortField::Priority);
        assert_eq!(key.to_string(), "reverse-priority");
        assert_eq!("Date".parse::<SortKey>().unwrap(), SortKey::new(SortField::Date));
    }

    #[test]
    fn unknown_key() {
        let err = parse_sort_keys(&["date", "effort"]).unwrap_err();
        assert!(matches!(err, QueryError::UnknownSortKey(ref k) if k == "effort"));
    }

    #[test]
    fn missing_values_sort_last() {
        assert_eq!(missing_last(Some(1), None), Ordering::Less);
        assert_eq!(missing_last::<i32>(None, None), Ordering::Equal);
        assert_eq!(missing_last(Some('A'), Some('B')), Ordering::Less);
    }
}
