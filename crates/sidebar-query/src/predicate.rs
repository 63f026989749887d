//! Predicate AST
//!
//! Compiled form of a query. Dates are kept relative (`today`, day
//! offsets) and resolved against the evaluation date, so a cached
//! predicate stays correct across midnight.

use chrono::{Duration, NaiveDate};
use regex::Regex;
use std::fmt;

/// Predicate over outline entries
#[derive(Debug, Clone)]
pub enum Predicate {
    /// Matches everything
    True,
    /// Open to-do entry, or one of the listed keywords
    Todo(Vec<String>),
    /// Entry in a done state
    Done,
    /// Carries any of the tags, own or inherited
    Tags(Vec<String>),
    /// Carries any of the tags on the heading itself
    TagsLocal(Vec<String>),
    /// Priority test
    Priority(PriorityTest),
    /// Planning timestamp test
    Planning(PlanningKind, DateRange),
    /// Heading level within `[min, max]`
    Level {
        /// Lowest level
        min: usize,
        /// Highest level
        max: usize,
    },
    /// Title matches every regex
    Heading(Vec<Regex>),
    /// Entry text (heading line and body) matches every regex
    Regexp(Vec<Regex>),
    /// Property present, optionally with an exact value
    Property {
        /// Property name
        key: String,
        /// Required value
        value: Option<String>,
    },
    /// Category is one of the names
    Category(Vec<String>),
    /// Every operand matches
    And(Vec<Predicate>),
    /// Some operand matches
    Or(Vec<Predicate>),
    /// Operand does not match
    Not(Box<Predicate>),
    /// Some ancestor matches
    Ancestors(Box<Predicate>),
    /// Direct parent matches
    Parent(Box<Predicate>),
}

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `=`
    Eq,
    /// `>=`
    GtEq,
    /// `>`
    Gt,
}

impl Comparator {
    /// Parse `<`, `<=`, `=`, `>=`, `>`
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "<" => Some(Self::Lt),
            "<=" => Some(Self::LtEq),
            "=" => Some(Self::Eq),
            ">=" => Some(Self::GtEq),
            ">" => Some(Self::Gt),
            _ => None,
        }
    }

    /// Apply to an ordering of `left` against `right`
    #[must_use]
    pub fn holds(self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::{Equal, Greater, Less};
        match self {
            Self::Lt => ordering == Less,
            Self::LtEq => ordering != Greater,
            Self::Eq => ordering == Equal,
            Self::GtEq => ordering != Less,
            Self::Gt => ordering == Greater,
        }
    }
}

/// Priority test
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriorityTest {
    /// Any priority cookie present
    Any,
    /// One of the listed priorities
    OneOf(Vec<char>),
    /// Compared by importance: `A` is higher than `B`
    Compare(Comparator, char),
}

impl PriorityTest {
    /// Check an entry's priority
    #[must_use]
    pub fn matches(&self, priority: Option<char>) -> bool {
        let Some(p) = priority else {
            return false;
        };
        match self {
            Self::Any => true,
            Self::OneOf(list) => list.contains(&p),
            // Earlier letters are more important
            Self::Compare(cmp, target) => cmp.holds(target.cmp(&p)),
        }
    }
}

/// Which planning timestamp a test reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanningKind {
    /// `SCHEDULED:`
    Scheduled,
    /// `DEADLINE:`
    Deadline,
    /// `CLOSED:`
    Closed,
    /// Any of the three
    Any,
}

impl fmt::Display for PlanningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Scheduled => "scheduled",
            Self::Deadline => "deadline",
            Self::Closed => "closed",
            Self::Any => "planning",
        })
    }
}

/// Date written in a query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSpec {
    /// The evaluation date
    Today,
    /// Days relative to today
    Offset(i64),
    /// Calendar date
    Absolute(NaiveDate),
}

impl DateSpec {
    /// Parse `today`, a signed day count, or `YYYY-MM-DD`
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("today") {
            return Some(Self::Today);
        }
        if let Ok(days) = s.parse::<i64>() {
            return Some(Self::Offset(days));
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .map(Self::Absolute)
    }

    /// Resolve against the evaluation date
    #[must_use]
    pub fn resolve(self, today: NaiveDate) -> NaiveDate {
        match self {
            Self::Today => today,
            Self::Offset(days) => today + Duration::days(days),
            Self::Absolute(date) => date,
        }
    }
}

/// Inclusive date bounds; empty bounds match any timestamp
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    /// Earliest date, inclusive
    pub from: Option<DateSpec>,
    /// Latest date, inclusive
    pub to: Option<DateSpec>,
}

impl DateRange {
    /// Range covering a single day
    #[must_use]
    pub fn on(date: DateSpec) -> Self {
        Self {
            from: Some(date),
            to: Some(date),
        }
    }

    /// Check a date against the bounds
    #[must_use]
    pub fn contains(&self, date: NaiveDate, today: NaiveDate) -> bool {
        self.from.map_or(true, |f| date >= f.resolve(today))
            && self.to.map_or(true, |t| date <= t.resolve(today))
    }
}
