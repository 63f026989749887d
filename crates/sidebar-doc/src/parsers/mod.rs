//! Outline parsers for different source formats
//!
//! Both formats are scanned into [`RawHeading`]s (level, offsets, headline
//! text); [`build_outline`] then derives everything format-independent:
//! entry and subtree boundaries, parents and paths, keywords, priorities,
//! tags, planning lines, drawers and categories.

use crate::error::ParseError;
use crate::heading::{Heading, Outline, Planning, Tags, Timestamp};
use crate::path::HeadingPath;
use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

mod markdown;
mod org;

pub use markdown::MarkdownParser;
pub use org::OrgParser;

/// Parser trait for turning document text into an [`Outline`]
///
/// Implement this trait to add support for new outline formats.
pub trait OutlineParser: Send + Sync + std::fmt::Debug {
    /// Parse document text into an outline
    ///
    /// # Errors
    /// Returns error if the document carries malformed metadata
    fn parse(&self, text: &str) -> Result<Outline, ParseError>;

    /// Supported file extensions (without dot)
    fn extensions(&self) -> &[&str];
}

/// Source format of a document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// Org-style outline (`* TODO Heading`)
    #[default]
    Org,
    /// Markdown ATX/setext headings
    Markdown,
}

impl SourceFormat {
    /// Pick a format from a file extension; anything unknown is org
    #[must_use]
    pub fn detect(path: &Path) -> Self {
        let markdown = MarkdownParser::new();
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if markdown.extensions().contains(&ext) => Self::Markdown,
            _ => Self::Org,
        }
    }

    /// Parser for this format
    #[must_use]
    pub fn parser(self) -> Box<dyn OutlineParser> {
        match self {
            Self::Org => Box::new(OrgParser::new()),
            Self::Markdown => Box::new(MarkdownParser::new()),
        }
    }
}

/// To-do keyword sets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoKeywords {
    /// Keywords of open states
    pub active: Vec<String>,
    /// Keywords of done states
    pub done: Vec<String>,
}

impl Default for TodoKeywords {
    fn default() -> Self {
        Self {
            active: vec!["TODO".into(), "NEXT".into(), "WAITING".into()],
            done: vec!["DONE".into(), "CANCELLED".into()],
        }
    }
}

impl TodoKeywords {
    /// Parse an org `#+TODO:` value (`TODO NEXT | DONE`)
    #[must_use]
    pub fn from_spec(spec: &str) -> Self {
        let (active, done) = match spec.split_once('|') {
            Some((a, d)) => (a, d),
            None => {
                // Without a bar the last keyword is the done state
                let words: Vec<&str> = spec.split_whitespace().collect();
                return match words.split_last() {
                    Some((last, rest)) => Self {
                        active: rest.iter().map(|w| strip_fast_key(w)).collect(),
                        done: vec![strip_fast_key(last)],
                    },
                    None => Self::default(),
                };
            }
        };
        Self {
            active: active.split_whitespace().map(strip_fast_key).collect(),
            done: done.split_whitespace().map(strip_fast_key).collect(),
        }
    }

    /// Classify a word: `Some(done?)` when it is a keyword
    #[must_use]
    pub fn classify(&self, word: &str) -> Option<bool> {
        if self.active.iter().any(|k| k == word) {
            Some(false)
        } else if self.done.iter().any(|k| k == word) {
            Some(true)
        } else {
            None
        }
    }
}

/// Strip a fast-access key suffix: `WAIT(w@)` -> `WAIT`
fn strip_fast_key(word: &str) -> String {
    word.split('(').next().unwrap_or(word).to_string()
}

/// File-level settings collected while scanning
#[derive(Debug, Clone, Default)]
pub(crate) struct FileSettings {
    pub(crate) category: Option<String>,
    pub(crate) file_tags: Tags,
    pub(crate) keywords: TodoKeywords,
}

/// Heading located by a format scanner
#[derive(Debug, Clone)]
pub(crate) struct RawHeading {
    pub(crate) level: usize,
    pub(crate) begin: usize,
    pub(crate) marker_end: usize,
    pub(crate) line_end: usize,
    pub(crate) text: String,
}

static TAGS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*?)\s+(:(?:[\w@#%]+:)+)\s*$").expect("valid tags regex"));

static PRIORITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[#([A-Za-z0-9])\]\s*").expect("valid priority regex"));

static PLANNING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(SCHEDULED|DEADLINE|CLOSED):\s*[<\[](\d{4}-\d{2}-\d{2})(?:\s+[^\s\d>\]][^\s>\]]*)?(?:\s+(\d{1,2}:\d{2}))?[^>\]]*[>\]]",
    )
    .expect("valid planning regex")
});

static DRAWER_OPEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*:([\w-]+):\s*$").expect("valid drawer regex"));

static PROPERTY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*:([\w-]+\+?):\s*(.*?)\s*$").expect("valid property regex"));

/// Parsed headline parts
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Headline {
    pub(crate) todo: Option<String>,
    pub(crate) done: bool,
    pub(crate) priority: Option<char>,
    pub(crate) title: String,
    pub(crate) tags: Tags,
}

/// Split headline text into keyword, priority, title and tags
pub(crate) fn parse_headline(text: &str, keywords: &TodoKeywords) -> Headline {
    let mut rest = text.trim();
    let mut headline = Headline::default();

    if let Some(word) = rest.split_whitespace().next() {
        if let Some(done) = keywords.classify(word) {
            headline.todo = Some(word.to_string());
            headline.done = done;
            rest = rest[word.len()..].trim_start();
        }
    }

    if let Some(caps) = PRIORITY_RE.captures(rest) {
        headline.priority = caps[1].chars().next().map(|c| c.to_ascii_uppercase());
        rest = &rest[caps[0].len()..];
    }

    let (title, tags) = match TAGS_RE.captures(rest) {
        Some(caps) => {
            let tags = caps[2]
                .split(':')
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect();
            (caps[1].to_string(), tags)
        }
        // A headline made only of tags has an empty title
        None if rest.starts_with(':') && rest.ends_with(':') && rest.len() > 1 => (
            String::new(),
            rest.split(':')
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        None => (rest.to_string(), Tags::new()),
    };

    headline.title = title.trim().to_string();
    headline.tags = tags;
    headline
}

/// Parse tags written as `:a:b:`
pub(crate) fn parse_tag_list(value: &str) -> Tags {
    value
        .split(|c: char| c == ':' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_planning(line: &str) -> Planning {
    let mut planning = Planning::default();
    for caps in PLANNING_RE.captures_iter(line) {
        let Ok(date) = NaiveDate::parse_from_str(&caps[2], "%Y-%m-%d") else {
            tracing::debug!("ignoring invalid planning date: {}", &caps[2]);
            continue;
        };
        let time = caps
            .get(3)
            .and_then(|m| NaiveTime::parse_from_str(m.as_str(), "%H:%M").ok());
        let ts = Timestamp { date, time };
        match &caps[1] {
            "SCHEDULED" => planning.scheduled = Some(ts),
            "DEADLINE" => planning.deadline = Some(ts),
            _ => planning.closed = Some(ts),
        }
    }
    planning
}

/// Iterate lines of `text[range]` as `(line_start, line_end_excl_newline, next_line_start)`
pub(crate) fn lines_in(text: &str, start: usize, end: usize) -> Vec<(usize, usize, usize)> {
    let mut out = Vec::new();
    let mut pos = start;
    while pos < end {
        let line_end = text[pos..end].find('\n').map_or(end, |i| pos + i);
        let next = if line_end < end { line_end + 1 } else { end };
        out.push((pos, line_end, next));
        pos = next;
    }
    out
}

#[derive(Debug, Default)]
struct Body {
    planning: Planning,
    properties: BTreeMap<String, String>,
    drawers: Vec<std::ops::Range<usize>>,
}

fn scan_body(text: &str, start: usize, end: usize) -> Body {
    let mut body = Body::default();
    let mut open: Option<(usize, String)> = None;
    let mut first_content_line = true;

    for (line_start, line_end, next) in lines_in(text, start, end) {
        let line = &text[line_start..line_end];

        if let Some((drawer_start, name)) = &open {
            if line.trim().eq_ignore_ascii_case(":END:") {
                body.drawers.push(*drawer_start..next);
                open = None;
            } else if name == "PROPERTIES" {
                if let Some(caps) = PROPERTY_RE.captures(line) {
                    body.properties
                        .insert(caps[1].to_ascii_uppercase(), caps[2].to_string());
                }
            }
            continue;
        }

        if first_content_line && !line.trim().is_empty() {
            first_content_line = false;
            if PLANNING_RE.is_match(line) {
                body.planning = parse_planning(line);
                continue;
            }
        }

        if let Some(caps) = DRAWER_OPEN_RE.captures(line) {
            let name = caps[1].to_ascii_uppercase();
            if name != "END" {
                open = Some((line_start, name));
            }
        }
    }

    body
}

/// Derive the full outline from raw headings
pub(crate) fn build_outline(text: &str, raw: Vec<RawHeading>, settings: FileSettings) -> Outline {
    let len = text.len();
    let mut headings: Vec<Heading> = Vec::with_capacity(raw.len());
    let mut stack: Vec<usize> = Vec::new();

    for (i, r) in raw.iter().enumerate() {
        let contents_begin = if r.line_end < len { r.line_end + 1 } else { len };
        let entry_end = raw.get(i + 1).map_or(len, |n| n.begin);
        let subtree_end = raw[i + 1..]
            .iter()
            .find(|n| n.level <= r.level)
            .map_or(len, |n| n.begin);

        while let Some(&top) = stack.last() {
            if headings[top].level >= r.level {
                stack.pop();
            } else {
                break;
            }
        }
        let parent = stack.last().copied();

        let headline = parse_headline(&r.text, &settings.keywords);
        let body = scan_body(text, contents_begin.min(entry_end), entry_end);

        let (parent_path, parent_tags, parent_category) = match parent {
            Some(p) => (
                headings[p].path.clone(),
                headings[p].tags.clone(),
                headings[p].category.clone(),
            ),
            None => (
                HeadingPath::root(),
                settings.file_tags.clone(),
                settings.category.clone(),
            ),
        };

        let mut tags = parent_tags;
        for tag in &headline.tags {
            if !tags.contains(tag) {
                tags.push(tag.clone());
            }
        }

        let category = body
            .properties
            .get("CATEGORY")
            .cloned()
            .or(parent_category);

        headings.push(Heading {
            level: r.level,
            todo: headline.todo,
            done: headline.done,
            priority: headline.priority,
            path: parent_path.child(headline.title.clone()),
            title: headline.title,
            local_tags: headline.tags,
            tags,
            category,
            planning: body.planning,
            properties: body.properties,
            parent,
            begin: r.begin,
            marker_end: r.marker_end,
            contents_begin: contents_begin.min(entry_end),
            entry_end,
            subtree_end,
            drawers: body.drawers,
        });
        stack.push(i);
    }

    Outline {
        headings,
        category: settings.category,
        file_tags: settings.file_tags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headline_full() {
        let h = parse_headline("TODO [#A] Write report :work:urgent:", &TodoKeywords::default());
        assert_eq!(h.todo.as_deref(), Some("TODO"));
        assert!(!h.done);
        assert_eq!(h.priority, Some('A'));
        assert_eq!(h.title, "Write report");
        assert_eq!(h.tags.as_slice(), &["work".to_string(), "urgent".to_string()]);
    }

    #[test]
    fn headline_plain() {
        let h = parse_headline("Notes about TODO lists", &TodoKeywords::default());
        assert!(h.todo.is_none());
        assert_eq!(h.title, "Notes about TODO lists");
    }

    #[test]
    fn headline_done_keyword() {
        let h = parse_headline("DONE Ship it", &TodoKeywords::default());
        assert_eq!(h.todo.as_deref(), Some("DONE"));
        assert!(h.done);
    }

    #[test]
    fn keyword_spec_with_bar() {
        let kw = TodoKeywords::from_spec("TODO(t) STARTED | DONE(d) CANCELED");
        assert_eq!(kw.active, vec!["TODO", "STARTED"]);
        assert_eq!(kw.done, vec!["DONE", "CANCELED"]);
    }

    #[test]
    fn keyword_spec_without_bar() {
        let kw = TodoKeywords::from_spec("OPEN CLOSED");
        assert_eq!(kw.classify("OPEN"), Some(false));
        assert_eq!(kw.classify("CLOSED"), Some(true));
    }

    #[test]
    fn planning_line() {
        let p = parse_planning("SCHEDULED: <2024-05-01 Wed 09:00> DEADLINE: <2024-05-03 Fri>");
        assert_eq!(p.scheduled.unwrap().date.to_string(), "2024-05-01");
        assert!(p.scheduled.unwrap().time.is_some());
        assert_eq!(p.deadline.unwrap().date.to_string(), "2024-05-03");
        assert!(p.closed.is_none());
    }

    #[test]
    fn detect_format() {
        assert_eq!(SourceFormat::detect(Path::new("notes.md")), SourceFormat::Markdown);
        assert_eq!(SourceFormat::detect(Path::new("todo.org")), SourceFormat::Org);
        assert_eq!(SourceFormat::detect(Path::new("README")), SourceFormat::Org);
    }
}
