//! Predicate evaluation over document views
//!
//! The [`QueryEvaluator`] trait is the seam to whatever engine answers
//! queries; [`OutlineQueryEngine`] is the built-in one. It walks the
//! headings of each view, matches them against a compiled [`Predicate`]
//! and returns live [`EntryRef`]s sorted by the requested keys.

use crate::error::QueryResult;
use crate::predicate::{PlanningKind, Predicate};
use crate::sort::{sort_entries, SortKey};
use chrono::{Local, NaiveDate};
use sidebar_doc::{DocumentView, EntryRef, Heading, Outline};

/// Options forwarded with every query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    /// Only return entries inside each view's narrowing
    pub restrict_to_visible_range: bool,
    /// Sort keys, applied lexicographically
    pub sort: Vec<SortKey>,
    /// Date that `today` and day offsets resolve against
    pub today: NaiveDate,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            restrict_to_visible_range: false,
            sort: Vec::new(),
            today: Local::now().date_naive(),
        }
    }
}

impl QueryOptions {
    /// Builder: restrict to the visible range
    #[must_use]
    pub fn with_narrow(mut self, narrow: bool) -> Self {
        self.restrict_to_visible_range = narrow;
        self
    }

    /// Builder: set sort keys
    #[must_use]
    pub fn with_sort(mut self, sort: Vec<SortKey>) -> Self {
        self.sort = sort;
        self
    }

    /// Builder: set the evaluation date
    #[must_use]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }
}

/// Engine that answers predicates over documents
pub trait QueryEvaluator: Send + Sync + std::fmt::Debug {
    /// Return matching entries with live markers, sorted per `options`
    ///
    /// # Errors
    /// Returns error if a document behind a view is gone
    fn evaluate(
        &self,
        views: &[DocumentView],
        predicate: &Predicate,
        options: &QueryOptions,
    ) -> QueryResult<Vec<EntryRef>>;
}

/// Built-in evaluator over parsed outlines
#[derive(Debug, Clone, Copy, Default)]
pub struct OutlineQueryEngine;

impl OutlineQueryEngine {
    /// Create new engine
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl QueryEvaluator for OutlineQueryEngine {
    fn evaluate(
        &self,
        views: &[DocumentView],
        predicate: &Predicate,
        options: &QueryOptions,
    ) -> QueryResult<Vec<EntryRef>> {
        let mut entries = Vec::new();

        for view in views {
            let doc = view.document();
            if !doc.is_alive() {
                return Err(sidebar_doc::DocError::stale(view.name()).into());
            }
            let outline = doc.outline();
            let range = if options.restrict_to_visible_range {
                view.restriction()
            } else {
                0..doc.len()
            };
            let name = doc.name();

            // Match under the read lock; markers are taken afterwards
            let matched: Vec<usize> = doc.with_text(|text| {
                let matcher = Matcher {
                    outline: &outline,
                    text,
                    document: &name,
                    today: options.today,
                };
                outline
                    .headings
                    .iter()
                    .enumerate()
                    .filter(|(_, h)| h.begin >= range.start && h.begin < range.end)
                    .filter(|(i, _)| matcher.matches(predicate, *i))
                    .map(|(i, _)| i)
                    .collect()
            });

            tracing::debug!(document = %name, matched = matched.len(), "query evaluated");
            for index in matched {
                entries.push(EntryRef::new(doc, &outline, &outline.headings[index])?);
            }
        }

        sort_entries(&mut entries, &options.sort);
        Ok(entries)
    }
}

struct Matcher<'a> {
    outline: &'a Outline,
    text: &'a str,
    document: &'a str,
    today: NaiveDate,
}

impl Matcher<'_> {
    fn matches(&self, predicate: &Predicate, index: usize) -> bool {
        let h = &self.outline.headings[index];
        match predicate {
            Predicate::True => true,
            Predicate::Todo(keywords) if keywords.is_empty() => h.is_open_todo(),
            Predicate::Todo(keywords) => h
                .todo
                .as_ref()
                .is_some_and(|t| keywords.iter().any(|k| k == t)),
            Predicate::Done => h.todo.is_some() && h.done,
            Predicate::Tags(tags) if tags.is_empty() => !h.tags.is_empty(),
            Predicate::Tags(tags) => tags.iter().any(|t| h.has_tag(t)),
            Predicate::TagsLocal(tags) if tags.is_empty() => !h.local_tags.is_empty(),
            Predicate::TagsLocal(tags) => tags
                .iter()
                .any(|t| h.local_tags.iter().any(|l| l.eq_ignore_ascii_case(t))),
            Predicate::Priority(test) => test.matches(h.priority),
            Predicate::Planning(kind, range) => self
                .planning_dates(h, *kind)
                .into_iter()
                .any(|d| range.contains(d, self.today)),
            Predicate::Level { min, max } => h.level >= *min && h.level <= *max,
            Predicate::Heading(patterns) => patterns.iter().all(|re| re.is_match(&h.title)),
            Predicate::Regexp(patterns) => {
                let entry = &self.text[h.begin..h.entry_end];
                patterns.iter().all(|re| re.is_match(entry))
            }
            Predicate::Property { key, value } => match (h.properties.get(key), value) {
                (Some(actual), Some(expected)) => actual == expected,
                (Some(_), None) => true,
                (None, _) => false,
            },
            Predicate::Category(names) => {
                let category = self.category(h);
                names.iter().any(|n| n == category)
            }
            Predicate::And(parts) => parts.iter().all(|p| self.matches(p, index)),
            Predicate::Or(parts) => parts.iter().any(|p| self.matches(p, index)),
            Predicate::Not(inner) => !self.matches(inner, index),
            Predicate::Parent(inner) => h.parent.is_some_and(|p| self.matches(inner, p)),
            Predicate::Ancestors(inner) => {
                let mut parent = h.parent;
                while let Some(p) = parent {
                    if self.matches(inner, p) {
                        return true;
                    }
                    parent = self.outline.headings[p].parent;
                }
                false
            }
        }
    }

    fn planning_dates(&self, h: &Heading, kind: PlanningKind) -> Vec<NaiveDate> {
        let p = &h.planning;
        let stamps = match kind {
            PlanningKind::Scheduled => vec![p.scheduled],
            PlanningKind::Deadline => vec![p.deadline],
            PlanningKind::Closed => vec![p.closed],
            PlanningKind::Any => vec![p.scheduled, p.deadline, p.closed],
        };
        stamps.into_iter().flatten().map(|t| t.date).collect()
    }

    fn category<'s>(&'s self, h: &'s Heading) -> &'s str {
        h.category.as_deref().unwrap_or_else(|| {
            self.document
                .rsplit_once('.')
                .map_or(self.document, |(stem, _)| stem)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use sidebar_doc::Document;

    const TEXT: &str = "\
* TODO [#A] Pay rent :home:
DEADLINE: <2024-05-01 Wed>
* DONE Renew passport
CLOSED: [2024-04-20 Sat]
* Project X :work:
:PROPERTIES:
:CATEGORY: projx
:OWNER: sam
:END:
** TODO Write spec
SCHEDULED: <2024-05-03 Fri>
** NEXT Review
*** TODO Nested detail
Mentions the budget.
";

    fn run(query: &str) -> Vec<String> {
        let doc = Document::org("life.org", TEXT).unwrap();
        let view = DocumentView::new(doc);
        let options = QueryOptions::default().with_today(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        OutlineQueryEngine
            .evaluate(&[view], &parse(query).unwrap(), &options)
            .unwrap()
            .iter()
            .map(|e| e.snapshot().title.clone())
            .collect()
    }

    #[test]
    fn todo_forms() {
        assert_eq!(run("(todo)"), vec!["Pay rent", "Write spec", "Review", "Nested detail"]);
        assert_eq!(run("(todo NEXT)"), vec!["Review"]);
        assert_eq!(run("(done)"), vec!["Renew passport"]);
    }

    #[test]
    fn tags_inherit() {
        assert_eq!(run("(tags work)"), vec!["Project X", "Write spec", "Review", "Nested detail"]);
        assert_eq!(run("(tags-local work)"), vec!["Project X"]);
    }

    #[test]
    fn planning_dates() {
        assert_eq!(run("(deadline :on today)"), vec!["Pay rent"]);
        assert_eq!(run("(scheduled :from 1 :to 7)"), vec!["Write spec"]);
        assert_eq!(run("(closed :to -1)"), vec!["Renew passport"]);
        assert_eq!(run("(planning)"), vec!["Pay rent", "Renew passport", "Write spec"]);
    }

    #[test]
    fn structure_predicates() {
        assert_eq!(run("(level 3)"), vec!["Nested detail"]);
        assert_eq!(run("(parent (heading \"review\"))"), vec!["Nested detail"]);
        assert_eq!(
            run("(and (todo) (ancestors (property owner sam)))"),
            vec!["Write spec", "Review", "Nested detail"]
        );
        assert_eq!(run("(category projx)").len(), 4);
        assert_eq!(run("(category life)"), vec!["Pay rent", "Renew passport"]);
    }

    #[test]
    fn regexp_reads_body() {
        assert_eq!(run("(regexp budget)"), vec!["Nested detail"]);
        assert_eq!(run("(not (regexp \"[a-z]\"))"), Vec::<String>::new());
    }

    #[test]
    fn priority_predicate() {
        assert_eq!(run("(priority)"), vec!["Pay rent"]);
        assert!(run("(priority < A)").is_empty());
    }
}
