//! Testing utilities for the outline sidebar workspace
//!
//! Shared fixture documents and helpers.

#![allow(missing_docs)]

use chrono::NaiveDate;
use sidebar_doc::{Document, DocumentView, Heading};

/// Ten top-level tasks; task 3 has two subtasks
pub const TEN_TASKS: &str = "\
* TODO Task 1
* TODO Task 2
* TODO Task 3
** TODO Subtask 3.1
** TODO Subtask 3.2
** DONE Subtask 3.3
* TODO Task 4
* TODO Task 5
* TODO Task 6
* TODO Task 7
* TODO Task 8
* TODO Task 9
* TODO Task 10
";

/// Mixed agenda: planning dates, priorities, categories, tags
pub const AGENDA: &str = "\
#+CATEGORY: home
* TODO [#B] Water plants :garden:
SCHEDULED: <2024-05-02 Thu>
* TODO [#A] Pay rent
DEADLINE: <2024-05-01 Wed>
* DONE Renew passport
CLOSED: [2024-04-19 Fri] SCHEDULED: <2024-04-20 Sat>
* Work
:PROPERTIES:
:CATEGORY: work
:END:
** TODO [#A] Quarterly report :urgent:
DEADLINE: <2024-05-06 Mon>
** TODO Tidy inbox
** NEXT [#C] Book travel
* TODO Call grandma
";

/// One heading with two children, the first with a grandchild
pub const TREE: &str = "\
#+TITLE: Tree
* Root
Root body.
** Child A
Child A body.
*** Grandchild
Grandchild body.
** Child B
:PROPERTIES:
:ID: b
:END:
Child B body.
* Leaf
Leaf body.
";

/// Fixed evaluation date for date-relative fixtures
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
}

pub fn org_document(name: &str, text: &str) -> Document {
    Document::org(name, text).unwrap()
}

pub fn ten_tasks() -> Document {
    org_document("tasks.org", TEN_TASKS)
}

pub fn agenda_document() -> Document {
    org_document("agenda.org", AGENDA)
}

pub fn tree_document() -> Document {
    org_document("tree.org", TREE)
}

pub fn base_view(doc: &Document) -> DocumentView {
    DocumentView::new(doc.clone())
}

/// First heading with `title`
pub fn heading(doc: &Document, title: &str) -> Heading {
    doc.outline()
        .headings
        .iter()
        .find(|h| h.title == title)
        .cloned()
        .unwrap_or_else(|| panic!("no heading titled {title:?}"))
}

/// Titles of `view`'s visible heading lines
pub fn visible_titles(view: &DocumentView) -> Vec<String> {
    view.headings()
        .into_iter()
        .filter(|h| view.is_heading_visible(h))
        .map(|h| h.title)
        .collect()
}

/// Check whether `needle` appears on a visible line of `view`
pub fn shows_text(view: &DocumentView, needle: &str) -> bool {
    view.visible_lines().iter().any(|(_, line)| line.contains(needle))
}
