//! Views over shared documents
//!
//! A [`DocumentView`] is one window onto a [`Document`]: it shares the
//! document's text with every other view but owns its narrowing, its
//! folding state and its point. Folding commands here operate on whole
//! headings the way an outline editor does; they are not a general folding
//! engine.

use crate::document::Document;
use crate::error::DocError;
use crate::heading::Heading;
use crate::marker::Marker;
use crate::parsers::lines_in;
use crate::visibility::Visibility;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use ulid::Ulid;

/// Unique view identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewId(pub Ulid);

impl ViewId {
    /// Generate new view ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for ViewId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How much of a subtree becomes visible
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Depth {
    /// The entry alone, body included
    #[default]
    None,
    /// Direct child headings
    Children,
    /// Every descendant heading, no bodies
    Branches,
    /// Every descendant heading and body, drawers folded
    Entries,
}

impl Depth {
    /// Map a repeated-trigger count: 1 none, 2 children, 3 branches, 4+ entries
    #[must_use]
    pub fn from_repeat_count(count: usize) -> Self {
        match count {
            0 | 1 => Self::None,
            2 => Self::Children,
            3 => Self::Branches,
            _ => Self::Entries,
        }
    }

    /// Map a multiplicative prefix argument: 1, 4, 16, 64
    #[must_use]
    pub fn from_prefix_arg(arg: u32) -> Self {
        let mut n = arg;
        let mut presses = 1;
        while n >= 4 {
            n /= 4;
            presses += 1;
        }
        Self::from_repeat_count(presses)
    }

    /// Check whether the depth reaches below the entry itself
    #[inline]
    #[must_use]
    pub fn includes_descendants(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Children => "children",
            Self::Branches => "branches",
            Self::Entries => "entries",
        })
    }
}

impl FromStr for Depth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "entry" => Ok(Self::None),
            "children" => Ok(Self::Children),
            "branches" => Ok(Self::Branches),
            "entries" => Ok(Self::Entries),
            other => Err(format!("unknown depth '{other}'")),
        }
    }
}

/// How a view relates to its document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    /// The document's own view
    Base,
    /// Tree mirror sharing the document's storage
    Mirror,
    /// View scoped to one heading's subtree
    Subtree,
}

impl ViewKind {
    /// Check if the view shares storage with a base view
    #[inline]
    #[must_use]
    pub fn is_indirect(self) -> bool {
        !matches!(self, Self::Base)
    }
}

/// A view over a shared document
#[derive(Debug)]
pub struct DocumentView {
    id: ViewId,
    name: String,
    document: Document,
    kind: ViewKind,
    narrowing: Option<(Marker, Marker)>,
    visibility: Visibility,
    point: usize,
}

impl Clone for DocumentView {
    fn clone(&self) -> Self {
        let visibility = self.visibility.clone();
        self.document.track(&visibility);
        Self {
            id: self.id,
            name: self.name.clone(),
            document: self.document.clone(),
            kind: self.kind,
            narrowing: self.narrowing.clone(),
            visibility,
            point: self.point,
        }
    }
}

impl DocumentView {
    /// Base view of `document`, named after it
    #[must_use]
    pub fn new(document: Document) -> Self {
        let name = document.name();
        Self::with_kind(name, document, ViewKind::Base)
    }

    /// Indirect view of `document` under `name`
    #[must_use]
    pub fn indirect(name: impl Into<String>, document: Document, kind: ViewKind) -> Self {
        Self::with_kind(name.into(), document, kind)
    }

    fn with_kind(name: String, document: Document, kind: ViewKind) -> Self {
        let visibility = Visibility::new();
        document.track(&visibility);
        Self {
            id: ViewId::new(),
            name,
            document,
            kind,
            narrowing: None,
            visibility,
            point: 0,
        }
    }

    /// View identifier
    #[inline]
    #[must_use]
    pub fn id(&self) -> ViewId {
        self.id
    }

    /// View name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared document
    #[inline]
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// View kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ViewKind {
        self.kind
    }

    /// Check whether this view is an indirect view over `doc`
    #[must_use]
    pub fn is_mirror_of(&self, doc: &Document) -> bool {
        self.kind.is_indirect() && self.document.same_storage(doc)
    }

    /// Folding state
    #[inline]
    #[must_use]
    pub fn visibility(&self) -> &Visibility {
        &self.visibility
    }

    // Narrowing

    /// Restrict the view to `range`
    ///
    /// # Errors
    /// Returns error if the range is invalid or the document is dead
    pub fn narrow(&mut self, range: Range<usize>) -> Result<(), DocError> {
        let len = self.document.len();
        if range.start > range.end || range.end > len {
            return Err(DocError::InvalidRange { range, len });
        }
        let start = self.document.marker(range.start)?;
        let end = self.document.marker(range.end)?;
        self.narrowing = Some((start, end));
        self.point = self.point.clamp(range.start, range.end);
        Ok(())
    }

    /// Restrict the view to the subtree of the heading containing `pos`
    ///
    /// # Errors
    /// Returns `NoHeading` if `pos` precedes the first heading
    pub fn narrow_to_subtree(&mut self, pos: usize) -> Result<(), DocError> {
        let heading = self.document.heading_at(pos).ok_or(DocError::NoHeading(pos))?;
        self.narrow(heading.begin..heading.subtree_end)
    }

    /// Remove any narrowing
    pub fn widen(&mut self) {
        self.narrowing = None;
    }

    /// Check if a narrowing is active
    #[inline]
    #[must_use]
    pub fn is_narrowed(&self) -> bool {
        self.narrowing.is_some()
    }

    /// Active narrowing, if any
    #[must_use]
    pub fn narrowing(&self) -> Option<Range<usize>> {
        self.narrowing.as_ref().map(|(s, e)| s.offset()..e.offset())
    }

    /// Accessible range: the narrowing, or the whole document
    #[must_use]
    pub fn restriction(&self) -> Range<usize> {
        let len = self.document.len();
        match self.narrowing() {
            Some(r) => r.start.min(len)..r.end.min(len),
            None => 0..len,
        }
    }

    // Point

    /// Cursor position
    #[inline]
    #[must_use]
    pub fn point(&self) -> usize {
        self.point
    }

    /// Move the cursor, clamped to the restriction
    pub fn set_point(&mut self, pos: usize) {
        let r = self.restriction();
        self.point = pos.clamp(r.start, r.end);
    }

    /// Byte offset of the start of 1-based `line` within the restriction
    #[must_use]
    pub fn line_offset(&self, line: usize) -> Option<usize> {
        let r = self.restriction();
        self.document.with_text(|text| {
            lines_in(text, r.start, r.end)
                .get(line.checked_sub(1)?)
                .map(|&(start, _, _)| start)
        })
    }

    // Headings

    /// Headings beginning inside the restriction
    #[must_use]
    pub fn headings(&self) -> Vec<Heading> {
        let r = self.restriction();
        self.document
            .outline()
            .headings
            .iter()
            .filter(|h| h.begin >= r.start && h.begin < r.end)
            .cloned()
            .collect()
    }

    /// Innermost heading containing `pos`, if inside the restriction
    #[must_use]
    pub fn heading_at(&self, pos: usize) -> Option<Heading> {
        let r = self.restriction();
        self.document
            .heading_at(pos)
            .filter(|h| h.begin >= r.start && h.begin < r.end)
    }

    /// Check whether `pos` is accessible and not folded away
    #[must_use]
    pub fn is_visible(&self, pos: usize) -> bool {
        let r = self.restriction();
        pos >= r.start && pos < r.end && !self.visibility.is_hidden(pos)
    }

    /// Check whether the heading line of `heading` is visible
    #[inline]
    #[must_use]
    pub fn is_heading_visible(&self, heading: &Heading) -> bool {
        self.is_visible(heading.begin)
    }

    // Folding

    fn clip(&self, range: Range<usize>) -> Range<usize> {
        let r = self.restriction();
        range.start.max(r.start)..range.end.min(r.end)
    }

    /// Hide all body text in the restriction, leaving every heading line
    pub fn hide_bodies(&mut self) {
        let r = self.restriction();
        let headings = self.headings();
        if let Some(first) = headings.first() {
            self.visibility.hide(r.start..first.begin);
        } else {
            self.visibility.hide(r.clone());
        }
        for h in &headings {
            let body = self.clip(h.body());
            self.visibility.hide(body);
        }
    }

    /// Show only the shallowest heading lines of the restriction
    pub fn overview(&mut self) {
        let headings = self.headings();
        let Some(top) = headings.iter().map(|h| h.level).min() else {
            return;
        };
        self.hide_bodies();
        for h in headings.iter().filter(|h| h.level == top) {
            self.hide_subtree(h);
        }
    }

    /// Fold everything below the heading line
    pub fn hide_subtree(&mut self, heading: &Heading) {
        let range = self.clip(heading.contents_begin..heading.subtree_end);
        self.visibility.hide(range);
    }

    /// Reveal the heading line of `heading`
    pub fn show_heading(&mut self, heading: &Heading) {
        let range = self.clip(heading.begin..heading.contents_begin);
        self.visibility.show(range);
    }

    /// Reveal the heading line and own body of `heading`
    pub fn show_entry(&mut self, heading: &Heading) {
        let range = self.clip(heading.begin..heading.entry_end);
        self.visibility.show(range);
    }

    /// Fold the subtree and reveal the direct child heading lines
    pub fn show_children(&mut self, heading: &Heading) {
        self.hide_subtree(heading);
        for child in self.child_headings(heading) {
            self.show_heading(&child);
        }
    }

    /// Fold the subtree and reveal every descendant heading line
    pub fn show_branches(&mut self, heading: &Heading) {
        self.hide_subtree(heading);
        for h in self.descendant_headings(heading) {
            self.show_heading(&h);
        }
    }

    /// Reveal the whole subtree except drawers
    pub fn show_entries(&mut self, heading: &Heading) {
        let range = self.clip(heading.begin..heading.subtree_end);
        self.visibility.show(range);
        let drawers: Vec<Range<usize>> = std::iter::once(heading.clone())
            .chain(self.descendant_headings(heading))
            .flat_map(|h| h.drawers)
            .collect();
        for drawer in drawers {
            let range = self.clip(drawer);
            self.visibility.hide(range);
        }
    }

    /// Fold or reveal the subtree of `heading` to `depth`
    pub fn apply_depth(&mut self, heading: &Heading, depth: Depth) {
        match depth {
            Depth::None => {}
            Depth::Children => self.show_children(heading),
            Depth::Branches => self.show_branches(heading),
            Depth::Entries => self.show_entries(heading),
        }
    }

    /// Reveal the heading line and all ancestor heading lines
    pub fn reveal(&mut self, heading: &Heading) {
        let outline = self.document.outline();
        let mut parent = heading.parent;
        while let Some(p) = parent {
            let ancestor = &outline.headings[p];
            let range = self.clip(ancestor.begin..ancestor.contents_begin);
            self.visibility.show(range);
            parent = ancestor.parent;
        }
        self.show_heading(heading);
    }

    /// Check whether every direct child heading is visible
    #[must_use]
    pub fn children_shown(&self, heading: &Heading) -> bool {
        let children = self.child_headings(heading);
        !children.is_empty() && children.iter().all(|c| self.is_heading_visible(c))
    }

    /// Direct child headings of `heading`
    #[must_use]
    pub fn child_headings(&self, heading: &Heading) -> Vec<Heading> {
        let outline = self.document.outline();
        match outline.headings.binary_search_by_key(&heading.begin, |h| h.begin) {
            Ok(index) => outline.children(index).cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    /// All descendant headings of `heading`
    #[must_use]
    pub fn descendant_headings(&self, heading: &Heading) -> Vec<Heading> {
        let outline = self.document.outline();
        match outline.headings.binary_search_by_key(&heading.begin, |h| h.begin) {
            Ok(index) => outline.descendants(index).cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Reveal everything
    pub fn show_all(&mut self) {
        self.visibility.clear();
    }

    // Rendering

    /// Visible lines of the restriction; folded content shows as `...`
    #[must_use]
    pub fn render(&self) -> String {
        let r = self.restriction();
        self.document.with_text(|text| {
            let lines = lines_in(text, r.start, r.end);
            let mut out = String::new();
            for (i, &(start, end, _)) in lines.iter().enumerate() {
                if self.visibility.is_hidden(start) {
                    continue;
                }
                out.push_str(&text[start..end]);
                let folded = lines
                    .get(i + 1)
                    .is_some_and(|&(next, _, _)| self.visibility.is_hidden(next));
                if folded {
                    out.push_str("...");
                }
                out.push('\n');
            }
            out
        })
    }

    /// Visible lines with their starting offsets
    #[must_use]
    pub fn visible_lines(&self) -> Vec<(usize, String)> {
        let r = self.restriction();
        self.document.with_text(|text| {
            lines_in(text, r.start, r.end)
                .into_iter()
                .filter(|&(start, _, _)| !self.visibility.is_hidden(start))
                .map(|(start, end, _)| (start, text[start..end].to_string()))
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "\
* Parent
Parent body.
** Child one
Child one body.
*** Grandchild
Grandchild body.
** Child two
:PROPERTIES:
:ID: 2
:END:
Child two body.
* Sibling
Sibling body.
";

    fn view() -> DocumentView {
        DocumentView::new(Document::org("t.org", TEXT).unwrap())
    }

    fn lines(v: &DocumentView) -> Vec<String> {
        v.visible_lines().into_iter().map(|(_, l)| l).collect()
    }

    #[test]
    fn hide_bodies_keeps_headings() {
        let mut v = view();
        v.hide_bodies();
        assert_eq!(
            lines(&v),
            vec!["* Parent", "** Child one", "*** Grandchild", "** Child two", "* Sibling"]
        );
    }

    #[test]
    fn show_children_only_direct() {
        let mut v = view();
        let parent = v.headings()[0].clone();
        v.show_children(&parent);
        let visible = lines(&v);
        assert!(visible.contains(&"** Child one".to_string()));
        assert!(visible.contains(&"** Child two".to_string()));
        assert!(!visible.contains(&"*** Grandchild".to_string()));
        assert!(!visible.contains(&"Parent body.".to_string()));
        assert!(v.children_shown(&parent));
    }

    #[test]
    fn show_entries_hides_drawers() {
        let mut v = view();
        let parent = v.headings()[0].clone();
        v.hide_subtree(&parent);
        v.show_entries(&parent);
        let visible = lines(&v);
        assert!(visible.contains(&"Child two body.".to_string()));
        assert!(!visible.contains(&":ID: 2".to_string()));
    }

    #[test]
    fn narrowing_restricts_headings() {
        let mut v = view();
        let parent_begin = v.headings()[0].begin;
        v.narrow_to_subtree(parent_begin).unwrap();
        assert_eq!(v.headings().len(), 4);
        assert!(v.render().starts_with("* Parent\n"));
        assert!(!v.render().contains("Sibling"));
        v.widen();
        assert_eq!(v.headings().len(), 5);
    }

    #[test]
    fn narrowing_follows_edits() {
        let mut v = view();
        let sibling = v.headings()[4].clone();
        v.narrow(sibling.begin..sibling.subtree_end).unwrap();
        v.document().insert(0, "#+TITLE: t\n").unwrap();
        assert_eq!(v.headings().len(), 1);
        assert_eq!(v.headings()[0].title, "Sibling");
    }

    #[test]
    fn render_marks_folds() {
        let mut v = view();
        v.overview();
        assert_eq!(v.render(), "* Parent...\n* Sibling...\n");
    }

    #[test]
    fn views_share_text_not_folding() {
        let base = view();
        let mut mirror = DocumentView::indirect("<tree>t.org", base.document().clone(), ViewKind::Mirror);
        mirror.overview();
        assert!(mirror.is_mirror_of(base.document()));
        assert!(base.visibility().is_empty());
        base.document().insert(base.document().len(), "* Added\n").unwrap();
        assert!(mirror.render().contains("* Added"));
    }

    #[test]
    fn folds_follow_edits_before_them() {
        let mut v = view();
        v.overview();
        v.document().insert(0, "#+AUTHOR: someone\n").unwrap();
        assert_eq!(v.render(), "#+AUTHOR: someone\n* Parent...\n* Sibling...\n");

        v.document().delete(0.."#+AUTHOR: someone\n".len()).unwrap();
        assert_eq!(v.render(), "* Parent...\n* Sibling...\n");
    }

    #[test]
    fn cloned_view_folds_independently() {
        let mut a = view();
        a.overview();
        let mut b = a.clone();
        b.show_all();
        a.document().insert(0, "#+TITLE: t\n").unwrap();
        assert_eq!(a.render(), "#+TITLE: t\n* Parent...\n* Sibling...\n");
        assert!(b.render().contains("Parent body."));
    }

    #[test]
    fn depth_mappings() {
        assert_eq!(Depth::from_repeat_count(1), Depth::None);
        assert_eq!(Depth::from_repeat_count(2), Depth::Children);
        assert_eq!(Depth::from_repeat_count(3), Depth::Branches);
        assert_eq!(Depth::from_repeat_count(4), Depth::Entries);
        assert_eq!(Depth::from_prefix_arg(1), Depth::None);
        assert_eq!(Depth::from_prefix_arg(4), Depth::Children);
        assert_eq!(Depth::from_prefix_arg(16), Depth::Branches);
        assert_eq!(Depth::from_prefix_arg(64), Depth::Entries);
        assert_eq!("Branches".parse::<Depth>().unwrap(), Depth::Branches);
        assert!(!Depth::None.includes_descendants());
    }

    #[test]
    fn line_offsets() {
        let v = view();
        assert_eq!(v.line_offset(1), Some(0));
        assert_eq!(v.line_offset(2), Some("* Parent\n".len()));
        assert_eq!(v.line_offset(0), None);
        assert_eq!(v.line_offset(999), None);
    }
}
