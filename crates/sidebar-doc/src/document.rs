//! Shared document storage
//!
//! A [`Document`] is the text storage every view of one outline shares:
//! text, parsed outline, content revision and the tables of live markers
//! and view fold sets.
//! Cloning a `Document` clones the handle, not the text; edits through any
//! handle are visible through all of them.

use crate::error::{DocError, ParseError};
use crate::hash::ContentHash;
use crate::heading::{Heading, Outline};
use crate::marker::Marker;
use crate::parsers::SourceFormat;
use crate::visibility::{RangeSet, Visibility};
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use ulid::Ulid;

/// Unique document identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(pub Ulid);

impl DocumentId {
    /// Generate new document ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug)]
pub(crate) struct TextStore {
    id: DocumentId,
    name: String,
    format: SourceFormat,
    text: String,
    outline: Arc<Outline>,
    revision: ContentHash,
    alive: bool,
    markers: Vec<Weak<AtomicUsize>>,
    folds: Vec<Weak<Mutex<RangeSet>>>,
}

impl TextStore {
    fn for_each_fold(&mut self, mut f: impl FnMut(&mut RangeSet)) {
        self.folds.retain(|weak| match weak.upgrade() {
            Some(set) => {
                f(&mut *set.lock());
                true
            }
            None => false,
        });
    }

    fn prune(&mut self) {
        self.markers.retain(|w| w.strong_count() > 0);
        self.folds.retain(|w| w.strong_count() > 0);
    }

    fn shift_for_insert(&mut self, pos: usize, len: usize) {
        self.for_each_fold(|set| set.shift_for_insert(pos, len));
        self.markers.retain(|weak| match weak.upgrade() {
            Some(cell) => {
                let offset = cell.load(Ordering::Relaxed);
                // A marker at the insertion point stays before the new text
                if offset > pos {
                    cell.store(offset + len, Ordering::Relaxed);
                }
                true
            }
            None => false,
        });
    }

    fn shift_for_delete(&mut self, range: &Range<usize>) {
        self.for_each_fold(|set| set.shift_for_delete(range));
        let removed = range.end - range.start;
        self.markers.retain(|weak| match weak.upgrade() {
            Some(cell) => {
                let offset = cell.load(Ordering::Relaxed);
                if offset >= range.end {
                    cell.store(offset - removed, Ordering::Relaxed);
                } else if offset > range.start {
                    cell.store(range.start, Ordering::Relaxed);
                }
                true
            }
            None => false,
        });
    }

    fn clamp_markers(&mut self) {
        let len = self.text.len();
        self.for_each_fold(|set| set.clamp(len));
        self.markers.retain(|weak| match weak.upgrade() {
            Some(cell) => {
                let offset = cell.load(Ordering::Relaxed);
                if offset > len {
                    cell.store(len, Ordering::Relaxed);
                }
                true
            }
            None => false,
        });
    }

    fn ensure_alive(&self) -> Result<(), DocError> {
        if self.alive {
            Ok(())
        } else {
            Err(DocError::stale(&self.name))
        }
    }

    fn commit(&mut self, text: String) -> Result<(), ParseError> {
        let outline = self.format.parser().parse(&text)?;
        self.revision = ContentHash::of_text(&text);
        self.outline = Arc::new(outline);
        self.text = text;
        Ok(())
    }
}

/// Handle to shared outline text storage
#[derive(Clone)]
pub struct Document {
    inner: Arc<RwLock<TextStore>>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let store = self.inner.read();
        f.debug_struct("Document")
            .field("id", &store.id)
            .field("name", &store.name)
            .field("len", &store.text.len())
            .field("headings", &store.outline.headings.len())
            .field("alive", &store.alive)
            .finish()
    }
}

impl Document {
    /// Parse text into a new document
    ///
    /// # Errors
    /// Returns error if the parser rejects the text
    pub fn parse(
        name: impl Into<String>,
        format: SourceFormat,
        text: impl Into<String>,
    ) -> Result<Self, ParseError> {
        let text = text.into();
        let outline = format.parser().parse(&text)?;
        let name = name.into();
        tracing::debug!(document = %name, headings = outline.headings.len(), "document loaded");
        Ok(Self {
            inner: Arc::new(RwLock::new(TextStore {
                id: DocumentId::new(),
                name,
                format,
                revision: ContentHash::of_text(&text),
                outline: Arc::new(outline),
                text,
                alive: true,
                markers: Vec::new(),
                folds: Vec::new(),
            })),
        })
    }

    /// Parse an org-style document
    ///
    /// # Errors
    /// Returns error if the parser rejects the text
    #[inline]
    pub fn org(name: impl Into<String>, text: impl Into<String>) -> Result<Self, ParseError> {
        Self::parse(name, SourceFormat::Org, text)
    }

    /// Parse a markdown document
    ///
    /// # Errors
    /// Returns error if the parser rejects the text
    #[inline]
    pub fn markdown(name: impl Into<String>, text: impl Into<String>) -> Result<Self, ParseError> {
        Self::parse(name, SourceFormat::Markdown, text)
    }

    /// Document identifier
    #[inline]
    #[must_use]
    pub fn id(&self) -> DocumentId {
        self.inner.read().id
    }

    /// Document name
    #[inline]
    #[must_use]
    pub fn name(&self) -> String {
        self.inner.read().name.clone()
    }

    /// Source format
    #[inline]
    #[must_use]
    pub fn format(&self) -> SourceFormat {
        self.inner.read().format
    }

    /// Copy of the full text
    #[inline]
    #[must_use]
    pub fn text(&self) -> String {
        self.inner.read().text.clone()
    }

    /// Run `f` over the text without copying it
    pub fn with_text<R>(&self, f: impl FnOnce(&str) -> R) -> R {
        f(&self.inner.read().text)
    }

    /// Text length in bytes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().text.len()
    }

    /// Check if the document is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current parsed outline
    #[inline]
    #[must_use]
    pub fn outline(&self) -> Arc<Outline> {
        Arc::clone(&self.inner.read().outline)
    }

    /// Current content revision
    #[inline]
    #[must_use]
    pub fn revision(&self) -> ContentHash {
        self.inner.read().revision
    }

    /// Check if the document has not been killed
    #[inline]
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.inner.read().alive
    }

    /// Check whether two handles share one text storage
    #[inline]
    #[must_use]
    pub fn same_storage(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Innermost heading whose entry contains `pos`
    #[must_use]
    pub fn heading_at(&self, pos: usize) -> Option<Heading> {
        self.inner.read().outline.heading_at(pos).cloned()
    }

    /// Weak handle that does not keep the storage alive
    #[must_use]
    pub fn downgrade(&self) -> WeakDocument {
        WeakDocument {
            inner: Arc::downgrade(&self.inner),
            name: self.name(),
        }
    }

    /// Create a marker at `offset` that follows later edits
    ///
    /// # Errors
    /// Returns error if the document is dead or `offset` is past the end
    pub fn marker(&self, offset: usize) -> Result<Marker, DocError> {
        let mut store = self.inner.write();
        store.ensure_alive()?;
        if offset > store.text.len() {
            return Err(DocError::OutOfRange {
                offset,
                len: store.text.len(),
            });
        }
        store.prune();
        let cell = Arc::new(AtomicUsize::new(offset));
        store.markers.push(Arc::downgrade(&cell));
        drop(store);
        Ok(Marker::new(self.downgrade(), cell))
    }

    /// Register a view's fold set so edits shift its hidden ranges
    pub(crate) fn track(&self, visibility: &Visibility) {
        let mut store = self.inner.write();
        store.prune();
        store.folds.push(visibility.downgrade());
    }

    /// Number of live markers and fold sets the document is tracking
    #[must_use]
    pub fn tracked(&self) -> usize {
        let mut store = self.inner.write();
        store.prune();
        store.markers.len() + store.folds.len()
    }

    /// Insert text at `offset`
    ///
    /// # Errors
    /// Returns error if the document is dead or `offset` is invalid
    pub fn insert(&self, offset: usize, text: &str) -> Result<(), DocError> {
        let mut store = self.inner.write();
        store.ensure_alive()?;
        if offset > store.text.len() || !store.text.is_char_boundary(offset) {
            return Err(DocError::OutOfRange {
                offset,
                len: store.text.len(),
            });
        }
        let mut new_text = store.text.clone();
        new_text.insert_str(offset, text);
        store.commit(new_text)?;
        store.shift_for_insert(offset, text.len());
        Ok(())
    }

    /// Delete the byte range `range`
    ///
    /// # Errors
    /// Returns error if the document is dead or `range` is invalid
    pub fn delete(&self, range: Range<usize>) -> Result<(), DocError> {
        let mut store = self.inner.write();
        store.ensure_alive()?;
        let len = store.text.len();
        if range.start > range.end
            || range.end > len
            || !store.text.is_char_boundary(range.start)
            || !store.text.is_char_boundary(range.end)
        {
            return Err(DocError::InvalidRange { range, len });
        }
        let mut new_text = store.text.clone();
        new_text.replace_range(range.clone(), "");
        store.commit(new_text)?;
        store.shift_for_delete(&range);
        Ok(())
    }

    /// Replace the whole text (reload from disk); markers are clamped
    ///
    /// # Errors
    /// Returns error if the document is dead or the new text fails to parse
    pub fn replace_text(&self, text: impl Into<String>) -> Result<(), DocError> {
        let mut store = self.inner.write();
        store.ensure_alive()?;
        store.commit(text.into())?;
        store.clamp_markers();
        Ok(())
    }

    /// Destroy the document; all markers into it become stale
    pub fn kill(&self) {
        let mut store = self.inner.write();
        if store.alive {
            tracing::debug!(document = %store.name, "document killed");
        }
        store.alive = false;
        store.markers.clear();
        store.folds.clear();
    }
}

/// Non-owning document handle
#[derive(Clone)]
pub struct WeakDocument {
    inner: Weak<RwLock<TextStore>>,
    name: String,
}

impl fmt::Debug for WeakDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakDocument").field("name", &self.name).finish()
    }
}

impl WeakDocument {
    /// Name the document had when the handle was taken
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Recover a live document handle
    ///
    /// # Errors
    /// Returns `StaleReference` if the document was killed or dropped
    pub fn upgrade(&self) -> Result<Document, DocError> {
        let inner = self
            .inner
            .upgrade()
            .ok_or_else(|| DocError::stale(&self.name))?;
        let doc = Document { inner };
        if doc.is_alive() {
            Ok(doc)
        } else {
            Err(DocError::stale(&self.name))
        }
    }

    /// Check whether this handle points at `doc`'s storage
    #[inline]
    #[must_use]
    pub fn points_to(&self, doc: &Document) -> bool {
        Weak::ptr_eq(&self.inner, &Arc::downgrade(&doc.inner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Document {
        Document::org("tasks.org", "* TODO a\n* TODO b\n").unwrap()
    }

    #[test]
    fn clones_share_storage() {
        let a = doc();
        let b = a.clone();
        b.insert(0, "#+CATEGORY: x\n").unwrap();
        assert!(a.same_storage(&b));
        assert!(a.text().starts_with("#+CATEGORY"));
        assert_eq!(a.outline().headings[0].category.as_deref(), Some("x"));
    }

    #[test]
    fn edits_change_revision() {
        let d = doc();
        let before = d.revision();
        d.insert(d.len(), "* c\n").unwrap();
        assert_ne!(before, d.revision());
        assert_eq!(d.outline().headings.len(), 3);
    }

    #[test]
    fn markers_follow_edits() {
        let d = doc();
        let second = d.outline().headings[1].begin;
        let m = d.marker(second).unwrap();
        let at_start = d.marker(0).unwrap();

        d.insert(0, "* new\n").unwrap();
        assert_eq!(m.offset(), second + 6);
        assert_eq!(at_start.offset(), 0);

        d.delete(0..6).unwrap();
        assert_eq!(m.offset(), second);

        d.delete(0..second + 2).unwrap();
        assert_eq!(m.offset(), 0);
    }

    #[test]
    fn dropped_markers_are_pruned() {
        let d = doc();
        let kept = d.marker(0).unwrap();
        for _ in 0..10 {
            let _ = d.marker(2).unwrap();
        }
        let _last = d.marker(3).unwrap();
        assert_eq!(d.tracked(), 2);
        drop(kept);
        assert_eq!(d.tracked(), 1);
    }

    #[test]
    fn kill_makes_weak_stale() {
        let d = doc();
        let weak = d.downgrade();
        assert!(weak.upgrade().is_ok());
        d.kill();
        assert!(weak.upgrade().unwrap_err().is_stale());
        assert!(d.insert(0, "x").unwrap_err().is_stale());
    }

    #[test]
    fn dropped_document_is_stale() {
        let weak = doc().downgrade();
        assert!(weak.upgrade().unwrap_err().is_stale());
    }

    #[test]
    fn invalid_ranges_rejected() {
        let d = doc();
        assert!(matches!(d.insert(999, "x"), Err(DocError::OutOfRange { .. })));
        #[allow(clippy::reversed_empty_ranges)]
        let reversed = 5..2;
        assert!(matches!(d.delete(reversed), Err(DocError::InvalidRange { .. })));
        assert!(d.marker(d.len() + 1).is_err());
    }
}
