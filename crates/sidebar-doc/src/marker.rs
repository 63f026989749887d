//! Markers: positions that follow edits
//!
//! A marker holds a weak handle to its document and a shared offset cell
//! registered in the document's marker table. Insertions before the marker
//! push it forward; deletions spanning it collapse it to the deletion start.

use crate::document::{Document, WeakDocument};
use crate::error::DocError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Position in a document that survives edits
#[derive(Debug, Clone)]
pub struct Marker {
    doc: WeakDocument,
    cell: Arc<AtomicUsize>,
}

impl Marker {
    pub(crate) fn new(doc: WeakDocument, cell: Arc<AtomicUsize>) -> Self {
        Self { doc, cell }
    }

    /// Last known offset (valid only while the document is alive)
    #[inline]
    #[must_use]
    pub fn offset(&self) -> usize {
        self.cell.load(Ordering::Relaxed)
    }

    /// Name of the document the marker points into
    #[inline]
    #[must_use]
    pub fn document_name(&self) -> &str {
        self.doc.name()
    }

    /// Resolve to a live document and current offset
    ///
    /// # Errors
    /// Returns `StaleReference` if the document was killed or dropped
    pub fn resolve(&self) -> Result<(Document, usize), DocError> {
        let doc = self.doc.upgrade()?;
        Ok((doc, self.offset()))
    }

    /// Check if the marker still points into a live document
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.doc.upgrade().is_ok()
    }

    /// Check whether the marker points into `doc`
    #[inline]
    #[must_use]
    pub fn belongs_to(&self, doc: &Document) -> bool {
        self.doc.points_to(doc)
    }

    /// Check whether two markers denote the same place
    #[must_use]
    pub fn same_position(&self, other: &Self) -> bool {
        self.offset() == other.offset()
            && match (self.doc.upgrade(), other.doc.upgrade()) {
                (Ok(a), Ok(b)) => a.same_storage(&b),
                _ => false,
            }
    }
}
