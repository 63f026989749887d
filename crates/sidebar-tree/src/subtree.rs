//! Subtree views
//!
//! A [`SubtreeView`] is an indirect view restricted to one heading: its own
//! entry for [`Depth::None`], its whole subtree otherwise, folded to the
//! requested depth.

use crate::error::TreeResult;
use sidebar_doc::{Depth, Document, DocumentView, Heading, ViewKind};
use std::ops::Range;

/// Check whether another heading starts inside the subtree of `heading`
#[inline]
#[must_use]
pub fn has_children(heading: &Heading) -> bool {
    heading.subtree_end > heading.entry_end
}

/// Check whether the heading containing `pos` has nested headings
///
/// False when `pos` precedes the first heading.
#[must_use]
pub fn children_present(doc: &Document, pos: usize) -> bool {
    doc.heading_at(pos).is_some_and(|h| has_children(&h))
}

/// Name of the subtree view of `heading` in `doc`
#[must_use]
pub fn subtree_name(doc: &Document, heading: &Heading) -> String {
    format!("{}::{}", doc.name(), heading.title)
}

/// View scoped to one heading
#[derive(Debug, Clone)]
pub struct SubtreeView {
    view: DocumentView,
    title: String,
    depth: Depth,
    range: Range<usize>,
}

impl SubtreeView {
    /// Build the view of `heading` at `depth`
    ///
    /// # Errors
    /// Returns error if the document is gone or the heading is out of date
    pub fn build(doc: &Document, heading: &Heading, depth: Depth) -> TreeResult<Self> {
        let end = if depth.includes_descendants() {
            heading.subtree_end
        } else {
            heading.entry_end
        };
        let range = heading.begin..end;

        let name = subtree_name(doc, heading);
        let mut view = DocumentView::indirect(name, doc.clone(), ViewKind::Subtree);
        view.narrow(range.clone())?;
        view.set_point(heading.begin);
        view.apply_depth(heading, depth);

        tracing::debug!(view = view.name(), %depth, ?range, "built subtree view");
        Ok(Self {
            view,
            title: heading.title.clone(),
            depth,
            range,
        })
    }

    /// Depth used when the caller names none
    #[must_use]
    pub fn default_depth(heading: &Heading) -> Depth {
        if has_children(heading) {
            Depth::Children
        } else {
            Depth::None
        }
    }

    /// Underlying view
    #[inline]
    #[must_use]
    pub fn view(&self) -> &DocumentView {
        &self.view
    }

    /// View name, `DOCUMENT::TITLE`
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.view.name()
    }

    /// Title of the root heading
    #[inline]
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Depth the view was folded to
    #[inline]
    #[must_use]
    pub fn depth(&self) -> Depth {
        self.depth
    }

    /// Byte range the view is restricted to, at build time
    #[inline]
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }
}
