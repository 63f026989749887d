//! Tree mirror manager
//!
//! Owns every named tree-side view (mirrors, subtree views and any view a
//! caller registers), the mirror lifecycle, and the display slots they are
//! shown in.

use crate::error::{TreeError, TreeResult};
use crate::slots::DisplaySlots;
use crate::state::{validate_transition, MirrorState};
use crate::subtree::{children_present, SubtreeView};
use dashmap::DashMap;
use parking_lot::Mutex;
use sidebar_doc::{Depth, Document, DocumentView, ViewKind};
use sidebar_view::{SidebarError, TreeConfig};
use tracing::{debug, info, warn};

/// Handle to an open mirror
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeMirror {
    name: String,
    slot: usize,
}

impl TreeMirror {
    /// Mirror name, `<tree>DOCUMENT` by default
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display slot the mirror is shown in
    #[inline]
    #[must_use]
    pub fn slot(&self) -> usize {
        self.slot
    }
}

/// Outcome of [`TreeManager::toggle_or_jump`]
#[derive(Debug, Clone)]
pub enum TreeAction {
    /// Child headings were shown or folded in the mirror
    Toggled {
        /// Heading title
        title: String,
        /// Whether the children are now shown
        expanded: bool,
    },
    /// A subtree view was opened
    Jumped(SubtreeView),
}

/// Tree mirrors, subtree views and their display slots
#[derive(Debug, Default)]
pub struct TreeManager {
    config: TreeConfig,
    views: DashMap<String, DocumentView>,
    states: DashMap<String, MirrorState>,
    slots: Mutex<DisplaySlots>,
}

impl TreeManager {
    /// Create manager
    #[must_use]
    pub fn new(config: TreeConfig) -> Self {
        Self {
            config,
            views: DashMap::new(),
            states: DashMap::new(),
            slots: Mutex::new(DisplaySlots::new()),
        }
    }

    /// Tree settings
    #[inline]
    #[must_use]
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Canonical mirror name of `doc`
    #[must_use]
    pub fn mirror_name(&self, doc: &Document) -> String {
        format!("{}{}", self.config.mirror_prefix, doc.name())
    }

    /// Register any view under its own name, returning the one it replaced
    pub fn register(&self, view: DocumentView) -> Option<DocumentView> {
        self.views.insert(view.name().to_string(), view)
    }

    /// Snapshot of the view named `name`
    #[must_use]
    pub fn view(&self, name: &str) -> Option<DocumentView> {
        self.views.get(name).map(|v| v.value().clone())
    }

    /// Number of registered views
    #[must_use]
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// Check if no view is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Lifecycle state of mirror `name`
    #[must_use]
    pub fn state(&self, name: &str) -> MirrorState {
        self.states.get(name).map_or(MirrorState::Absent, |s| *s)
    }

    /// Displayed view names in slot order
    #[must_use]
    pub fn displayed(&self) -> Vec<String> {
        self.slots.lock().displayed().to_vec()
    }

    /// Slot showing `name`
    #[must_use]
    pub fn slot_of(&self, name: &str) -> Option<usize> {
        self.slots.lock().slot_of(name)
    }

    fn transition(&self, name: &str, to: MirrorState) -> TreeResult<()> {
        let from = self.state(name);
        validate_transition(name, from, to)?;
        if to == MirrorState::Absent {
            self.states.remove(name);
        } else {
            self.states.insert(name.to_string(), to);
        }
        debug!(mirror = name, %from, %to, "mirror transition");
        Ok(())
    }

    fn document_of(&self, name: &str) -> TreeResult<Document> {
        let doc = self
            .views
            .get(name)
            .map(|v| v.document().clone())
            .ok_or_else(|| TreeError::UnknownView(name.to_string()))?;
        if doc.is_alive() {
            Ok(doc)
        } else {
            Err(SidebarError::stale(doc.name()).into())
        }
    }

    /// Open the tree mirror of `source`'s document
    ///
    /// An existing mirror under the canonical name is rebuilt in place; a
    /// same-named view that is not a mirror of this document is left alone.
    ///
    /// # Errors
    /// Returns a conflict if the name is taken by an unrelated view, a stale
    /// reference if the document is gone
    pub fn open(&self, source: &DocumentView) -> TreeResult<TreeMirror> {
        let doc = source.document();
        if !doc.is_alive() {
            return Err(SidebarError::stale(doc.name()).into());
        }
        let name = self.mirror_name(doc);

        let occupied_by_other = self
            .views
            .get(&name)
            .map(|v| !(v.kind() == ViewKind::Mirror && v.is_mirror_of(doc)));
        if occupied_by_other == Some(true) {
            warn!(view = %name, "refusing to replace a view that is not a mirror");
            return Err(SidebarError::conflict(&name).into());
        }
        let rebuilding = occupied_by_other.is_some();
        self.transition(&name, MirrorState::Building)?;

        let mirror = match build_mirror(&name, source) {
            Ok(mirror) => mirror,
            Err(e) => {
                self.views.remove(&name);
                self.slots.lock().hide(&name);
                self.transition(&name, MirrorState::Absent)?;
                return Err(e);
            }
        };
        self.views.insert(name.clone(), mirror);
        self.transition(&name, MirrorState::Ready)?;
        let slot = self.slots.lock().show(&name);

        info!(mirror = %name, slot, rebuilding, "opened tree mirror");
        Ok(TreeMirror { name, slot })
    }

    /// Destroy the view named `name`
    ///
    /// # Errors
    /// Returns error if the mirror lifecycle is inconsistent
    pub fn close(&self, name: &str) -> TreeResult<bool> {
        if self.views.remove(name).is_none() {
            return Ok(false);
        }
        self.slots.lock().hide(name);
        if self.state(name) == MirrorState::Ready {
            self.transition(name, MirrorState::Absent)?;
        }
        debug!(view = name, "closed view");
        Ok(true)
    }

    /// Check whether the heading at `pos` in view `name` has nested headings
    ///
    /// # Errors
    /// Returns error if the view is unknown or its document is gone
    pub fn children_present(&self, name: &str, pos: usize) -> TreeResult<bool> {
        let doc = self.document_of(name)?;
        Ok(children_present(&doc, pos))
    }

    /// Toggle child headings when `pos` is on heading glyphs, else jump
    ///
    /// Toggling shows or folds direct child headings only; bodies stay
    /// folded.
    ///
    /// # Errors
    /// Returns error if the mirror is unknown, its document is gone or no
    /// heading contains `pos`
    pub fn toggle_or_jump(
        &self,
        mirror: &str,
        pos: usize,
        depth: Option<Depth>,
    ) -> TreeResult<TreeAction> {
        let doc = self.document_of(mirror)?;
        let heading = doc.heading_at(pos).ok_or(TreeError::NoHeading(pos))?;
        if !heading.is_on_marker(pos) {
            return self.jump(mirror, pos, depth).map(TreeAction::Jumped);
        }

        let mut view = self
            .views
            .get_mut(mirror)
            .ok_or_else(|| TreeError::UnknownView(mirror.to_string()))?;
        if view.children_shown(&heading) {
            view.hide_subtree(&heading);
        } else {
            view.show_children(&heading);
        }
        let expanded = view.children_shown(&heading);
        debug!(mirror, heading = %heading.title, expanded, "toggled children");
        Ok(TreeAction::Toggled {
            title: heading.title,
            expanded,
        })
    }

    /// Open the subtree view of the heading at `pos` in view `mirror`
    ///
    /// Without an explicit depth the configured default applies, else
    /// children when the heading has any and none otherwise. A displayed
    /// subtree view of the same document gives up its slot to the new one
    /// and is destroyed.
    ///
    /// # Errors
    /// Returns error if the view is unknown, its document is gone, no heading
    /// contains `pos`, or the subtree name is taken by an unrelated view
    pub fn jump(&self, mirror: &str, pos: usize, depth: Option<Depth>) -> TreeResult<SubtreeView> {
        let doc = self.document_of(mirror)?;
        let heading = doc.heading_at(pos).ok_or(TreeError::NoHeading(pos))?;
        let depth = depth
            .or(self.config.default_depth)
            .unwrap_or_else(|| SubtreeView::default_depth(&heading));

        let subtree = SubtreeView::build(&doc, &heading, depth)?;
        let name = subtree.name().to_string();
        if let Some(existing) = self.views.get(&name) {
            if !existing.is_mirror_of(&doc) {
                warn!(view = %name, "refusing to replace a view that is not a mirror");
                return Err(SidebarError::conflict(&name).into());
            }
        }

        let slot = self.place_subtree(&doc, &name);
        self.views.insert(name.clone(), subtree.view().clone());
        info!(view = %name, %depth, slot, "opened subtree view");
        Ok(subtree)
    }

    fn place_subtree(&self, doc: &Document, name: &str) -> usize {
        let mut slots = self.slots.lock();
        if let Some(slot) = slots.slot_of(name) {
            return slot;
        }
        let reusable = slots.displayed().iter().position(|shown| {
            self.views
                .get(shown)
                .is_some_and(|v| v.kind() == ViewKind::Subtree && v.document().same_storage(doc))
        });
        match reusable {
            Some(slot) => {
                let (slot, displaced) = slots.show_in(slot, name);
                drop(slots);
                if let Some(old) = displaced {
                    self.views.remove(&old);
                    debug!(view = name, displaced = %old, slot, "reused display slot");
                }
                slot
            }
            None => slots.show(name),
        }
    }
}

/// Skeleton mirror of `source`: its narrowing, top-level headings only, and
/// the heading at the source point expanded one level
fn build_mirror(name: &str, source: &DocumentView) -> TreeResult<DocumentView> {
    let mut mirror = DocumentView::indirect(name, source.document().clone(), ViewKind::Mirror);
    if let Some(range) = source.narrowing() {
        mirror.narrow(range)?;
    }
    mirror.overview();
    if let Some(heading) = mirror.heading_at(source.point()) {
        mirror.reveal(&heading);
        mirror.show_children(&heading);
        mirror.set_point(heading.begin);
    }
    Ok(mirror)
}
