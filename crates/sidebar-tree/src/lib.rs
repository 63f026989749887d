//! Outline Tree Mirrors
//!
//! Independently folded views over the same outline text, for navigating a
//! document as a tree next to the document itself.
//!
//! # Core Concepts
//!
//! - [`TreeManager`]: Opens mirrors, toggles headings, jumps to subtrees
//! - [`TreeMirror`]: Handle to an open mirror named `<tree>DOCUMENT`
//! - [`SubtreeView`]: One heading's entry or subtree, folded to a [`Depth`]
//! - [`MirrorState`]: Per-mirror lifecycle (absent, building, ready)
//! - [`DisplaySlots`]: Where tree-side views are shown
//!
//! # Example
//!
//! ```rust,ignore
//! use sidebar_tree::{Depth, TreeManager};
//! use sidebar_doc::DocumentView;
//!
//! let manager = TreeManager::default();
//! let mirror = manager.open(&DocumentView::new(doc.clone()))?;
//!
//! // Jump from the mirror to a heading, showing every descendant heading
//! let subtree = manager.jump(mirror.name(), pos, Some(Depth::Branches))?;
//! println!("{}", subtree.view().render());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod error;
mod manager;
mod slots;
mod state;
mod subtree;

// Re-exports
pub use error::{TreeError, TreeResult};
pub use manager::{TreeAction, TreeManager, TreeMirror};
pub use sidebar_doc::Depth;
pub use slots::DisplaySlots;
pub use state::{allowed_transitions, validate_transition, MirrorState};
pub use subtree::{children_present, has_children, subtree_name, SubtreeView};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
