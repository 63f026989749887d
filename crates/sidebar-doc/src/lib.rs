//! Outline Document Storage
//!
//! Shared outline text with parsed headings, edit-following markers and
//! independent views.
//!
//! # Core Concepts
//!
//! - [`Document`]: Shared text storage; clones are handles to one buffer
//! - [`Outline`] / [`Heading`]: Parsed entries with metadata and offsets
//! - [`Marker`]: Position that follows edits and goes stale with its document
//! - [`EntryRef`]: Marker plus metadata snapshot of one matched entry
//! - [`DocumentView`]: Narrowing, folding and point over a shared document
//! - [`OutlineParser`]: Trait for source formats (org, markdown)
//!
//! # Example
//!
//! ```rust,ignore
//! use sidebar_doc::{Document, DocumentView, ViewKind};
//!
//! let doc = Document::org("tasks.org", "* TODO Write report\n")?;
//! let mut tree = DocumentView::indirect("<tree>tasks.org", doc.clone(), ViewKind::Mirror);
//! tree.hide_bodies();
//!
//! // Edits through one handle show up in every view
//! doc.insert(doc.len(), "* TODO Review\n")?;
//! println!("{}", tree.render());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod document;
mod entry;
mod error;
mod hash;
mod heading;
mod marker;
mod path;
mod view;
mod visibility;

/// Source format parsers
pub mod parsers;

// Re-exports
pub use document::{Document, DocumentId, WeakDocument};
pub use entry::{EntryRef, EntrySnapshot};
pub use error::{DocError, ParseError};
pub use hash::ContentHash;
pub use heading::{Heading, Outline, Planning, Tags, Timestamp};
pub use marker::Marker;
pub use parsers::{MarkdownParser, OrgParser, OutlineParser, SourceFormat, TodoKeywords};
pub use path::{HeadingPath, PathError};
pub use view::{Depth, DocumentView, ViewId, ViewKind};
pub use visibility::Visibility;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
