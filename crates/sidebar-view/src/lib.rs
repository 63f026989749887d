//! Outline Sidebar Views
//!
//! Composes query results into side-panel surfaces and keeps them in sync
//! with their source documents.
//!
//! # Core Concepts
//!
//! - [`Sidebar`]: Composer; builds, refreshes and places surfaces
//! - [`ComposeRequest`]: Buffers, item functions and descriptors to show
//! - [`ItemFn`] / [`ItemFnResult`]: Item producers answering nil, a surface or a descriptor
//! - [`ViewDescriptor`]: Entries plus exactly one grouping mode
//! - [`Renderer`] / [`EntryFormatter`]: Line assembly with per-line back-references
//! - [`SessionRegistry`]: Side-table from surface id to its [`ViewSession`]
//! - [`Placement`]: Seam deciding where surfaces appear
//!
//! # Example
//!
//! ```rust,ignore
//! use sidebar_view::{Sidebar, SidebarConfig};
//! use sidebar_doc::{Document, DocumentView};
//!
//! let doc = Document::org("agenda.org", text)?;
//! let sidebar = Sidebar::new(SidebarConfig::default());
//! let surfaces = sidebar.show_default(vec![DocumentView::new(doc.clone())])?;
//!
//! // After editing the document
//! sidebar.refresh(surfaces[0])?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod compose;
mod config;
mod descriptor;
mod error;
mod format;
mod items;
mod placement;
mod render;
mod session;
mod sidebar;
mod surface;

// Re-exports
pub use compose::{ComposeRequest, FnItem, ItemContext, ItemFn, ItemFnResult};
pub use config::{DefaultFn, SidebarConfig, TreeConfig};
pub use descriptor::{ViewDescriptor, ViewDescriptorBuilder};
pub use error::{SidebarError, SidebarResult};
pub use format::{AgendaFormatter, EntryFormatter, FormatterConfig};
pub use items::{QueryItems, QuerySidebarArgs, TodoItems, UpcomingItems, TODO_QUERY, UPCOMING_QUERY};
pub use placement::{Placement, PlacementConfig, Side, SidePanel, SlotAssignment};
pub use render::Renderer;
pub use session::{SessionId, SessionRegistry, SurfaceOrigin, ViewSession};
pub use sidebar::Sidebar;
pub use surface::{DisplayText, LineKind, LineTag, Surface, SurfaceId, TaggedText};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude for common imports
pub mod prelude {
    pub use crate::{
        ComposeRequest, ItemFnResult, QuerySidebarArgs, Sidebar, SidebarConfig, SidebarError,
        SurfaceId, ViewDescriptor,
    };
}
