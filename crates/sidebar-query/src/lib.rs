//! Outline Query
//!
//! Predicate language and item source adapter for outline sidebars.
//!
//! # Overview
//!
//! - **Predicate**: s-expression queries such as
//!   `(and (todo) (deadline :to 7))`, compiled once and cached
//! - **QueryEvaluator**: seam to the engine that matches entries
//! - **ItemSource**: compiles predicate text and forwards it, honouring
//!   narrowing and sort keys
//!
//! # Example
//!
//! ```rust,ignore
//! use sidebar_doc::{Document, DocumentView};
//! use sidebar_query::{ItemSource, QueryOptions, SortKey};
//!
//! let view = DocumentView::new(Document::org("tasks.org", text)?);
//! let options = QueryOptions::default().with_sort(vec!["priority".parse()?]);
//! let entries = ItemSource::default().query(&[view], "(todo)", &options)?;
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod predicate;
pub mod sort;
pub mod source;

// Re-exports
pub use error::{QueryError, QueryResult};
pub use eval::{OutlineQueryEngine, QueryEvaluator, QueryOptions};
pub use parser::parse;
pub use predicate::{Comparator, DateRange, DateSpec, PlanningKind, Predicate, PriorityTest};
pub use sort::{parse_sort_keys, sort_entries, SortField, SortKey};
pub use source::{CacheStats, ItemSource};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for querying outlines
    pub use crate::{ItemSource, OutlineQueryEngine, QueryError, QueryEvaluator, QueryOptions, SortKey};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
