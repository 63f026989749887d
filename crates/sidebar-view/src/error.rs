//! Error types for sidebar views
//!
//! Every failure a sidebar command can surface:
//! - Malformed queries and sort keys
//! - Back-references into documents that no longer exist
//! - Refreshes whose source is gone
//! - Name conflicts with unrelated surfaces
//! - Conflicting grouping configuration

use crate::surface::SurfaceId;
use sidebar_doc::{DocError, ParseError};
use sidebar_group::GroupError;
use sidebar_query::QueryError;

/// Main sidebar error type
#[derive(Debug, thiserror::Error)]
pub enum SidebarError {
    /// Predicate or sort specification rejected
    #[error("query error: {0}")]
    Query(QueryError),

    /// Navigation target no longer resolvable
    #[error("stale reference: document '{document}' no longer exists")]
    StaleReference {
        /// Document name
        document: String,
    },

    /// Refresh source no longer exists
    #[error("source document '{document}' no longer exists")]
    SourceGone {
        /// Document name
        document: String,
    },

    /// Name already taken by an unrelated surface
    #[error("'{name}' is already used by a surface that is not a mirror")]
    Conflict {
        /// Contested name
        name: String,
    },

    /// Grouping or composer configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Source text could not be parsed
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Document operation failed
    #[error("document error: {0}")]
    Document(DocError),

    /// Placement rejected the surfaces
    #[error("placement failed: {0}")]
    Placement(String),

    /// No surface registered under the id
    #[error("unknown surface {0}")]
    UnknownSurface(SurfaceId),

    /// Line carries no back-reference
    #[error("no entry on line {line} of '{surface}'")]
    NoEntry {
        /// Surface name
        surface: String,
        /// 0-based line
        line: usize,
    },

    /// Configuration file could not be read
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be decoded
    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

impl SidebarError {
    /// Create stale reference error
    #[inline]
    pub fn stale(document: impl Into<String>) -> Self {
        Self::StaleReference {
            document: document.into(),
        }
    }

    /// Create source gone error
    #[inline]
    pub fn source_gone(document: impl Into<String>) -> Self {
        Self::SourceGone {
            document: document.into(),
        }
    }

    /// Create conflict error
    #[inline]
    pub fn conflict(name: impl Into<String>) -> Self {
        Self::Conflict { name: name.into() }
    }

    /// Check if a back-reference went stale
    #[inline]
    #[must_use]
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::StaleReference { .. })
    }

    /// Check if a refresh found its source gone
    #[inline]
    #[must_use]
    pub fn is_source_gone(&self) -> bool {
        matches!(self, Self::SourceGone { .. })
    }

    /// Check if a name conflict aborted the operation
    #[inline]
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

impl From<DocError> for SidebarError {
    fn from(err: DocError) -> Self {
        match err {
            DocError::StaleReference { document } => Self::StaleReference { document },
            DocError::Parse(e) => Self::Parse(e),
            other => Self::Document(other),
        }
    }
}

impl From<QueryError> for SidebarError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::Document(e) => e.into(),
            other => Self::Query(other),
        }
    }
}

impl From<GroupError> for SidebarError {
    fn from(err: GroupError) -> Self {
        match err {
            GroupError::Configuration(message) => Self::Configuration(message),
            other => Self::Configuration(other.to_string()),
        }
    }
}

/// Result type for sidebar operations
pub type SidebarResult<T> = Result<T, SidebarError>;
