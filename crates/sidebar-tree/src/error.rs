//! Error types for tree mirrors

use crate::state::MirrorState;
use sidebar_doc::DocError;
use sidebar_view::SidebarError;

/// Tree mirror errors
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// Shared sidebar error (stale references, conflicts)
    #[error(transparent)]
    Sidebar(#[from] SidebarError),

    /// Mirror state machine rejected a transition
    #[error("illegal mirror transition for '{name}': {from} -> {to}")]
    IllegalTransition {
        /// Mirror name
        name: String,
        /// Current state
        from: MirrorState,
        /// Requested state
        to: MirrorState,
    },

    /// No heading at or before the position
    #[error("no heading at position {0}")]
    NoHeading(usize),

    /// No view registered under the name
    #[error("no view named '{0}'")]
    UnknownView(String),
}

impl TreeError {
    /// Check if the operation hit a name conflict
    #[inline]
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Sidebar(e) if e.is_conflict())
    }

    /// Check if the document went away
    #[inline]
    #[must_use]
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Sidebar(e) if e.is_stale())
    }
}

impl From<DocError> for TreeError {
    fn from(err: DocError) -> Self {
        match err {
            DocError::NoHeading(pos) => Self::NoHeading(pos),
            other => Self::Sidebar(other.into()),
        }
    }
}

/// Result type for tree operations
pub type TreeResult<T> = Result<T, TreeError>;
