//! Error types for document storage
//!
//! Provides error handling for:
//! - Parsing document text into an outline
//! - Resolving markers and entry references
//! - Editing and narrowing shared storage

use std::ops::Range;

/// Errors while parsing document text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Front matter could not be read
    #[error("invalid front matter: {0}")]
    FrontMatter(String),
}

/// Errors raised by documents, markers and views
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocError {
    /// The document behind a marker was killed or dropped
    #[error("document '{document}' no longer exists")]
    StaleReference {
        /// Name of the vanished document
        document: String,
    },

    /// Offset outside the document or not on a character boundary
    #[error("offset {offset} is out of range (document length {len})")]
    OutOfRange { offset: usize, len: usize },

    /// Range is reversed or outside the document
    #[error("invalid range {range:?} (document length {len})")]
    InvalidRange { range: Range<usize>, len: usize },

    /// No heading at the requested position
    #[error("no heading at position {0}")]
    NoHeading(usize),

    /// Re-parsing after an edit failed
    #[error("parse failed: {0}")]
    Parse(#[from] ParseError),
}

impl DocError {
    /// Create stale reference error for a document name
    pub fn stale(document: impl Into<String>) -> Self {
        Self::StaleReference {
            document: document.into(),
        }
    }

    /// Check if the error means the document is gone
    #[inline]
    #[must_use]
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::StaleReference { .. })
    }
}
