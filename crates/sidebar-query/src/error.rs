//! Error types for queries

use sidebar_doc::DocError;

/// Errors while compiling or running a query
#[derive(Debug, Clone, thiserror::Error)]
pub enum QueryError {
    /// Predicate text is not a well-formed expression
    #[error("malformed query {query:?} at offset {position}: {message}")]
    Syntax {
        /// Query text
        query: String,
        /// Byte offset of the problem
        position: usize,
        /// What went wrong
        message: String,
    },

    /// Unknown predicate name
    #[error("unknown predicate '{name}' in query {query:?}")]
    UnknownPredicate {
        /// Predicate name
        name: String,
        /// Query text
        query: String,
    },

    /// Predicate given arguments it cannot use
    #[error("invalid arguments to '{predicate}': {message}")]
    InvalidArgument {
        /// Predicate name
        predicate: String,
        /// What was wrong with the arguments
        message: String,
    },

    /// Regular expression failed to compile
    #[error("invalid regex {pattern:?}: {message}")]
    InvalidRegex {
        /// Pattern source
        pattern: String,
        /// Compiler message
        message: String,
    },

    /// Sort key not recognised
    #[error("unknown sort key '{0}'")]
    UnknownSortKey(String),

    /// Document behind a view is gone
    #[error(transparent)]
    Document(#[from] DocError),
}

impl QueryError {
    /// Create invalid argument error
    pub fn invalid_argument(predicate: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            predicate: predicate.into(),
            message: message.into(),
        }
    }

    /// Attach the query text to errors raised before it was known
    #[must_use]
    pub fn with_query(self, text: &str) -> Self {
        match self {
            Self::Syntax {
                position, message, ..
            } => Self::Syntax {
                query: text.to_string(),
                position,
                message,
            },
            Self::UnknownPredicate { name, .. } => Self::UnknownPredicate {
                name,
                query: text.to_string(),
            },
            other => other,
        }
    }
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
