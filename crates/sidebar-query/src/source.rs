//! Item source adapter
//!
//! [`ItemSource`] is what the sidebar composer calls to collect entries:
//! it compiles predicate text (once per distinct text, cached with moka)
//! and forwards the compiled predicate to a [`QueryEvaluator`].

use crate::error::QueryResult;
use crate::eval::{OutlineQueryEngine, QueryEvaluator, QueryOptions};
use crate::parser;
use crate::predicate::Predicate;
use moka::sync::Cache;
use sidebar_doc::{DocumentView, EntryRef};
use std::sync::Arc;

/// Default number of compiled predicates kept
pub const DEFAULT_CACHE_CAPACITY: u64 = 256;

/// Statistics for the compiled-predicate cache
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    /// Number of entries in cache
    pub entry_count: u64,
}

/// Query front end with a compiled-predicate cache
#[derive(Debug, Clone)]
pub struct ItemSource {
    evaluator: Arc<dyn QueryEvaluator>,
    compiled: Cache<String, Arc<Predicate>>,
}

impl Default for ItemSource {
    fn default() -> Self {
        Self::new(Arc::new(OutlineQueryEngine::new()))
    }
}

impl ItemSource {
    /// Create with an evaluator and default cache capacity
    #[must_use]
    pub fn new(evaluator: Arc<dyn QueryEvaluator>) -> Self {
        Self::with_capacity(evaluator, DEFAULT_CACHE_CAPACITY)
    }

    /// Create with an explicit cache capacity
    #[must_use]
    pub fn with_capacity(evaluator: Arc<dyn QueryEvaluator>, capacity: u64) -> Self {
        Self {
            evaluator,
            compiled: Cache::new(capacity),
        }
    }

    /// Compile predicate text, reusing a cached result
    ///
    /// # Errors
    /// Returns `QueryError` if the text is malformed
    pub fn compile(&self, text: &str) -> QueryResult<Arc<Predicate>> {
        let key = text.trim().to_string();
        if let Some(hit) = self.compiled.get(&key) {
            tracing::debug!(query = %key, "compiled query cache hit");
            return Ok(hit);
        }
        let predicate = Arc::new(parser::parse(&key)?);
        self.compiled.insert(key, Arc::clone(&predicate));
        Ok(predicate)
    }

    /// Run predicate text over `views`
    ///
    /// # Errors
    /// Returns `QueryError` if the predicate is malformed or a document is gone
    pub fn query(
        &self,
        views: &[DocumentView],
        predicate: &str,
        options: &QueryOptions,
    ) -> QueryResult<Vec<EntryRef>> {
        let compiled = self.compile(predicate)?;
        self.query_compiled(views, &compiled, options)
    }

    /// Run an already compiled predicate over `views`
    ///
    /// # Errors
    /// Returns `QueryError` if a document is gone
    pub fn query_compiled(
        &self,
        views: &[DocumentView],
        predicate: &Predicate,
        options: &QueryOptions,
    ) -> QueryResult<Vec<EntryRef>> {
        self.evaluator.evaluate(views, predicate, options)
    }

    /// Cache statistics
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.compiled.run_pending_tasks();
        CacheStats {
            entry_count: self.compiled.entry_count(),
        }
    }

    /// Drop all compiled predicates
    pub fn invalidate_all(&self) {
        self.compiled.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryError;

    #[test]
    fn compile_is_cached() {
        let source = ItemSource::default();
        let a = source.compile("(todo)").unwrap();
        let b = source.compile("  (todo)  ").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(source.stats().entry_count, 1);

        source.invalidate_all();
        assert_eq!(source.stats().entry_count, 0);
    }

    #[test]
    fn malformed_is_not_cached() {
        let source = ItemSource::default();
        assert!(matches!(source.compile("(todo"), Err(QueryError::Syntax { .. })));
        assert_eq!(source.stats().entry_count, 0);
    }
}
