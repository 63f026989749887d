//! Key grouping
//!
//! One classifier maps each entry to an optional key; entries are bucketed
//! by key in order of first occurrence. Entries without a key share a
//! single `None` bucket.

use crate::strategy::{Group, GroupContext, GroupingStrategy};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sidebar_doc::EntryRef;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Single-key classifier
pub trait KeyClassifier: Send + Sync + fmt::Debug {
    /// Group key for `entry`, or `None`
    fn key(&self, entry: &EntryRef) -> Option<String>;
}

/// Built-in classifiers by entry property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    /// Entry category
    Category,
    /// Title of the parent heading
    Parent,
    /// Priority cookie
    Priority,
    /// To-do keyword
    Todo,
}

impl KeyClassifier for GroupBy {
    fn key(&self, entry: &EntryRef) -> Option<String> {
        let s = entry.snapshot();
        match self {
            Self::Category => Some(s.category.clone()),
            Self::Parent => s.parent_title.clone(),
            Self::Priority => s.priority.map(String::from),
            Self::Todo => s.todo.clone(),
        }
    }
}

impl FromStr for GroupBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "category" => Ok(Self::Category),
            "parent" => Ok(Self::Parent),
            "priority" => Ok(Self::Priority),
            "todo" => Ok(Self::Todo),
            other => Err(format!(
                "unknown group-by property '{other}' (expected category, parent, priority or todo)"
            )),
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Category => "category",
            Self::Parent => "parent",
            Self::Priority => "priority",
            Self::Todo => "todo",
        })
    }
}

type KeyFn = dyn Fn(&EntryRef) -> Option<String> + Send + Sync;

/// Classifier from a plain function
#[derive(Clone)]
pub struct FnClassifier {
    name: String,
    f: Arc<KeyFn>,
}

impl FnClassifier {
    /// Wrap `f` under a debug name
    pub fn new(
        name: impl Into<String>,
        f: impl Fn(&EntryRef) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            f: Arc::new(f),
        }
    }
}

impl fmt::Debug for FnClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnClassifier").field("name", &self.name).finish()
    }
}

impl KeyClassifier for FnClassifier {
    fn key(&self, entry: &EntryRef) -> Option<String> {
        (self.f)(entry)
    }
}

/// Key grouping strategy
#[derive(Debug, Clone)]
pub struct KeyGrouping {
    classifier: Arc<dyn KeyClassifier>,
}

impl KeyGrouping {
    /// Create with a classifier
    #[inline]
    #[must_use]
    pub fn new(classifier: Arc<dyn KeyClassifier>) -> Self {
        Self { classifier }
    }

    /// Classifier in use
    #[inline]
    #[must_use]
    pub fn classifier(&self) -> &Arc<dyn KeyClassifier> {
        &self.classifier
    }
}

impl GroupingStrategy for KeyGrouping {
    fn group(&self, entries: &[EntryRef], _ctx: &GroupContext) -> Vec<Group> {
        let mut buckets: IndexMap<Option<String>, Vec<EntryRef>> = IndexMap::new();
        for entry in entries {
            buckets
                .entry(self.classifier.key(entry))
                .or_default()
                .push(entry.clone());
        }
        buckets
            .into_iter()
            .map(|(name, entries)| Group { name, entries })
            .collect()
    }

    fn name(&self) -> &'static str {
        "key"
    }
}
