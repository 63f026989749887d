//! Outline Grouping Engine
//!
//! Pluggable grouping of query results for sidebar views.
//!
//! # Core Concepts
//!
//! - [`GroupingStrategy`]: Core trait for bucketing entries into groups
//! - [`KeyGrouping`]: Single-key classifier, buckets in first-occurrence order
//! - [`GroupBy`]: Built-in key classifiers (category, parent, priority, todo)
//! - [`RuleListClassifier`]: Ordered first-match super-group rules
//! - [`GroupingMode`]: Decides the mode and rejects conflicting settings
//!
//! # Example
//!
//! ```rust,ignore
//! use sidebar_group::{GroupingMode, GroupContext, SuperGroupRule, Selector};
//!
//! let rules = vec![SuperGroupRule::new("Urgent", Selector::Tag(vec!["urgent".into()]))];
//! let mode = GroupingMode::resolve(None, Some(rules))?;
//! let groups = mode.apply(&entries, &GroupContext::default());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod key;
mod rules;
mod strategy;

// Re-exports
pub use key::{FnClassifier, GroupBy, KeyClassifier, KeyGrouping};
pub use rules::{
    Pattern, RuleListClassifier, RuleListGrouping, Selector, SuperGroupClassifier, SuperGroupRule,
    When,
};
pub use strategy::{
    Group, GroupContext, GroupError, GroupingMode, GroupingStrategy, NONE_GROUP, OTHER_ITEMS,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
