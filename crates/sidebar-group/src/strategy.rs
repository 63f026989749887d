//! Grouping strategy trait and core types
//!
//! Provides the [`GroupingStrategy`] trait and [`GroupingMode`], which
//! decides between key grouping and rule-list grouping before anything is
//! rendered.

use crate::key::{KeyClassifier, KeyGrouping};
use crate::rules::{RuleListClassifier, RuleListGrouping, SuperGroupRule};
use chrono::{Local, NaiveDate};
use sidebar_doc::EntryRef;
use std::sync::Arc;

/// Name shown for the bucket of entries without a key
pub const NONE_GROUP: &str = "None";

/// Name of the rule-list catch-all group
pub const OTHER_ITEMS: &str = "Other items";

/// Named bucket of entries in original relative order
#[derive(Debug, Clone)]
pub struct Group {
    /// Group name; `None` is the absent-key bucket
    pub name: Option<String>,
    /// Entries in input order
    pub entries: Vec<EntryRef>,
}

impl Group {
    /// Create empty group
    #[inline]
    #[must_use]
    pub fn new(name: Option<String>) -> Self {
        Self {
            name,
            entries: Vec::new(),
        }
    }

    /// Header text: the name, or `None`
    #[inline]
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(NONE_GROUP)
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the group holds no entries
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Context shared by classifiers during one grouping pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupContext {
    /// Date that relative date selectors compare against
    pub today: NaiveDate,
}

impl Default for GroupContext {
    fn default() -> Self {
        Self {
            today: Local::now().date_naive(),
        }
    }
}

impl GroupContext {
    /// Context for a fixed date
    #[inline]
    #[must_use]
    pub fn on(today: NaiveDate) -> Self {
        Self { today }
    }
}

/// Strategy that buckets entries into ordered groups
///
/// Implementations must be deterministic and must place every entry they
/// keep into exactly one group.
pub trait GroupingStrategy: Send + Sync + std::fmt::Debug {
    /// Bucket `entries` into groups
    fn group(&self, entries: &[EntryRef], ctx: &GroupContext) -> Vec<Group>;

    /// Strategy name (for debugging)
    fn name(&self) -> &'static str;
}

/// Errors raised while configuring grouping
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GroupError {
    /// Both grouping modes requested at once
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A rule could not be built
    #[error("invalid rule '{rule}': {message}")]
    InvalidRule {
        /// Rule source text
        rule: String,
        /// Why it was rejected
        message: String,
    },
}

/// Grouping decided for one view
#[derive(Debug, Clone, Default)]
pub enum GroupingMode {
    /// Flat list in document order
    #[default]
    Ungrouped,
    /// Single-key classifier
    Key(KeyGrouping),
    /// Ordered super-group rules
    Rules(RuleListGrouping),
}

impl GroupingMode {
    /// Decide the mode from the two optional settings
    ///
    /// # Errors
    /// Returns `Configuration` when both a key classifier and rules are set
    pub fn resolve(
        key: Option<Arc<dyn KeyClassifier>>,
        rules: Option<Vec<SuperGroupRule>>,
    ) -> Result<Self, GroupError> {
        match (key, rules) {
            (Some(key), Some(rules)) => {
                tracing::warn!(
                    classifier = ?key,
                    rules = rules.len(),
                    "rejecting view with both key and rule-list grouping"
                );
                Err(GroupError::Configuration(
                    "a view may group by a key or by super-group rules, not both".into(),
                ))
            }
            (Some(key), None) => Ok(Self::Key(KeyGrouping::new(key))),
            (None, Some(rules)) => Ok(Self::Rules(RuleListGrouping::new(Arc::new(
                RuleListClassifier::new(rules),
            )))),
            (None, None) => Ok(Self::Ungrouped),
        }
    }

    /// Check if any grouping applies
    #[inline]
    #[must_use]
    pub fn is_grouped(&self) -> bool {
        !matches!(self, Self::Ungrouped)
    }

    /// Group entries, or `None` when ungrouped
    #[must_use]
    pub fn apply(&self, entries: &[EntryRef], ctx: &GroupContext) -> Option<Vec<Group>> {
        let strategy: &dyn GroupingStrategy = match self {
            Self::Ungrouped => return None,
            Self::Key(k) => k,
            Self::Rules(r) => r,
        };
        let groups = strategy.group(entries, ctx);
        tracing::debug!(
            strategy = strategy.name(),
            entries = entries.len(),
            groups = groups.len(),
            "grouped entries"
        );
        Some(groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::GroupBy;
    use crate::rules::Selector;

    #[test]
    fn both_modes_rejected() {
        let err = GroupingMode::resolve(
            Some(Arc::new(GroupBy::Category)),
            Some(vec![SuperGroupRule::new("Urgent", Selector::Tag(vec!["urgent".into()]))]),
        )
        .unwrap_err();
        assert!(matches!(err, GroupError::Configuration(_)));
    }

    #[test]
    fn single_modes_resolve() {
        assert!(!GroupingMode::resolve(None, None).unwrap().is_grouped());
        assert!(matches!(
            GroupingMode::resolve(Some(Arc::new(GroupBy::Todo)), None).unwrap(),
            GroupingMode::Key(_)
        ));
        assert!(matches!(
            GroupingMode::resolve(None, Some(Vec::new())).unwrap(),
            GroupingMode::Rules(_)
        ));
    }

    #[test]
    fn none_group_name() {
        assert_eq!(Group::new(None).display_name(), "None");
        assert_eq!(Group::new(Some("work".into())).display_name(), "work");
    }
}
