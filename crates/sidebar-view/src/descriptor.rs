//! View descriptors
//!
//! A [`ViewDescriptor`] is what item functions hand to the renderer: a name,
//! help text, entries, and the one grouping mode decided for them.

use crate::error::SidebarResult;
use sidebar_doc::EntryRef;
use sidebar_group::{GroupingMode, KeyClassifier, SuperGroupRule};
use std::sync::Arc;

/// Named bundle of entries and their grouping
#[derive(Debug, Clone)]
pub struct ViewDescriptor {
    name: String,
    description: Option<String>,
    entries: Vec<EntryRef>,
    grouping: GroupingMode,
}

impl ViewDescriptor {
    /// Ungrouped descriptor
    #[must_use]
    pub fn new(name: impl Into<String>, entries: Vec<EntryRef>) -> Self {
        Self {
            name: name.into(),
            description: None,
            entries,
            grouping: GroupingMode::Ungrouped,
        }
    }

    /// Start a builder
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ViewDescriptorBuilder {
        ViewDescriptorBuilder {
            name: name.into(),
            description: None,
            entries: Vec::new(),
            key: None,
            super_groups: None,
        }
    }

    /// Display name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Help text
    #[inline]
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Entries in document or sort order
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[EntryRef] {
        &self.entries
    }

    /// Grouping decided at construction
    #[inline]
    #[must_use]
    pub fn grouping(&self) -> &GroupingMode {
        &self.grouping
    }
}

/// Builder for [`ViewDescriptor`]
#[derive(Debug)]
pub struct ViewDescriptorBuilder {
    name: String,
    description: Option<String>,
    entries: Vec<EntryRef>,
    key: Option<Arc<dyn KeyClassifier>>,
    super_groups: Option<Vec<SuperGroupRule>>,
}

impl ViewDescriptorBuilder {
    /// Set help text
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set entries
    #[must_use]
    pub fn entries(mut self, entries: Vec<EntryRef>) -> Self {
        self.entries = entries;
        self
    }

    /// Group by a single key
    #[must_use]
    pub fn group_by(mut self, key: Arc<dyn KeyClassifier>) -> Self {
        self.key = Some(key);
        self
    }

    /// Group by ordered super-group rules
    #[must_use]
    pub fn super_groups(mut self, rules: Vec<SuperGroupRule>) -> Self {
        self.super_groups = Some(rules);
        self
    }

    /// Build the descriptor
    ///
    /// # Errors
    /// Returns `Configuration` when both a key and super-groups were set
    pub fn build(self) -> SidebarResult<ViewDescriptor> {
        let grouping = GroupingMode::resolve(self.key, self.super_groups)?;
        Ok(ViewDescriptor {
            name: self.name,
            description: self.description,
            entries: self.entries,
            grouping,
        })
    }
}
