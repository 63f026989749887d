//! Sidebar configuration
//!
//! Loaded from TOML; every field has a default so a partial file works.

use crate::compose::ItemFn;
use crate::error::{SidebarError, SidebarResult};
use crate::format::FormatterConfig;
use crate::items::{TodoItems, UpcomingItems};
use crate::placement::PlacementConfig;
use serde::{Deserialize, Serialize};
use sidebar_doc::Depth;
use sidebar_group::SuperGroupRule;
use std::path::Path;
use std::sync::Arc;

/// Built-in item functions of the default sidebar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultFn {
    /// Scheduled or deadlined entries that are not done
    Upcoming,
    /// Undated to-do entries
    Todo,
}

impl DefaultFn {
    /// Item function for this entry
    #[must_use]
    pub fn item_fn(self) -> Arc<dyn ItemFn> {
        match self {
            Self::Upcoming => Arc::new(UpcomingItems),
            Self::Todo => Arc::new(TodoItems),
        }
    }
}

/// Tree mirror settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Depth used when a jump names none; `None` picks by children
    pub default_depth: Option<Depth>,
    /// Prefix of mirror names
    pub mirror_prefix: String,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            default_depth: None,
            mirror_prefix: "<tree>".into(),
        }
    }
}

/// Sidebar configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SidebarConfig {
    /// Item functions of the default sidebar, in order
    pub default_fns: Vec<DefaultFn>,
    /// Group item function results
    pub group: bool,
    /// Rules for grouped results; category groups when absent
    pub super_groups: Option<Vec<SuperGroupRule>>,
    /// Entry line layout
    pub formatter: FormatterConfig,
    /// Side panel slots
    pub placement: PlacementConfig,
    /// Tree mirror settings
    pub tree: TreeConfig,
}

impl Default for SidebarConfig {
    fn default() -> Self {
        Self {
            default_fns: vec![DefaultFn::Upcoming, DefaultFn::Todo],
            group: true,
            super_groups: None,
            formatter: FormatterConfig::default(),
            placement: PlacementConfig::default(),
            tree: TreeConfig::default(),
        }
    }
}

impl SidebarConfig {
    /// Create config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read config from a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or decoded
    pub fn load(path: impl AsRef<Path>) -> SidebarResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded sidebar configuration");
        Ok(config)
    }

    /// Decode config from TOML text
    ///
    /// # Errors
    /// Returns error if the text is not valid configuration
    pub fn from_toml_str(text: &str) -> SidebarResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check settings that serde cannot
    ///
    /// # Errors
    /// Returns `Configuration` for an empty mirror prefix or zero width
    pub fn validate(&self) -> SidebarResult<()> {
        if self.tree.mirror_prefix.is_empty() {
            return Err(SidebarError::Configuration(
                "tree.mirror_prefix must not be empty".into(),
            ));
        }
        if self.placement.width == 0 {
            return Err(SidebarError::Configuration(
                "placement.width must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Builder: set default item functions
    #[must_use]
    pub fn with_default_fns(mut self, fns: Vec<DefaultFn>) -> Self {
        self.default_fns = fns;
        self
    }

    /// Builder: enable or disable grouping
    #[must_use]
    pub fn with_group(mut self, group: bool) -> Self {
        self.group = group;
        self
    }

    /// Builder: set super-group rules
    #[must_use]
    pub fn with_super_groups(mut self, rules: Vec<SuperGroupRule>) -> Self {
        self.super_groups = Some(rules);
        self
    }

    /// Builder: set formatter settings
    #[must_use]
    pub fn with_formatter(mut self, formatter: FormatterConfig) -> Self {
        self.formatter = formatter;
        self
    }

    /// Builder: set placement settings
    #[must_use]
    pub fn with_placement(mut self, placement: PlacementConfig) -> Self {
        self.placement = placement;
        self
    }

    /// Builder: set tree settings
    #[must_use]
    pub fn with_tree(mut self, tree: TreeConfig) -> Self {
        self.tree = tree;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_toml() {
        let config = SidebarConfig::default();
        let text = toml::to_string(&config).unwrap();
        assert_eq!(SidebarConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn empty_prefix_is_rejected() {
        let err = SidebarConfig::from_toml_str("[tree]\nmirror_prefix = \"\"\n").unwrap_err();
        assert!(matches!(err, SidebarError::Configuration(_)));
    }
}
