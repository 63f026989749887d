//! Composition inputs
//!
//! A [`ComposeRequest`] lists what a sidebar is made of: prebuilt surfaces,
//! item functions and ready descriptors, plus the grouping parameters that
//! item functions receive. Item functions answer with an [`ItemFnResult`].

use crate::descriptor::ViewDescriptor;
use crate::error::SidebarResult;
use crate::surface::Surface;
use chrono::NaiveDate;
use sidebar_doc::DocumentView;
use sidebar_group::{Selector, SuperGroupRule};
use sidebar_query::ItemSource;
use std::fmt;
use std::sync::Arc;

/// What an item function produced
#[derive(Debug, Clone)]
pub enum ItemFnResult {
    /// Nothing to show; not an error
    Nil,
    /// Surface used as-is
    Prebuilt(Surface),
    /// Descriptor to render
    Descriptor(ViewDescriptor),
}

/// Everything an item function may consult
#[derive(Debug, Clone, Copy)]
pub struct ItemContext<'a> {
    /// Views to query
    pub source: &'a [DocumentView],
    /// Query front end
    pub items: &'a ItemSource,
    /// Whether grouping was requested
    pub group: bool,
    /// Rules to group by, when given
    pub super_groups: Option<&'a [SuperGroupRule]>,
    /// Evaluation date
    pub today: NaiveDate,
}

impl ItemContext<'_> {
    /// Rules an item function should group by
    ///
    /// `None` when grouping is off. Without explicit rules, entries are
    /// grouped one group per category.
    #[must_use]
    pub fn rules(&self) -> Option<Vec<SuperGroupRule>> {
        if !self.group {
            return None;
        }
        Some(match self.super_groups {
            Some(rules) => rules.to_vec(),
            None => vec![SuperGroupRule::unnamed(Selector::AutoCategory)],
        })
    }
}

/// Produces one sidebar item from the source views
pub trait ItemFn: Send + Sync + fmt::Debug {
    /// Name for logs
    fn name(&self) -> &str;

    /// Produce the item
    ///
    /// # Errors
    /// Returns error if the underlying query fails
    fn call(&self, ctx: &ItemContext<'_>) -> SidebarResult<ItemFnResult>;
}

type ItemClosure = dyn Fn(&ItemContext<'_>) -> SidebarResult<ItemFnResult> + Send + Sync;

/// Item function backed by a closure
#[derive(Clone)]
pub struct FnItem {
    name: String,
    f: Arc<ItemClosure>,
}

impl FnItem {
    /// Wrap a closure
    pub fn new(
        name: impl Into<String>,
        f: impl Fn(&ItemContext<'_>) -> SidebarResult<ItemFnResult> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            f: Arc::new(f),
        }
    }
}

impl fmt::Debug for FnItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnItem").field("name", &self.name).finish()
    }
}

impl ItemFn for FnItem {
    fn name(&self) -> &str {
        &self.name
    }

    fn call(&self, ctx: &ItemContext<'_>) -> SidebarResult<ItemFnResult> {
        (self.f)(ctx)
    }
}

/// Everything one sidebar is composed from
#[derive(Debug, Clone, Default)]
pub struct ComposeRequest {
    /// Source views item functions query
    pub source: Vec<DocumentView>,
    /// Prebuilt surfaces, placed first
    pub buffers: Vec<Surface>,
    /// Item functions, placed after buffers
    pub item_fns: Vec<Arc<dyn ItemFn>>,
    /// Descriptors, placed last; their own grouping always wins
    pub descriptors: Vec<ViewDescriptor>,
    /// Grouping requested for item functions
    pub group: bool,
    /// Rules item functions group by
    pub super_groups: Option<Vec<SuperGroupRule>>,
}

impl ComposeRequest {
    /// Create request over source views
    #[must_use]
    pub fn new(source: Vec<DocumentView>) -> Self {
        Self {
            source,
            ..Self::default()
        }
    }

    /// Builder: add a prebuilt surface
    #[must_use]
    pub fn with_buffer(mut self, surface: Surface) -> Self {
        self.buffers.push(surface);
        self
    }

    /// Builder: add an item function
    #[must_use]
    pub fn with_item_fn(mut self, f: Arc<dyn ItemFn>) -> Self {
        self.item_fns.push(f);
        self
    }

    /// Builder: add a descriptor
    #[must_use]
    pub fn with_descriptor(mut self, descriptor: ViewDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    /// Builder: set grouping parameters
    #[must_use]
    pub fn with_grouping(mut self, group: bool, super_groups: Option<Vec<SuperGroupRule>>) -> Self {
        self.group = group;
        self.super_groups = super_groups;
        self
    }

    /// Context handed to item functions
    #[must_use]
    pub fn context<'a>(&'a self, items: &'a ItemSource, today: NaiveDate) -> ItemContext<'a> {
        ItemContext {
            source: &self.source,
            items,
            group: self.group,
            super_groups: self.super_groups.as_deref(),
            today,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grouping_defaults_to_category_rule() {
        let items = ItemSource::default();
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

        let off = ComposeRequest::default();
        assert!(off.context(&items, today).rules().is_none());

        let on = ComposeRequest::default().with_grouping(true, None);
        let rules = on.context(&items, today).rules().unwrap();
        assert_eq!(rules, vec![SuperGroupRule::unnamed(Selector::AutoCategory)]);

        let custom = vec![SuperGroupRule::new("Soon", Selector::Deadline(sidebar_group::When::Future))];
        let explicit = ComposeRequest::default().with_grouping(true, Some(custom.clone()));
        assert_eq!(explicit.context(&items, today).rules().unwrap(), custom);
    }

    #[test]
    fn closure_item_fns_run() {
        let f = FnItem::new("nothing", |_| Ok(ItemFnResult::Nil));
        let items = ItemSource::default();
        let request = ComposeRequest::default();
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(f.name(), "nothing");
        assert!(matches!(f.call(&request.context(&items, today)).unwrap(), ItemFnResult::Nil));
    }
}
