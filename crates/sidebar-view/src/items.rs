//! Built-in item functions

use crate::compose::{ItemContext, ItemFn, ItemFnResult};
use crate::descriptor::ViewDescriptor;
use crate::error::SidebarResult;
use sidebar_group::GroupBy;
use sidebar_query::{QueryOptions, SortField, SortKey};
use std::sync::Arc;

/// Query of [`UpcomingItems`]
pub const UPCOMING_QUERY: &str = "(and (not (done)) (or (scheduled) (deadline)))";

/// Query of [`TodoItems`]
pub const TODO_QUERY: &str = "(and (todo) (not (scheduled)) (not (deadline)))";

fn descriptor(
    ctx: &ItemContext<'_>,
    name: &str,
    description: &str,
    query: &str,
    sort: SortField,
) -> SidebarResult<ItemFnResult> {
    let options = QueryOptions::default()
        .with_narrow(true)
        .with_sort(vec![SortKey::new(sort)])
        .with_today(ctx.today);
    let entries = ctx.items.query(ctx.source, query, &options)?;
    if entries.is_empty() {
        return Ok(ItemFnResult::Nil);
    }
    let mut builder = ViewDescriptor::builder(name)
        .description(description)
        .entries(entries);
    if let Some(rules) = ctx.rules() {
        builder = builder.super_groups(rules);
    }
    Ok(ItemFnResult::Descriptor(builder.build()?))
}

/// Not-done entries that are scheduled or have a deadline, by date
///
/// Contributes nothing when there are none.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpcomingItems;

impl ItemFn for UpcomingItems {
    fn name(&self) -> &str {
        "upcoming"
    }

    fn call(&self, ctx: &ItemContext<'_>) -> SidebarResult<ItemFnResult> {
        descriptor(
            ctx,
            "Upcoming items",
            "Scheduled and deadlined entries that are not done",
            UPCOMING_QUERY,
            SortField::Date,
        )
    }
}

/// Open to-do entries with neither schedule nor deadline, by priority
#[derive(Debug, Clone, Copy, Default)]
pub struct TodoItems;

impl ItemFn for TodoItems {
    fn name(&self) -> &str {
        "todo"
    }

    fn call(&self, ctx: &ItemContext<'_>) -> SidebarResult<ItemFnResult> {
        descriptor(
            ctx,
            "Unscheduled to-do items",
            "Open to-do entries without a schedule or deadline",
            TODO_QUERY,
            SortField::Priority,
        )
    }
}

/// Parameters of an ad-hoc query sidebar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySidebarArgs {
    /// Predicate text
    pub query: String,
    /// Only search each view's narrowing
    pub narrow: bool,
    /// Group results by one property
    pub group_by: Option<GroupBy>,
    /// Sort keys, applied lexicographically
    pub sort: Vec<SortKey>,
    /// Surface name; defaults to the query text
    pub title: Option<String>,
}

impl QuerySidebarArgs {
    /// Arguments for `query` with no grouping or sorting
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            narrow: false,
            group_by: None,
            sort: Vec::new(),
            title: None,
        }
    }

    /// Builder: restrict to narrowing
    #[must_use]
    pub fn with_narrow(mut self, narrow: bool) -> Self {
        self.narrow = narrow;
        self
    }

    /// Builder: group by property
    #[must_use]
    pub fn with_group_by(mut self, group_by: GroupBy) -> Self {
        self.group_by = Some(group_by);
        self
    }

    /// Builder: sort keys
    #[must_use]
    pub fn with_sort(mut self, sort: Vec<SortKey>) -> Self {
        self.sort = sort;
        self
    }

    /// Builder: surface name
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Item function running an ad-hoc query
///
/// Always yields a descriptor, even when nothing matches, so the sidebar
/// shows the query that produced no results.
#[derive(Debug, Clone)]
pub struct QueryItems {
    args: QuerySidebarArgs,
}

impl QueryItems {
    /// Create from arguments
    #[must_use]
    pub fn new(args: QuerySidebarArgs) -> Self {
        Self { args }
    }

    /// Arguments
    #[inline]
    #[must_use]
    pub fn args(&self) -> &QuerySidebarArgs {
        &self.args
    }
}

impl ItemFn for QueryItems {
    fn name(&self) -> &str {
        "query"
    }

    fn call(&self, ctx: &ItemContext<'_>) -> SidebarResult<ItemFnResult> {
        let options = QueryOptions::default()
            .with_narrow(self.args.narrow)
            .with_sort(self.args.sort.clone())
            .with_today(ctx.today);
        let entries = ctx.items.query(ctx.source, &self.args.query, &options)?;
        let name = self
            .args
            .title
            .clone()
            .unwrap_or_else(|| format!("Query: {}", self.args.query.trim()));
        let mut builder = ViewDescriptor::builder(name)
            .description(self.args.query.trim())
            .entries(entries);
        if let Some(group_by) = self.args.group_by {
            builder = builder.group_by(Arc::new(group_by));
        }
        Ok(ItemFnResult::Descriptor(builder.build()?))
    }
}
