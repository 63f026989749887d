//! Sidebar composer
//!
//! [`Sidebar`] turns a [`ComposeRequest`] into placed surfaces, refreshes
//! them in place from their stored session, and resolves rendered lines
//! back to the entries they came from.

use crate::compose::{ComposeRequest, ItemFnResult};
use crate::config::SidebarConfig;
use crate::descriptor::ViewDescriptor;
use crate::error::{SidebarError, SidebarResult};
use crate::format::{AgendaFormatter, EntryFormatter};
use crate::items::{QueryItems, QuerySidebarArgs};
use crate::placement::{Placement, SidePanel};
use crate::render::Renderer;
use crate::session::{SessionRegistry, SurfaceOrigin, ViewSession};
use crate::surface::{Surface, SurfaceId};
use chrono::{Local, NaiveDate};
use sidebar_doc::{Document, DocumentView};
use sidebar_group::GroupContext;
use sidebar_query::ItemSource;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// View composer and session owner
pub struct Sidebar {
    config: SidebarConfig,
    registry: Arc<SessionRegistry>,
    items: ItemSource,
    formatter: Arc<dyn EntryFormatter>,
    placement: Arc<dyn Placement>,
    today: Option<NaiveDate>,
}

impl fmt::Debug for Sidebar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sidebar")
            .field("config", &self.config)
            .field("surfaces", &self.registry.len())
            .field("formatter", &self.formatter)
            .field("today", &self.today)
            .finish_non_exhaustive()
    }
}

impl Default for Sidebar {
    fn default() -> Self {
        Self::new(SidebarConfig::default())
    }
}

impl Sidebar {
    /// Create sidebar with a side panel and agenda formatter from `config`
    #[must_use]
    pub fn new(config: SidebarConfig) -> Self {
        Self {
            formatter: Arc::new(AgendaFormatter::new(config.formatter)),
            placement: Arc::new(SidePanel::new(config.placement)),
            config,
            registry: Arc::new(SessionRegistry::new()),
            items: ItemSource::default(),
            today: None,
        }
    }

    /// Builder: set placement
    #[must_use]
    pub fn with_placement(mut self, placement: Arc<dyn Placement>) -> Self {
        self.placement = placement;
        self
    }

    /// Builder: set entry formatter
    #[must_use]
    pub fn with_formatter(mut self, formatter: Arc<dyn EntryFormatter>) -> Self {
        self.formatter = formatter;
        self
    }

    /// Builder: set item source
    #[must_use]
    pub fn with_item_source(mut self, items: ItemSource) -> Self {
        self.items = items;
        self
    }

    /// Builder: share a registry
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<SessionRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Builder: pin the evaluation date
    #[must_use]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SidebarConfig {
        &self.config
    }

    /// Surface registry
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Query front end
    #[inline]
    #[must_use]
    pub fn items(&self) -> &ItemSource {
        &self.items
    }

    /// Snapshot of a surface
    #[must_use]
    pub fn surface(&self, id: SurfaceId) -> Option<Surface> {
        self.registry.surface(id)
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Build surfaces for `request`: buffers, item results, descriptors
    fn build(&self, request: &ComposeRequest) -> SidebarResult<Vec<(SurfaceOrigin, Surface)>> {
        let today = self.today();
        let renderer =
            Renderer::new(Arc::clone(&self.formatter)).with_context(GroupContext::on(today));
        let ctx = request.context(&self.items, today);

        let mut surfaces: Vec<(SurfaceOrigin, Surface)> = request
            .buffers
            .iter()
            .enumerate()
            .map(|(i, s)| (SurfaceOrigin::Buffer(i), s.clone()))
            .collect();
        for (i, f) in request.item_fns.iter().enumerate() {
            let origin = SurfaceOrigin::ItemFn(i);
            match f.call(&ctx)? {
                ItemFnResult::Nil => debug!(item_fn = f.name(), "item function produced nothing"),
                ItemFnResult::Prebuilt(surface) => surfaces.push((origin, surface)),
                ItemFnResult::Descriptor(d) => {
                    surfaces.push((origin, render_surface(&renderer, &d)));
                }
            }
        }
        for (i, d) in request.descriptors.iter().enumerate() {
            surfaces.push((SurfaceOrigin::Descriptor(i), render_surface(&renderer, d)));
        }
        Ok(surfaces)
    }

    /// Compose, register and place the surfaces of `request`
    ///
    /// # Errors
    /// Returns error if an item function or the placement fails
    pub fn compose(&self, request: ComposeRequest) -> SidebarResult<Vec<SurfaceId>> {
        let built = self.build(&request)?;
        let placed: Vec<(SurfaceOrigin, SurfaceId)> =
            built.iter().map(|(origin, s)| (*origin, s.id())).collect();
        let surfaces: Vec<Surface> = built.into_iter().map(|(_, s)| s).collect();
        let ids: Vec<SurfaceId> = surfaces.iter().map(Surface::id).collect();
        let session = Arc::new(ViewSession::new(request, placed));
        for surface in &surfaces {
            self.registry.insert(surface.clone());
            self.registry.attach(surface.id(), Arc::clone(&session));
        }
        self.place(&surfaces, &ids)?;
        info!(session = %session.id(), surfaces = ids.len(), "composed sidebar");
        Ok(ids)
    }

    /// Rebuild every surface of the session attached to `surface`
    ///
    /// Each surface keeps its id as long as the part of the request that
    /// produced it still produces something. A part that now yields nothing
    /// loses its surface; a part that starts producing gets a new one.
    ///
    /// # Errors
    /// Returns `SourceGone` (leaving the surfaces untouched) if a source
    /// document no longer exists, `UnknownSurface` if no session is attached
    pub fn refresh(&self, surface: SurfaceId) -> SidebarResult<Vec<SurfaceId>> {
        let session = self
            .registry
            .get(surface)
            .ok_or(SidebarError::UnknownSurface(surface))?;
        if let Some(gone) = session
            .request()
            .source
            .iter()
            .find(|v| !v.document().is_alive())
        {
            let document = gone.document().name();
            warn!(%surface, %document, "refresh skipped: source document no longer exists");
            return Err(SidebarError::source_gone(document));
        }

        let rebuilt = self.build(session.request())?;
        let mut placed = Vec::with_capacity(rebuilt.len());
        let mut surfaces = Vec::with_capacity(rebuilt.len());
        for (origin, fresh) in rebuilt {
            let kept = session
                .surface_from(origin)
                .and_then(|id| self.registry.rebuild(id, fresh.clone()));
            let s = match kept {
                Some(s) => s,
                None => {
                    debug!(?origin, surface = %fresh.id(), "new surface on refresh");
                    self.registry.insert(fresh.clone());
                    fresh
                }
            };
            placed.push((origin, s.id()));
            surfaces.push(s);
        }
        let ids: Vec<SurfaceId> = surfaces.iter().map(Surface::id).collect();
        for stale in session.surfaces().iter().filter(|id| !ids.contains(id)) {
            debug!(surface = %stale, "surface dropped on refresh");
            self.registry.detach(*stale);
        }
        let session = Arc::new(session.with_surfaces(placed));
        for id in &ids {
            self.registry.attach(*id, Arc::clone(&session));
        }
        self.place(&surfaces, &ids)?;
        info!(session = %session.id(), surfaces = ids.len(), "refreshed sidebar");
        Ok(ids)
    }

    fn place(&self, surfaces: &[Surface], ids: &[SurfaceId]) -> SidebarResult<()> {
        for evicted in self.placement.place(surfaces)? {
            if !ids.contains(&evicted) {
                self.registry.detach(evicted);
            }
        }
        Ok(())
    }

    /// Default sidebar: the configured item functions over `source`
    ///
    /// # Errors
    /// Returns error if a query or the placement fails
    pub fn show_default(&self, source: Vec<DocumentView>) -> SidebarResult<Vec<SurfaceId>> {
        let mut request = ComposeRequest::new(source)
            .with_grouping(self.config.group, self.config.super_groups.clone());
        for f in &self.config.default_fns {
            request = request.with_item_fn(f.item_fn());
        }
        self.compose(request)
    }

    /// Sidebar for an ad-hoc query over `source`
    ///
    /// # Errors
    /// Returns `Query` if the predicate or a sort key is malformed
    pub fn show_query(
        &self,
        source: Vec<DocumentView>,
        args: QuerySidebarArgs,
    ) -> SidebarResult<Vec<SurfaceId>> {
        self.items.compile(&args.query)?;
        let request = ComposeRequest::new(source).with_item_fn(Arc::new(QueryItems::new(args)));
        self.compose(request)
    }

    /// Resolve the entry rendered on the 0-based `line` of `surface`
    ///
    /// # Errors
    /// Returns `StaleReference` if the entry's document is gone, `NoEntry`
    /// for header, separator and out-of-range lines
    pub fn jump_to_source(
        &self,
        surface: SurfaceId,
        line: usize,
    ) -> SidebarResult<(Document, usize)> {
        let s = self
            .registry
            .surface(surface)
            .ok_or(SidebarError::UnknownSurface(surface))?;
        let tag = s
            .content()
            .entry_at_line(line)
            .ok_or_else(|| SidebarError::NoEntry {
                surface: s.name().to_string(),
                line,
            })?;
        let (document, offset) = tag.entry.marker().resolve()?;
        info!(surface = s.name(), line, document = %document.name(), offset, "jumped to source");
        Ok((document, offset))
    }
}

fn render_surface(renderer: &Renderer, descriptor: &ViewDescriptor) -> Surface {
    let surface = Surface::new(descriptor.name(), renderer.render(descriptor));
    match descriptor.description() {
        Some(help) => surface.with_description(help),
        None => surface,
    }
}
