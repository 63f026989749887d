//! View sessions and the surface registry
//!
//! Every composed surface gets the [`ViewSession`] that produced it attached
//! through an explicit side-table keyed by [`SurfaceId`]. Refresh reads the
//! session back instead of relying on ambient per-surface state.

use crate::compose::ComposeRequest;
use crate::surface::{Surface, SurfaceId};
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use ulid::Ulid;

/// Unique session identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(pub Ulid);

impl SessionId {
    /// Generate new session ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which part of a [`ComposeRequest`] produced a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceOrigin {
    /// Prebuilt buffer at this index
    Buffer(usize),
    /// Item function at this index
    ItemFn(usize),
    /// Descriptor at this index
    Descriptor(usize),
}

/// What produced a set of surfaces, kept for refresh
#[derive(Debug, Clone)]
pub struct ViewSession {
    id: SessionId,
    request: ComposeRequest,
    surfaces: Vec<SurfaceId>,
    origins: Vec<SurfaceOrigin>,
}

impl ViewSession {
    /// Create session for a request and the surfaces it produced
    #[must_use]
    pub fn new(request: ComposeRequest, placed: Vec<(SurfaceOrigin, SurfaceId)>) -> Self {
        let (origins, surfaces) = placed.into_iter().unzip();
        Self {
            id: SessionId::new(),
            request,
            surfaces,
            origins,
        }
    }

    /// Session identifier
    #[inline]
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Original request
    #[inline]
    #[must_use]
    pub fn request(&self) -> &ComposeRequest {
        &self.request
    }

    /// Surfaces in placement order
    #[inline]
    #[must_use]
    pub fn surfaces(&self) -> &[SurfaceId] {
        &self.surfaces
    }

    /// Surface produced by `origin`, if it produced one last time
    #[must_use]
    pub fn surface_from(&self, origin: SurfaceOrigin) -> Option<SurfaceId> {
        self.origins
            .iter()
            .position(|&o| o == origin)
            .map(|i| self.surfaces[i])
    }

    /// Same session with a new surface list
    #[must_use]
    pub(crate) fn with_surfaces(&self, placed: Vec<(SurfaceOrigin, SurfaceId)>) -> Self {
        let (origins, surfaces) = placed.into_iter().unzip();
        Self {
            id: self.id,
            request: self.request.clone(),
            surfaces,
            origins,
        }
    }
}

/// Live surfaces and the sessions attached to them
#[derive(Debug, Default)]
pub struct SessionRegistry {
    surfaces: DashMap<SurfaceId, Surface>,
    sessions: DashMap<SurfaceId, Arc<ViewSession>>,
}

impl SessionRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a surface, replacing one with the same id
    pub fn insert(&self, surface: Surface) {
        self.surfaces.insert(surface.id(), surface);
    }

    /// Attach session data to a surface
    pub fn attach(&self, surface: SurfaceId, session: Arc<ViewSession>) {
        self.sessions.insert(surface, session);
    }

    /// Session attached to a surface
    #[must_use]
    pub fn get(&self, surface: SurfaceId) -> Option<Arc<ViewSession>> {
        self.sessions.get(&surface).map(|s| Arc::clone(s.value()))
    }

    /// Snapshot of a surface
    #[must_use]
    pub fn surface(&self, surface: SurfaceId) -> Option<Surface> {
        self.surfaces.get(&surface).map(|s| s.value().clone())
    }

    /// Replace the content of a registered surface in place
    ///
    /// Returns the updated surface, or `None` if the id is unknown.
    pub fn rebuild(&self, surface: SurfaceId, fresh: Surface) -> Option<Surface> {
        let mut entry = self.surfaces.get_mut(&surface)?;
        entry.rebuild_from(fresh);
        Some(entry.value().clone())
    }

    /// Destroy a surface together with its session
    pub fn detach(&self, surface: SurfaceId) -> Option<Arc<ViewSession>> {
        self.surfaces.remove(&surface);
        self.sessions.remove(&surface).map(|(_, s)| s)
    }

    /// Check if a surface is registered
    #[must_use]
    pub fn contains(&self, surface: SurfaceId) -> bool {
        self.surfaces.contains_key(&surface)
    }

    /// Number of live surfaces
    #[must_use]
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    /// Check if no surfaces are live
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// Ids of surfaces named `name`
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Vec<SurfaceId> {
        self.surfaces
            .iter()
            .filter(|s| s.value().name() == name)
            .map(|s| *s.key())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::DisplayText;

    #[test]
    fn detach_destroys_surface_and_session() {
        let registry = SessionRegistry::new();
        let surface = Surface::new("Upcoming", DisplayText::new());
        let id = surface.id();
        registry.insert(surface);
        let session = Arc::new(ViewSession::new(
            ComposeRequest::default(),
            vec![(SurfaceOrigin::ItemFn(0), id)],
        ));
        registry.attach(id, Arc::clone(&session));

        assert_eq!(registry.get(id).unwrap().id(), session.id());
        assert_eq!(session.surface_from(SurfaceOrigin::ItemFn(0)), Some(id));
        assert_eq!(session.surface_from(SurfaceOrigin::ItemFn(1)), None);
        assert_eq!(registry.find_by_name("Upcoming"), vec![id]);

        assert!(registry.detach(id).is_some());
        assert!(registry.get(id).is_none());
        assert!(registry.surface(id).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn rebuild_unknown_surface_is_none() {
        let registry = SessionRegistry::new();
        let fresh = Surface::new("x", DisplayText::new());
        assert!(registry.rebuild(SurfaceId::new(), fresh).is_none());
    }
}
