//! Surface placement
//!
//! Placement receives the composed surfaces in order and decides where they
//! appear. [`SidePanel`] assigns fixed slots `0..n` on one side.

use crate::error::{SidebarError, SidebarResult};
use crate::surface::{Surface, SurfaceId};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Displays an ordered list of surfaces
pub trait Placement: Send + Sync {
    /// Display `surfaces` in order
    ///
    /// Returns the previously displayed surfaces that were evicted and are
    /// not part of the new list.
    ///
    /// # Errors
    /// Returns `Placement` if the surfaces cannot be displayed
    fn place(&self, surfaces: &[Surface]) -> SidebarResult<Vec<SurfaceId>>;
}

/// Workspace side of the panel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Left of the document
    Left,
    /// Right of the document
    #[default]
    Right,
}

/// Side panel settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Side the panel sits on
    pub side: Side,
    /// Panel width in columns
    pub width: usize,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            side: Side::Right,
            width: 40,
        }
    }
}

/// One occupied display slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotAssignment {
    /// Slot index, 0 at the top
    pub index: usize,
    /// Surface shown in the slot
    pub surface: SurfaceId,
    /// Surface name at placement time
    pub name: String,
}

/// Fixed slots on one side of the workspace
#[derive(Debug, Default)]
pub struct SidePanel {
    config: PlacementConfig,
    slots: Mutex<Vec<SlotAssignment>>,
}

impl SidePanel {
    /// Create empty panel
    #[must_use]
    pub fn new(config: PlacementConfig) -> Self {
        Self {
            config,
            slots: Mutex::new(Vec::new()),
        }
    }

    /// Panel settings
    #[inline]
    #[must_use]
    pub fn config(&self) -> PlacementConfig {
        self.config
    }

    /// Current slot assignments
    #[must_use]
    pub fn slots(&self) -> Vec<SlotAssignment> {
        self.slots.lock().clone()
    }
}

impl Placement for SidePanel {
    fn place(&self, surfaces: &[Surface]) -> SidebarResult<Vec<SurfaceId>> {
        if self.config.width == 0 {
            return Err(SidebarError::Placement("panel width must be positive".into()));
        }
        let mut slots = self.slots.lock();
        let evicted: Vec<SurfaceId> = slots
            .iter()
            .map(|s| s.surface)
            .filter(|id| !surfaces.iter().any(|s| s.id() == *id))
            .collect();
        *slots = surfaces
            .iter()
            .enumerate()
            .map(|(index, s)| SlotAssignment {
                index,
                surface: s.id(),
                name: s.name().to_string(),
            })
            .collect();
        tracing::debug!(
            side = ?self.config.side,
            placed = slots.len(),
            evicted = evicted.len(),
            "placed surfaces"
        );
        Ok(evicted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::DisplayText;

    #[test]
    fn slots_follow_order_and_evict_previous() {
        let panel = SidePanel::new(PlacementConfig::default());
        let a = Surface::new("A", DisplayText::new());
        let b = Surface::new("B", DisplayText::new());
        assert!(panel.place(&[a.clone(), b.clone()]).unwrap().is_empty());
        assert_eq!(panel.slots()[1].name, "B");

        let c = Surface::new("C", DisplayText::new());
        let evicted = panel.place(&[b.clone(), c]).unwrap();
        assert_eq!(evicted, vec![a.id()]);
        let slots = panel.slots();
        assert_eq!(slots[0].surface, b.id());
        assert_eq!(slots[1].index, 1);
    }

    #[test]
    fn zero_width_is_rejected() {
        let panel = SidePanel::new(PlacementConfig {
            side: Side::Left,
            width: 0,
        });
        assert!(matches!(panel.place(&[]), Err(SidebarError::Placement(_))));
    }
}
