//! Display slots for tree and subtree views

/// Ordered display slots, each showing one view name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplaySlots {
    slots: Vec<String>,
}

impl DisplaySlots {
    /// Create with no slots
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot showing `name`
    #[must_use]
    pub fn slot_of(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|s| s == name)
    }

    /// Show `name`, opening a new slot unless it is already shown
    pub fn show(&mut self, name: &str) -> usize {
        if let Some(slot) = self.slot_of(name) {
            return slot;
        }
        self.slots.push(name.to_string());
        self.slots.len() - 1
    }

    /// Show `name` in an existing slot, returning the name it displaced
    ///
    /// Falls back to [`show`](Self::show) when `slot` does not exist.
    pub fn show_in(&mut self, slot: usize, name: &str) -> (usize, Option<String>) {
        if let Some(current) = self.slot_of(name) {
            return (current, None);
        }
        match self.slots.get_mut(slot) {
            Some(s) => (slot, Some(std::mem::replace(s, name.to_string()))),
            None => (self.show(name), None),
        }
    }

    /// Close the slot showing `name`
    pub fn hide(&mut self, name: &str) -> bool {
        match self.slot_of(name) {
            Some(slot) => {
                self.slots.remove(slot);
                true
            }
            None => false,
        }
    }

    /// Names in slot order
    #[inline]
    #[must_use]
    pub fn displayed(&self) -> &[String] {
        &self.slots
    }

    /// Number of open slots
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if no slot is open
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_is_idempotent_and_show_in_replaces() {
        let mut slots = DisplaySlots::new();
        assert_eq!(slots.show("<tree>a"), 0);
        assert_eq!(slots.show("a::One"), 1);
        assert_eq!(slots.show("<tree>a"), 0);

        let (slot, displaced) = slots.show_in(1, "a::Two");
        assert_eq!(slot, 1);
        assert_eq!(displaced.as_deref(), Some("a::One"));
        assert_eq!(slots.displayed(), ["<tree>a", "a::Two"]);

        assert_eq!(slots.show_in(7, "b"), (2, None));
        assert!(slots.hide("<tree>a"));
        assert!(!slots.hide("<tree>a"));
        assert_eq!(slots.len(), 2);
    }
}
