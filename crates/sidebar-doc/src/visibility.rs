//! Per-view hidden ranges
//!
//! Folding is a view property: each view over a document keeps its own set
//! of hidden byte ranges. Ranges are kept disjoint and merged on insert.
//! A view registers its set with the document, which shifts the ranges on
//! every edit the same way it shifts markers.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::{Arc, Weak};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RangeSet {
    hidden: BTreeMap<usize, usize>,
}

impl RangeSet {
    fn hide(&mut self, range: Range<usize>) {
        if range.start >= range.end {
            return;
        }
        let mut start = range.start;
        let mut end = range.end;
        let touching: Vec<usize> = self
            .hidden
            .range(..=range.end)
            .filter(|(_, &e)| e >= range.start)
            .map(|(&s, _)| s)
            .collect();
        for s in touching {
            if let Some(e) = self.hidden.remove(&s) {
                start = start.min(s);
                end = end.max(e);
            }
        }
        self.hidden.insert(start, end);
    }

    fn show(&mut self, range: Range<usize>) {
        if range.start >= range.end {
            return;
        }
        let overlapping: Vec<(usize, usize)> = self
            .hidden
            .range(..range.end)
            .filter(|(_, &e)| e > range.start)
            .map(|(&s, &e)| (s, e))
            .collect();
        for (s, e) in overlapping {
            self.hidden.remove(&s);
            if s < range.start {
                self.hidden.insert(s, range.start);
            }
            if e > range.end {
                self.hidden.insert(range.end, e);
            }
        }
    }

    fn is_hidden(&self, pos: usize) -> bool {
        self.hidden
            .range(..=pos)
            .next_back()
            .is_some_and(|(_, &end)| pos < end)
    }

    fn remap(&mut self, f: impl Fn(usize, usize) -> (usize, usize)) {
        let old = std::mem::take(&mut self.hidden);
        for (s, e) in old {
            let (s, e) = f(s, e);
            self.hide(s..e);
        }
    }

    /// Both ends behave like markers: text inserted at a range's start is
    /// hidden with it, text inserted at its end stays visible.
    pub(crate) fn shift_for_insert(&mut self, pos: usize, len: usize) {
        self.remap(|s, e| {
            if pos < s {
                (s + len, e + len)
            } else if pos < e {
                (s, e + len)
            } else {
                (s, e)
            }
        });
    }

    pub(crate) fn shift_for_delete(&mut self, range: &Range<usize>) {
        let removed = range.end - range.start;
        let map = |x: usize| {
            if x >= range.end {
                x - removed
            } else {
                x.min(range.start)
            }
        };
        self.remap(|s, e| (map(s), map(e)));
    }

    pub(crate) fn clamp(&mut self, len: usize) {
        self.remap(|s, e| (s.min(len), e.min(len)));
    }
}

/// Set of hidden byte ranges
#[derive(Debug, Default)]
pub struct Visibility {
    set: Arc<Mutex<RangeSet>>,
}

impl Clone for Visibility {
    /// Copies the ranges into an independent set
    fn clone(&self) -> Self {
        Self {
            set: Arc::new(Mutex::new(self.set.lock().clone())),
        }
    }
}

impl PartialEq for Visibility {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.set, &other.set) || *self.set.lock() == *other.set.lock()
    }
}

impl Eq for Visibility {}

impl Visibility {
    /// Create with nothing hidden
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn downgrade(&self) -> Weak<Mutex<RangeSet>> {
        Arc::downgrade(&self.set)
    }

    /// Hide `range`, merging with touching ranges
    pub fn hide(&mut self, range: Range<usize>) {
        self.set.lock().hide(range);
    }

    /// Reveal `range`, splitting hidden ranges that straddle it
    pub fn show(&mut self, range: Range<usize>) {
        self.set.lock().show(range);
    }

    /// Check whether `pos` is hidden
    #[must_use]
    pub fn is_hidden(&self, pos: usize) -> bool {
        self.set.lock().is_hidden(pos)
    }

    /// Check whether any part of `range` is hidden
    #[must_use]
    pub fn any_hidden(&self, range: Range<usize>) -> bool {
        self.set
            .lock()
            .hidden
            .range(..range.end)
            .any(|(_, &e)| e > range.start)
    }

    /// Hidden ranges in order
    #[must_use]
    pub fn ranges(&self) -> Vec<Range<usize>> {
        self.set.lock().hidden.iter().map(|(&s, &e)| s..e).collect()
    }

    /// Check if nothing is hidden
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.set.lock().hidden.is_empty()
    }

    /// Reveal everything
    pub fn clear(&mut self) {
        self.set.lock().hidden.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn hide_merges() {
        let mut v = Visibility::new();
        v.hide(0..5);
        v.hide(5..10);
        v.hide(20..30);
        v.hide(8..22);
        assert_eq!(v.ranges(), vec![0..30]);
    }

    #[test]
    fn show_splits() {
        let mut v = Visibility::new();
        v.hide(0..30);
        v.show(10..20);
        assert_eq!(v.ranges(), vec![0..10, 20..30]);
        assert!(v.is_hidden(9));
        assert!(!v.is_hidden(10));
        assert!(!v.is_hidden(19));
        assert!(v.is_hidden(20));
        assert!(!v.is_hidden(30));
    }

    #[test]
    fn empty_ranges_ignored() {
        let mut v = Visibility::new();
        v.hide(4..4);
        assert!(v.is_empty());
        assert!(!v.any_hidden(0..100));
    }

    #[test]
    fn clones_are_independent() {
        let mut a = Visibility::new();
        a.hide(0..5);
        let mut b = a.clone();
        b.clear();
        assert_eq!(a.ranges(), vec![0..5]);
        assert!(b.is_empty());
    }

    #[test]
    fn inserts_shift_or_grow_ranges() {
        let mut set = RangeSet::default();
        set.hide(10..20);
        set.hide(30..40);

        set.shift_for_insert(5, 5);
        assert_eq!(set.hidden, BTreeMap::from([(15, 25), (35, 45)]));

        set.shift_for_insert(15, 2);
        assert_eq!(set.hidden, BTreeMap::from([(15, 27), (37, 47)]));

        set.shift_for_insert(47, 3);
        assert_eq!(set.hidden, BTreeMap::from([(15, 27), (37, 47)]));
    }

    #[test]
    fn deletes_collapse_ranges() {
        let mut set = RangeSet::default();
        set.hide(10..20);
        set.hide(30..40);

        set.shift_for_delete(&(0..5));
        assert_eq!(set.hidden, BTreeMap::from([(5, 15), (25, 35)]));

        set.shift_for_delete(&(12..28));
        assert_eq!(set.hidden, BTreeMap::from([(5, 19)]));

        set.shift_for_delete(&(5..19));
        assert!(set.hidden.is_empty());
    }

    proptest! {
        #[test]
        fn hide_then_show_same_range_reveals(start in 0usize..100, len in 1usize..50, probe in 0usize..200) {
            let mut v = Visibility::new();
            v.hide(start..start + len);
            v.show(start..start + len);
            prop_assert!(!v.is_hidden(probe));
        }

        #[test]
        fn ranges_stay_disjoint(ops in prop::collection::vec((0usize..100, 1usize..20, any::<bool>()), 0..30)) {
            let mut v = Visibility::new();
            for (start, len, hide) in ops {
                if hide { v.hide(start..start + len) } else { v.show(start..start + len) }
            }
            let ranges = v.ranges();
            for pair in ranges.windows(2) {
                prop_assert!(pair[0].end < pair[1].start);
            }
        }

        #[test]
        fn insert_before_range_keeps_hidden_text(start in 1usize..100, len in 1usize..50, at in 0usize..100, added in 1usize..20) {
            let at = at % start;
            let mut set = RangeSet::default();
            set.hide(start..start + len);
            set.shift_for_insert(at, added);
            prop_assert_eq!(set.hidden.clone(), BTreeMap::from([(start + added, start + len + added)]));
        }
    }
}
