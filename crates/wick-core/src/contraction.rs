//! Contraction set — pairings over slot indices.
//!
//! A contraction is made with a two-step gesture: [`begin`] marks the first
//! endpoint as pending, [`complete`] pairs it with a second slot. Every slot
//! takes part in at most one contraction; every rejected call leaves the set
//! exactly as it was.
//!
//! Contractions are kept in creation order. A contraction's `\cN` label is
//! its position in that order, so removing one renumbers the later ones
//! and the live labels stay dense.
//!
//! [`begin`]: ContractionSet::begin
//! [`complete`]: ContractionSet::complete

use std::hash::{Hash, Hasher};

use crate::error::{Error, Result};

/// Number of distinct `\cN` labels the LaTeX macros accept.
pub const LABELS: usize = 9;

// ── Contraction ───────────────────────────────────────────────────────────

/// An unordered pair of distinct slots.
///
/// `first` is the endpoint selected first; equality and hashing ignore the
/// order.
#[derive(Debug, Clone, Copy, Eq)]
pub struct Contraction {
    pub first: usize,
    pub second: usize,
}

impl Contraction {
    #[must_use]
    pub const fn new(first: usize, second: usize) -> Self {
        Self { first, second }
    }

    /// Smaller endpoint.
    #[must_use]
    pub const fn start(&self) -> usize {
        if self.first < self.second { self.first } else { self.second }
    }

    /// Larger endpoint.
    #[must_use]
    pub const fn end(&self) -> usize {
        if self.first < self.second { self.second } else { self.first }
    }

    /// Whether `index` is one of the endpoints.
    #[must_use]
    pub const fn contains(&self, index: usize) -> bool {
        self.first == index || self.second == index
    }

    /// The endpoint opposite `index`.
    #[must_use]
    pub const fn other(&self, index: usize) -> Option<usize> {
        if self.first == index {
            Some(self.second)
        } else if self.second == index {
            Some(self.first)
        } else {
            None
        }
    }
}

impl PartialEq for Contraction {
    fn eq(&self, other: &Self) -> bool {
        self.start() == other.start() && self.end() == other.end()
    }
}

impl Hash for Contraction {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.start().hash(state);
        self.end().hash(state);
    }
}

/// The digit used in `\cN{…}` for the contraction at `position` (0-based)
/// in creation order. Wraps after nine.
#[must_use]
pub const fn label(position: usize) -> usize {
    position % LABELS + 1
}

// ── ContractionSet ────────────────────────────────────────────────────────

/// All contractions over a registry of `slot_count` slots.
#[derive(Debug, Clone)]
pub struct ContractionSet {
    entries: Vec<Contraction>,
    used: Vec<bool>,
    pending: Option<usize>,
}

impl ContractionSet {
    /// An empty set over `slot_count` slots.
    #[must_use]
    pub fn new(slot_count: usize) -> Self {
        Self {
            entries: Vec::new(),
            used: vec![false; slot_count],
            pending: None,
        }
    }

    /// Drop everything and resize for a new registry.
    pub fn reset(&mut self, slot_count: usize) {
        *self = Self::new(slot_count);
    }

    /// Number of slots this set covers.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.used.len()
    }

    /// Number of contractions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no contractions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The pending first endpoint, if any.
    #[must_use]
    pub const fn pending(&self) -> Option<usize> {
        self.pending
    }

    /// Whether `index` is an endpoint of some contraction.
    #[must_use]
    pub fn is_used(&self, index: usize) -> bool {
        self.used.get(index).copied().unwrap_or(false)
    }

    /// Contractions in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Contraction> {
        self.entries.iter()
    }

    /// Contractions in creation order with their `\cN` labels.
    pub fn labeled(&self) -> impl Iterator<Item = (usize, Contraction)> {
        self.entries.iter().enumerate().map(|(pos, &c)| (label(pos), c))
    }

    fn check(&self, index: usize) -> Result<()> {
        if index >= self.used.len() {
            return Err(Error::InvalidIndex {
                index,
                len: self.used.len(),
            });
        }
        if self.used[index] {
            return Err(Error::SlotAlreadyUsed(index));
        }
        Ok(())
    }

    /// Mark `index` as the first endpoint of a new contraction. Replaces any
    /// earlier pending endpoint.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidIndex`] or [`Error::SlotAlreadyUsed`].
    pub fn begin(&mut self, index: usize) -> Result<()> {
        self.check(index)?;
        self.pending = Some(index);
        Ok(())
    }

    /// Pair the pending endpoint with `index`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidIndex`], [`Error::NoPendingSelection`],
    /// [`Error::SlotAlreadyUsed`] or [`Error::SelfContraction`]. The pending
    /// endpoint survives a rejected call.
    pub fn complete(&mut self, index: usize) -> Result<Contraction> {
        if index >= self.used.len() {
            return Err(Error::InvalidIndex {
                index,
                len: self.used.len(),
            });
        }
        let first = self.pending.ok_or(Error::NoPendingSelection)?;
        self.check(index)?;
        if index == first {
            return Err(Error::SelfContraction(index));
        }

        let contraction = Contraction::new(first, index);
        self.entries.push(contraction);
        self.used[first] = true;
        self.used[index] = true;
        self.pending = None;
        Ok(contraction)
    }

    /// Forget the pending endpoint. Returns it, if there was one.
    pub const fn cancel_pending(&mut self) -> Option<usize> {
        self.pending.take()
    }

    /// Delete the contraction touching `index`. `Ok(None)` when there is
    /// none, in which case nothing changes.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidIndex`] when out of range.
    pub fn remove_involving(&mut self, index: usize) -> Result<Option<Contraction>> {
        if index >= self.used.len() {
            return Err(Error::InvalidIndex {
                index,
                len: self.used.len(),
            });
        }
        let Some(pos) = self.entries.iter().position(|c| c.contains(index)) else {
            return Ok(None);
        };
        let removed = self.entries.remove(pos);
        self.used[removed.first] = false;
        self.used[removed.second] = false;
        Ok(Some(removed))
    }

    /// Remove every contraction and the pending endpoint.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.used.fill(false);
        self.pending = None;
    }
}

// ── Tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn contract(set: &mut ContractionSet, a: usize, b: usize) -> Contraction {
        set.begin(a).unwrap();
        set.complete(b).unwrap()
    }

    #[test]
    fn unordered_equality() {
        assert_eq!(Contraction::new(1, 4), Contraction::new(4, 1));
        assert_ne!(Contraction::new(1, 4), Contraction::new(1, 3));
        let set: HashSet<_> = [Contraction::new(0, 2), Contraction::new(2, 0)].into();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn endpoints() {
        let c = Contraction::new(5, 2);
        assert_eq!((c.start(), c.end()), (2, 5));
        assert!(c.contains(5));
        assert_eq!(c.other(5), Some(2));
        assert_eq!(c.other(3), None);
    }

    #[test]
    fn begin_complete_marks_both_used() {
        let mut set = ContractionSet::new(4);
        let c = contract(&mut set, 0, 3);
        assert_eq!(c, Contraction::new(0, 3));
        assert!(set.is_used(0));
        assert!(set.is_used(3));
        assert!(!set.is_used(1));
        assert_eq!(set.pending(), None);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn self_contraction_is_rejected() {
        let mut set = ContractionSet::new(4);
        set.begin(2).unwrap();
        assert_eq!(set.complete(2), Err(Error::SelfContraction(2)));
        assert!(set.is_empty());
        assert_eq!(set.pending(), Some(2));
    }

    #[test]
    fn used_slots_are_rejected() {
        let mut set = ContractionSet::new(4);
        contract(&mut set, 0, 1);
        assert_eq!(set.begin(1), Err(Error::SlotAlreadyUsed(1)));
        set.begin(2).unwrap();
        assert_eq!(set.complete(0), Err(Error::SlotAlreadyUsed(0)));
        assert_eq!(set.pending(), Some(2));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn complete_without_pending() {
        let mut set = ContractionSet::new(2);
        assert_eq!(set.complete(1), Err(Error::NoPendingSelection));
    }

    #[test]
    fn out_of_range() {
        let mut set = ContractionSet::new(2);
        assert_eq!(set.begin(2), Err(Error::InvalidIndex { index: 2, len: 2 }));
        assert!(set.remove_involving(5).is_err());
        set.begin(0).unwrap();
        assert!(set.complete(9).is_err());
        assert_eq!(set.pending(), Some(0));
    }

    #[test]
    fn cancel_pending() {
        let mut set = ContractionSet::new(3);
        set.begin(1).unwrap();
        assert_eq!(set.cancel_pending(), Some(1));
        assert_eq!(set.cancel_pending(), None);
        assert!(set.is_empty());
    }

    #[test]
    fn remove_on_unused_slot_is_noop() {
        let mut set = ContractionSet::new(4);
        contract(&mut set, 0, 1);
        assert_eq!(set.remove_involving(3), Ok(None));
        assert_eq!(set.len(), 1);
        assert!(set.is_used(0));
    }

    #[test]
    fn remove_frees_both_endpoints() {
        let mut set = ContractionSet::new(4);
        contract(&mut set, 0, 2);
        assert_eq!(set.remove_involving(2), Ok(Some(Contraction::new(0, 2))));
        assert!(!set.is_used(0));
        assert!(!set.is_used(2));
        set.begin(0).unwrap();
    }

    #[test]
    fn removal_renumbers_later_contractions() {
        let mut set = ContractionSet::new(6);
        contract(&mut set, 0, 1);
        contract(&mut set, 2, 3);
        set.remove_involving(0).unwrap();
        contract(&mut set, 4, 5);
        let labeled: Vec<_> = set.labeled().collect();
        assert_eq!(
            labeled,
            vec![(1, Contraction::new(2, 3)), (2, Contraction::new(4, 5))]
        );
    }

    #[test]
    fn add_remove_cycles_never_reuse_a_live_label() {
        let mut set = ContractionSet::new(4);
        contract(&mut set, 0, 1);
        for _ in 0..8 {
            contract(&mut set, 2, 3);
            set.remove_involving(2).unwrap();
        }
        contract(&mut set, 2, 3);
        let labels: Vec<_> = set.labeled().map(|(n, _)| n).collect();
        assert_eq!(labels, vec![1, 2]);
    }

    #[test]
    fn clear_restarts_numbering() {
        let mut set = ContractionSet::new(4);
        contract(&mut set, 0, 1);
        set.begin(2).unwrap();
        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.pending(), None);
        assert!((0..4).all(|i| !set.is_used(i)));
        contract(&mut set, 2, 3);
        assert_eq!(set.labeled().next(), Some((1, Contraction::new(2, 3))));
    }

    #[test]
    fn labels_wrap_after_nine() {
        assert_eq!(label(0), 1);
        assert_eq!(label(8), 9);
        assert_eq!(label(9), 1);
    }

    #[test]
    fn reset_resizes() {
        let mut set = ContractionSet::new(2);
        contract(&mut set, 0, 1);
        set.reset(5);
        assert_eq!(set.slot_count(), 5);
        assert!(set.is_empty());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Begin(usize),
        Complete(usize),
        Cancel,
        Remove(usize),
        Clear,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => (0..12usize).prop_map(Op::Begin),
            4 => (0..12usize).prop_map(Op::Complete),
            1 => Just(Op::Cancel),
            2 => (0..12usize).prop_map(Op::Remove),
            1 => Just(Op::Clear),
        ]
    }

    proptest! {
        #[test]
        fn every_slot_in_at_most_one_contraction(ops in proptest::collection::vec(op(), 0..64)) {
            let mut set = ContractionSet::new(10);
            for op in ops {
                let before = set.clone();
                let result = match op {
                    Op::Begin(i) => set.begin(i).map(|()| ()),
                    Op::Complete(i) => set.complete(i).map(|_| ()),
                    Op::Cancel => { set.cancel_pending(); Ok(()) }
                    Op::Remove(i) => set.remove_involving(i).map(|_| ()),
                    Op::Clear => { set.clear(); Ok(()) }
                };
                if result.is_err() {
                    prop_assert_eq!(set.len(), before.len());
                    prop_assert_eq!(set.pending(), before.pending());
                }

                let mut seen = HashSet::new();
                for c in set.iter() {
                    prop_assert!(c.first != c.second);
                    prop_assert!(seen.insert(c.first));
                    prop_assert!(seen.insert(c.second));
                }
                for i in 0..set.slot_count() {
                    prop_assert_eq!(set.is_used(i), seen.contains(&i));
                }

                // Ten slots hold at most five contractions, so labels never wrap.
                let labels: Vec<_> = set.labeled().map(|(n, _)| n).collect();
                prop_assert_eq!(labels, (1..=set.len()).collect::<Vec<_>>());
            }
        }
    }
}
