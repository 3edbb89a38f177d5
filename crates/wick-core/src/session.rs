//! Session — the single owner of all editable diagram state.
//!
//! The controller holds one [`Session`] and mutates it only through these
//! methods, one command at a time. Layout and snippet output are derived on
//! demand and never stored.
//!
//! Structural changes to the slot line (reconfigure or resize) always drop
//! every contraction, since indices no longer mean what they did.

use crate::contraction::{Contraction, ContractionSet};
use crate::error::Result;
use crate::layout::{self, PlacedArc};
use crate::register::Register;
use crate::slot::{OperatorCounts, Registry, Slot};
use crate::snippet;

/// Outcome of the select gesture on a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// The slot is now the pending first endpoint.
    Started(usize),
    /// A contraction was created.
    Completed(Contraction),
    /// The pending slot was selected again and the selection dropped.
    Cancelled(usize),
}

/// Slots, contractions, and the yank register.
#[derive(Debug, Clone)]
pub struct Session {
    registry: Registry,
    contractions: ContractionSet,
    register: Register,
}

impl Session {
    /// A session with empty slots.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`](crate::Error::Configuration) when
    /// `counts` has no slots.
    pub fn new(counts: OperatorCounts) -> Result<Self> {
        let registry = Registry::new(counts)?;
        let contractions = ContractionSet::new(registry.len());
        Ok(Self {
            registry,
            contractions,
            register: Register::new(),
        })
    }

    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    #[must_use]
    pub const fn contractions(&self) -> &ContractionSet {
        &self.contractions
    }

    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Always false once constructed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Slot at `index`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidIndex`](crate::Error::InvalidIndex) when out of range.
    pub fn slot(&self, index: usize) -> Result<&Slot> {
        self.registry.get(index)
    }

    /// Whether the slot belongs to a contraction.
    #[must_use]
    pub fn is_used(&self, index: usize) -> bool {
        self.contractions.is_used(index)
    }

    /// Pending first endpoint.
    #[must_use]
    pub const fn pending(&self) -> Option<usize> {
        self.contractions.pending()
    }

    /// Fresh empty slots; every contraction is dropped.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`](crate::Error::Configuration); nothing
    /// changes in that case.
    pub fn configure(&mut self, counts: OperatorCounts) -> Result<()> {
        self.registry.configure(counts)?;
        self.contractions.reset(self.registry.len());
        Ok(())
    }

    /// New counts keeping surviving slot contents; every contraction is
    /// dropped.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`](crate::Error::Configuration); nothing
    /// changes in that case.
    pub fn resize(&mut self, counts: OperatorCounts) -> Result<()> {
        self.registry.resize(counts)?;
        self.contractions.reset(self.registry.len());
        Ok(())
    }

    /// The select gesture: start a contraction, finish one, or cancel the
    /// pending selection when the pending slot is picked again.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidIndex`](crate::Error::InvalidIndex) or
    /// [`Error::SlotAlreadyUsed`](crate::Error::SlotAlreadyUsed).
    pub fn select(&mut self, index: usize) -> Result<Selection> {
        match self.contractions.pending() {
            Some(pending) if pending == index => {
                self.contractions.cancel_pending();
                Ok(Selection::Cancelled(index))
            }
            Some(_) => self.contractions.complete(index).map(Selection::Completed),
            None => {
                self.contractions.begin(index)?;
                Ok(Selection::Started(index))
            }
        }
    }

    /// Replace a slot's content. Contractions are unaffected.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidIndex`](crate::Error::InvalidIndex).
    pub fn set_content(&mut self, index: usize, text: impl Into<String>) -> Result<()> {
        self.registry.set_content(index, text)
    }

    /// Remove the contraction touching `index`. A successful removal also
    /// drops any pending selection.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidIndex`](crate::Error::InvalidIndex).
    pub fn remove_involving(&mut self, index: usize) -> Result<Option<Contraction>> {
        let removed = self.contractions.remove_involving(index)?;
        if removed.is_some() {
            self.contractions.cancel_pending();
        }
        Ok(removed)
    }

    /// Remove every contraction and the pending selection.
    pub fn clear(&mut self) {
        self.contractions.clear();
    }

    /// Copy a slot's content into the register.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidIndex`](crate::Error::InvalidIndex).
    pub fn yank(&mut self, index: usize) -> Result<()> {
        let text = self.registry.content(index)?.to_owned();
        self.register.yank(text);
        Ok(())
    }

    /// Write the register into a slot.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyRegister`](crate::Error::EmptyRegister) or
    /// [`Error::InvalidIndex`](crate::Error::InvalidIndex).
    pub fn paste(&mut self, index: usize) -> Result<()> {
        let text = self.register.paste()?.to_owned();
        self.registry.set_content(index, text)
    }

    /// Arcs with lanes for the current contractions.
    #[must_use]
    pub fn arcs(&self) -> Vec<PlacedArc> {
        layout::arcs_for(&self.contractions)
    }

    /// LaTeX for the current diagram.
    #[must_use]
    pub fn snippet(&self) -> String {
        snippet::render(&self.registry, &self.contractions)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use pretty_assertions::assert_eq;

    fn session() -> Session {
        Session::new(OperatorCounts::new(2, 1, 1)).unwrap()
    }

    #[test]
    fn select_twice_makes_contraction() {
        let mut s = session();
        assert_eq!(s.select(0), Ok(Selection::Started(0)));
        assert_eq!(s.pending(), Some(0));
        assert_eq!(s.select(3), Ok(Selection::Completed(Contraction::new(0, 3))));
        assert!(s.is_used(0) && s.is_used(3));
        assert_eq!(s.pending(), None);
    }

    #[test]
    fn reselecting_pending_cancels() {
        let mut s = session();
        s.select(1).unwrap();
        assert_eq!(s.select(1), Ok(Selection::Cancelled(1)));
        assert_eq!(s.pending(), None);
        assert!(s.contractions().is_empty());
    }

    #[test]
    fn selecting_used_slot_is_rejected() {
        let mut s = session();
        s.select(0).unwrap();
        s.select(1).unwrap();
        assert_eq!(s.select(1), Err(Error::SlotAlreadyUsed(1)));
        s.select(2).unwrap();
        assert_eq!(s.select(0), Err(Error::SlotAlreadyUsed(0)));
        assert_eq!(s.pending(), Some(2));
    }

    #[test]
    fn remove_clears_pending() {
        let mut s = session();
        s.select(0).unwrap();
        s.select(1).unwrap();
        s.select(2).unwrap();
        assert_eq!(s.remove_involving(0), Ok(Some(Contraction::new(0, 1))));
        assert_eq!(s.pending(), None);
    }

    #[test]
    fn remove_without_contraction_keeps_pending() {
        let mut s = session();
        s.select(2).unwrap();
        assert_eq!(s.remove_involving(3), Ok(None));
        assert_eq!(s.pending(), Some(2));
    }

    #[test]
    fn configure_drops_contractions() {
        let mut s = session();
        s.set_content(0, "a").unwrap();
        s.select(0).unwrap();
        s.select(1).unwrap();
        s.configure(OperatorCounts::new(1, 1, 1)).unwrap();
        assert!(s.contractions().is_empty());
        assert!((0..s.len()).all(|i| !s.is_used(i)));
        assert_eq!(s.slot(0).unwrap().content, "");
    }

    #[test]
    fn resize_keeps_content_drops_contractions() {
        let mut s = session();
        s.set_content(0, "a").unwrap();
        s.select(0).unwrap();
        s.select(3).unwrap();
        s.resize(OperatorCounts::new(3, 1, 1)).unwrap();
        assert_eq!(s.len(), 5);
        assert_eq!(s.slot(0).unwrap().content, "a");
        assert!(s.contractions().is_empty());
        assert_eq!(s.contractions().slot_count(), 5);
    }

    #[test]
    fn failed_resize_changes_nothing() {
        let mut s = session();
        s.select(0).unwrap();
        s.select(1).unwrap();
        assert!(s.resize(OperatorCounts::new(0, 0, 0)).is_err());
        assert_eq!(s.contractions().len(), 1);
    }

    #[test]
    fn yank_and_paste() {
        let mut s = session();
        assert_eq!(s.paste(1), Err(Error::EmptyRegister));
        s.set_content(0, r"\phi").unwrap();
        s.yank(0).unwrap();
        s.paste(2).unwrap();
        assert_eq!(s.slot(2).unwrap().content, r"\phi");
    }

    #[test]
    fn content_edits_leave_contractions() {
        let mut s = session();
        s.select(0).unwrap();
        s.select(1).unwrap();
        s.set_content(0, "z").unwrap();
        assert!(s.is_used(0));
    }

    #[test]
    fn derived_views() {
        let mut s = session();
        for (i, t) in ["a", "b", "c", "d"].into_iter().enumerate() {
            s.set_content(i, t).unwrap();
        }
        s.select(0).unwrap();
        s.select(3).unwrap();
        assert_eq!(s.snippet(), r"\braket{ \wick{ \c1{a}b|c|\c1{d} } }");
        let arcs = s.arcs();
        assert_eq!(arcs.len(), 1);
        assert_eq!(arcs[0].lane, 0);
    }
}
