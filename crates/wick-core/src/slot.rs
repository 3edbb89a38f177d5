//! Slot registry — the fixed line of operator positions.
//!
//! Slots are laid out in three contiguous runs, always in the same order:
//! input states, interaction terms, external states. A slot's global
//! `index` is its position on the line; its `ordinal` is its 1-based
//! position within its own category. Content is free text (usually a LaTeX
//! fragment such as `\phi_1`) and may be empty.
//!
//! The registry knows nothing about contractions. Whether a slot is "used"
//! is derived from the [`ContractionSet`](crate::ContractionSet).

use std::fmt;

use crate::error::{Error, Result};

// ── Category ──────────────────────────────────────────────────────────────

/// Operator category. Declaration order is line order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Incoming states.
    Input,
    /// Interaction vertices.
    Interaction,
    /// Outgoing states.
    External,
}

impl Category {
    /// All categories in line order.
    pub const ALL: [Self; 3] = [Self::Input, Self::Interaction, Self::External];

    /// Key used in slot ids (`inputs-0`).
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Input => "inputs",
            Self::Interaction => "interactions",
            Self::External => "externals",
        }
    }

    /// Human-readable row name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Input => "Input States",
            Self::Interaction => "Interaction Terms",
            Self::External => "External States",
        }
    }

    /// One-letter prefix shown on the counts line.
    #[must_use]
    pub const fn prefix(self) -> char {
        match self {
            Self::Input => 'I',
            Self::Interaction => 'V',
            Self::External => 'E',
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ── OperatorCounts ────────────────────────────────────────────────────────

/// How many slots each category gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorCounts {
    pub inputs: usize,
    pub interactions: usize,
    pub externals: usize,
}

impl OperatorCounts {
    #[must_use]
    pub const fn new(inputs: usize, interactions: usize, externals: usize) -> Self {
        Self {
            inputs,
            interactions,
            externals,
        }
    }

    /// Total number of slots.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.inputs + self.interactions + self.externals
    }

    /// Count for one category.
    #[must_use]
    pub const fn get(&self, category: Category) -> usize {
        match category {
            Category::Input => self.inputs,
            Category::Interaction => self.interactions,
            Category::External => self.externals,
        }
    }

    /// Set the count for one category.
    pub const fn set(&mut self, category: Category, count: usize) {
        match category {
            Category::Input => self.inputs = count,
            Category::Interaction => self.interactions = count,
            Category::External => self.externals = count,
        }
    }

    /// Reject a configuration with no slots at all.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when every count is zero.
    pub fn validate(&self) -> Result<()> {
        if self.total() == 0 {
            return Err(Error::Configuration("Need at least one operator.".into()));
        }
        Ok(())
    }
}

impl Default for OperatorCounts {
    fn default() -> Self {
        Self::new(2, 6, 2)
    }
}

impl fmt::Display for OperatorCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={} {}={} {}={}",
            Category::Input.prefix(),
            self.inputs,
            Category::Interaction.prefix(),
            self.interactions,
            Category::External.prefix(),
            self.externals
        )
    }
}

// ── Slot ──────────────────────────────────────────────────────────────────

/// One operator position on the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    /// Global 0-based position.
    pub index: usize,
    pub category: Category,
    /// 1-based position within the category.
    pub ordinal: usize,
    pub content: String,
}

impl Slot {
    /// Stable id, e.g. `interactions-2` for the third interaction term.
    #[must_use]
    pub fn id(&self) -> String {
        format!("{}-{}", self.category.key(), self.ordinal - 1)
    }

    /// Status-line description, e.g. `Input States #1`.
    #[must_use]
    pub fn describe(&self) -> String {
        format!("{} #{}", self.category.display_name(), self.ordinal)
    }

    /// How the slot is drawn on the line: `[content]`, or `[ ]` when empty.
    #[must_use]
    pub fn display(&self) -> String {
        if self.content.is_empty() {
            "[ ]".to_string()
        } else {
            format!("[{}]", self.content)
        }
    }
}

// ── Registry ──────────────────────────────────────────────────────────────

/// Ordered slots plus the counts they were built from.
#[derive(Debug, Clone)]
pub struct Registry {
    slots: Vec<Slot>,
    counts: OperatorCounts,
}

impl Registry {
    /// Build a registry of empty slots.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when `counts` has no slots.
    pub fn new(counts: OperatorCounts) -> Result<Self> {
        counts.validate()?;
        Ok(Self {
            slots: build(counts, |_, _| String::new()),
            counts,
        })
    }

    /// Replace every slot with a fresh, empty one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when `counts` has no slots; the
    /// registry is unchanged in that case.
    pub fn configure(&mut self, counts: OperatorCounts) -> Result<()> {
        *self = Self::new(counts)?;
        Ok(())
    }

    /// Rebuild with new counts, keeping the content of every slot whose
    /// (category, ordinal) still exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when `counts` has no slots; the
    /// registry is unchanged in that case.
    pub fn resize(&mut self, counts: OperatorCounts) -> Result<()> {
        counts.validate()?;
        let previous = std::mem::take(&mut self.slots);
        self.slots = build(counts, |category, ordinal| {
            previous
                .iter()
                .find(|s| s.category == category && s.ordinal == ordinal)
                .map(|s| s.content.clone())
                .unwrap_or_default()
        });
        self.counts = counts;
        Ok(())
    }

    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Always false for a validated registry; present for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Counts the registry was built from.
    #[must_use]
    pub const fn counts(&self) -> OperatorCounts {
        self.counts
    }

    /// All slots in line order.
    #[must_use]
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Slot at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIndex`] when out of range.
    pub fn get(&self, index: usize) -> Result<&Slot> {
        self.slots.get(index).ok_or(Error::InvalidIndex {
            index,
            len: self.slots.len(),
        })
    }

    /// Content of the slot at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIndex`] when out of range.
    pub fn content(&self, index: usize) -> Result<&str> {
        self.get(index).map(|s| s.content.as_str())
    }

    /// Replace the content of the slot at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIndex`] when out of range.
    pub fn set_content(&mut self, index: usize, text: impl Into<String>) -> Result<()> {
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(Error::InvalidIndex { index, len })?;
        slot.content = text.into();
        Ok(())
    }

    /// Whether a category separator sits immediately before `index`.
    #[must_use]
    pub fn boundary_before(&self, index: usize) -> bool {
        index > 0
            && index < self.slots.len()
            && self.slots[index - 1].category != self.slots[index].category
    }
}

fn build(counts: OperatorCounts, mut content: impl FnMut(Category, usize) -> String) -> Vec<Slot> {
    let mut slots = Vec::with_capacity(counts.total());
    for category in Category::ALL {
        for ordinal in 1..=counts.get(category) {
            slots.push(Slot {
                index: slots.len(),
                category,
                ordinal,
                content: content(category, ordinal),
            });
        }
    }
    slots
}

// ── Tests ──────────────────────────────────────────────────────────────
