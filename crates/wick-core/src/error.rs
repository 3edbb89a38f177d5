//! Error taxonomy for the diagram engine.
//!
//! Every variant is a rejected operation: the registry and the contraction
//! set are left exactly as they were before the call.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Why an engine operation was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A slot index past the end of the registry.
    #[error("slot index {index} out of range (have {len} slots)")]
    InvalidIndex { index: usize, len: usize },

    /// The slot already belongs to a contraction.
    #[error("slot {0} already participates in a contraction")]
    SlotAlreadyUsed(usize),

    /// Both endpoints of the contraction would be the same slot.
    #[error("slot {0} cannot be contracted with itself")]
    SelfContraction(usize),

    /// `complete` was called without a pending first endpoint.
    #[error("no pending selection to complete")]
    NoPendingSelection,

    /// Paste was requested before anything was yanked.
    #[error("clipboard is empty; copy a field first")]
    EmptyRegister,

    /// Operator counts that cannot produce a usable registry.
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

impl Error {
    /// Whether the error comes from a user gesture rather than a wiring bug.
    #[must_use]
    pub const fn is_gesture(&self) -> bool {
        matches!(
            self,
            Self::SlotAlreadyUsed(_) | Self::SelfContraction(_) | Self::NoPendingSelection | Self::EmptyRegister
        )
    }
}
