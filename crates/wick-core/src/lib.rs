//! # wick-core — Contraction diagram engine for wick-tui
//!
//! Everything here is pure, synchronous state and derivation:
//!
//! - **[`slot`]** — `Registry` of operator slots in three categories
//! - **[`contraction`]** — `ContractionSet` with the at-most-one-use rule
//! - **[`layout`]** — lane assignment, slot placement, arc geometry
//! - **[`snippet`]** — the `\braket{ \wick{ … } }` LaTeX output
//! - **[`register`]** — the internal yank buffer
//! - **[`session`]** — the one struct the UI owns and mutates
//!
//! Nothing in this crate touches the terminal, the filesystem, or other
//! processes; `wick-host` does that.

pub mod contraction;
pub mod error;
pub mod layout;
pub mod register;
pub mod session;
pub mod slot;
pub mod snippet;

pub use contraction::{Contraction, ContractionSet};
pub use error::{Error, Result};
pub use session::{Selection, Session};
pub use slot::{Category, OperatorCounts, Registry, Slot};
