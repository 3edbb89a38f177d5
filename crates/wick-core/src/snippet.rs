//! Snippet generator — LaTeX markup for the current diagram.
//!
//! The output wraps the slot line in `simpler-wick` macros:
//!
//! ```text
//! \braket{ \wick{ \c1{a}b|c|\c1{d} } }
//! ```
//!
//! Slot contents are concatenated in line order with a bare `|` at each
//! category boundary. Both endpoints of a contraction are wrapped in
//! `\cN{…}`, where `N` is the contraction's position in creation order.
//! The output depends only on the registry and the contraction set.

use std::fmt::Write as _;

use crate::contraction::ContractionSet;
use crate::slot::Registry;

/// Render the diagram body as `\braket{ \wick{ … } }`.
#[must_use]
pub fn render(registry: &Registry, contractions: &ContractionSet) -> String {
    let mut labels = vec![None; registry.len()];
    for (n, c) in contractions.labeled() {
        for index in [c.first, c.second] {
            if let Some(slot) = labels.get_mut(index) {
                *slot = Some(n);
            }
        }
    }

    let mut body = String::new();
    for slot in registry.slots() {
        if registry.boundary_before(slot.index) {
            body.push('|');
        }
        match labels[slot.index] {
            // Writing to a String cannot fail.
            Some(n) => {
                let _ = write!(body, "\\c{n}{{{}}}", slot.content);
            }
            None => body.push_str(&slot.content),
        }
    }
    format!("\\braket{{ \\wick{{ {body} }} }}")
}

// ── Tests ──────────────────────────────────────────────────────────────
