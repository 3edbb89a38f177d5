//! Register — the session's internal yank buffer.
//!
//! `y` copies the selected slot's content here and `p` writes it back into
//! another slot. The register lives as long as the session, is overwritten
//! by every yank, and is independent of the system clipboard: pasting
//! works even when no clipboard tool is installed.

use crate::error::{Error, Result};

/// A single text slot holding the last yanked content.
#[derive(Debug, Clone, Default)]
pub struct Register {
    content: String,
}

impl Register {
    /// Create an empty register.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            content: String::new(),
        }
    }

    /// Store text, replacing any previous content.
    pub fn yank(&mut self, text: impl Into<String>) {
        self.content = text.into();
    }

    /// The stored text. Yanking an empty slot empties the register.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyRegister`] when there is nothing to paste.
    pub fn paste(&self) -> Result<&str> {
        if self.content.is_empty() {
            return Err(Error::EmptyRegister);
        }
        Ok(&self.content)
    }

    /// True if there is nothing to paste.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

// ── Tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_register_is_empty() {
        let reg = Register::new();
        assert!(reg.is_empty());
        assert_eq!(reg.paste(), Err(Error::EmptyRegister));
    }

    #[test]
    fn yank_then_paste() {
        let mut reg = Register::new();
        reg.yank(r"\phi_1");
        assert_eq!(reg.paste(), Ok(r"\phi_1"));
    }

    #[test]
    fn yank_replaces_previous_content() {
        let mut reg = Register::new();
        reg.yank("first");
        reg.yank("second");
        assert_eq!(reg.paste(), Ok("second"));
    }

    #[test]
    fn yanking_blank_empties_register() {
        let mut reg = Register::new();
        reg.yank("x");
        reg.yank("");
        assert!(reg.is_empty());
    }

    #[test]
    fn paste_does_not_consume() {
        let mut reg = Register::new();
        reg.yank("日本語");
        assert_eq!(reg.paste(), Ok("日本語"));
        assert_eq!(reg.paste(), Ok("日本語"));
    }
}
