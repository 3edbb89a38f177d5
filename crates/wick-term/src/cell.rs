// SPDX-License-Identifier: MIT
//
// Cell — one character position on screen.
//
// A cell is a codepoint plus its style: a foreground color and a set of
// SGR attributes. The diagram screen never paints backgrounds, so the
// terminal's own background shows through everywhere and a cell carries
// no background channel.
//
// Wide characters (CJK, some emoji) take two columns. The first cell
// holds the codepoint, the second is a continuation cell whose `ch` is
// NUL. The renderer skips continuation cells that directly follow their
// wide start.

// ─── Attributes ──────────────────────────────────────────────────────────────

bitflags::bitflags! {
    /// SGR text attributes.
    ///
    /// ```
    /// use wick_term::cell::Attr;
    ///
    /// let style = Attr::BOLD | Attr::INVERSE;
    /// assert!(style.contains(Attr::INVERSE));
    /// assert!(!style.contains(Attr::DIM));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        /// SGR 1 — increased intensity.
        const BOLD    = 1 << 0;
        /// SGR 2 — decreased intensity.
        const DIM     = 1 << 1;
        /// SGR 3 — italic.
        const ITALIC  = 1 << 2;
        /// SGR 7 — swap foreground and background.
        const INVERSE = 1 << 3;
    }
}

// ─── Color ───────────────────────────────────────────────────────────────────

/// A terminal-ready foreground color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum CellColor {
    /// The terminal's default foreground.
    #[default]
    Default,
    /// Palette index (0-15 standard, 16-255 extended).
    Ansi256(u8),
    /// 24-bit true color.
    Rgb(u8, u8, u8),
}

// ─── Cell ────────────────────────────────────────────────────────────────────

/// A single screen cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    /// The codepoint. NUL marks the second column of a wide character.
    pub ch: char,
    /// Foreground color.
    pub fg: CellColor,
    /// SGR attributes.
    pub attrs: Attr,
}

impl Cell {
    /// A blank cell: space, default color, no attributes.
    pub const EMPTY: Self = Self {
        ch: ' ',
        fg: CellColor::Default,
        attrs: Attr::empty(),
    };

    /// A plain cell holding `ch`.
    #[must_use]
    pub const fn new(ch: char) -> Self {
        Self {
            ch,
            fg: CellColor::Default,
            attrs: Attr::empty(),
        }
    }

    /// The continuation half of a wide character.
    #[must_use]
    pub const fn continuation(fg: CellColor, attrs: Attr) -> Self {
        Self { ch: '\0', fg, attrs }
    }

    /// Same cell with a different foreground.
    #[must_use]
    pub const fn with_fg(mut self, fg: CellColor) -> Self {
        self.fg = fg;
        self
    }

    /// Same cell with different attributes.
    #[must_use]
    pub const fn with_attrs(mut self, attrs: Attr) -> Self {
        self.attrs = attrs;
        self
    }

    /// Whether this is the trailing column of a wide character.
    #[inline]
    #[must_use]
    pub const fn is_continuation(self) -> bool {
        self.ch == '\0'
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::EMPTY
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_space_with_defaults() {
        assert_eq!(Cell::EMPTY.ch, ' ');
        assert_eq!(Cell::EMPTY.fg, CellColor::Default);
        assert!(Cell::EMPTY.attrs.is_empty());
        assert_eq!(Cell::default(), Cell::EMPTY);
    }

    #[test]
    fn builders_compose() {
        let cell = Cell::new('x')
            .with_fg(CellColor::Rgb(1, 2, 3))
            .with_attrs(Attr::BOLD);
        assert_eq!(cell.ch, 'x');
        assert_eq!(cell.fg, CellColor::Rgb(1, 2, 3));
        assert_eq!(cell.attrs, Attr::BOLD);
    }

    #[test]
    fn continuation_marker() {
        assert!(Cell::continuation(CellColor::Default, Attr::empty()).is_continuation());
        assert!(!Cell::new('a').is_continuation());
    }
}
