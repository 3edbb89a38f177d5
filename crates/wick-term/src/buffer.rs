// SPDX-License-Identifier: MIT
//
// FrameBuffer — the 2D cell grid every frame is painted into.
//
// Row-major `Vec<Cell>`, so a row is a contiguous slice and the diff
// renderer can compare whole rows with one slice comparison. Painting
// outside the grid is silently clipped; callers lay out against the
// terminal size and never have to bounds-check themselves.

use unicode_width::UnicodeWidthChar;

use crate::cell::{Attr, Cell, CellColor};

/// A fixed-size grid of cells.
///
/// ```
/// use wick_term::buffer::FrameBuffer;
/// use wick_term::cell::{Attr, CellColor};
///
/// let mut buf = FrameBuffer::new(20, 4);
/// let used = buf.paint_text(2, 1, "[a]", CellColor::Default, Attr::empty());
/// assert_eq!(used, 3);
/// assert_eq!(buf.get(3, 1).unwrap().ch, 'a');
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    /// A buffer filled with blank cells.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::EMPTY; usize::from(width) * usize::from(height)],
        }
    }

    /// Width in columns.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Height in rows.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Whether `(x, y)` lies inside the grid.
    #[inline]
    #[must_use]
    pub const fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    const fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// The cell at `(x, y)`, or `None` outside the grid.
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.in_bounds(x, y).then(|| &self.cells[self.index(x, y)])
    }

    /// A full row, or `None` past the bottom.
    #[must_use]
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        if y >= self.height {
            return None;
        }
        let start = self.index(0, y);
        Some(&self.cells[start..start + usize::from(self.width)])
    }

    /// Overwrite one cell. Returns `false` if `(x, y)` was clipped.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let idx = self.index(x, y);
        self.cells[idx] = cell;
        true
    }

    /// Reset every cell to blank.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
    }

    /// Resize the grid. Contents are discarded; the next paint redraws.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.cells.clear();
        self.cells
            .resize(usize::from(width) * usize::from(height), Cell::EMPTY);
    }

    /// Paint `text` starting at `(x, y)` and return the columns consumed.
    ///
    /// Zero-width characters are dropped. A wide character that would be
    /// split by the right edge is replaced by a space.
    pub fn paint_text(&mut self, x: u16, y: u16, text: &str, fg: CellColor, attrs: Attr) -> u16 {
        if y >= self.height {
            return 0;
        }
        let mut col = x;
        for ch in text.chars() {
            if col >= self.width {
                break;
            }
            let w = ch.width().unwrap_or(0);
            if w == 0 {
                continue;
            }
            if w == 2 && col + 1 >= self.width {
                self.set(col, y, Cell::new(' ').with_fg(fg).with_attrs(attrs));
                col += 1;
                break;
            }
            self.set(col, y, Cell::new(ch).with_fg(fg).with_attrs(attrs));
            if w == 2 {
                self.set(col + 1, y, Cell::continuation(fg, attrs));
            }
            // w is 1 or 2.
            #[allow(clippy::cast_possible_truncation)]
            let step = w as u16;
            col = col.saturating_add(step);
        }
        col.saturating_sub(x)
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FrameBuffer({}x{})", self.width, self.height)
    }
}

/// Display width of a string in terminal columns.
///
/// ```
/// use wick_term::buffer::string_width;
///
/// assert_eq!(string_width("[a]"), 3);
/// assert_eq!(string_width("中"), 2);
/// ```
#[must_use]
pub fn string_width(s: &str) -> usize {
    s.chars().map(|ch| ch.width().unwrap_or(0)).sum()
}

// ─── Tests ───────────────────────────────────────────────────────────────────
