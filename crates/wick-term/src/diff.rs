// SPDX-License-Identifier: MIT
//
// Differential renderer.
//
// Compares the frame just painted against the previous one and emits
// escape sequences only for the cells that changed. Unchanged rows are
// skipped with a single slice comparison. Style state (attributes and
// foreground) is tracked across the frame so consecutive cells of the
// same style cost one byte each. Everything is accumulated in memory
// and written with one syscall, wrapped in a synchronized update so the
// terminal never shows a half-drawn frame.

use std::io::{self, Write};

use crate::ansi;
use crate::buffer::FrameBuffer;
use crate::cell::{Attr, Cell, CellColor};

/// Counters from one render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    /// Cells written to the terminal.
    pub cells_rendered: usize,
    /// Cells identical to the previous frame.
    pub cells_skipped: usize,
}

/// Tracks what the terminal already has so redundant codes are skipped.
#[derive(Debug, Clone, Copy)]
struct PenState {
    last_x: i32,
    last_y: i32,
    fg: Option<CellColor>,
    attrs: Attr,
}

impl PenState {
    const fn new() -> Self {
        Self {
            last_x: -1,
            last_y: -1,
            fg: None,
            attrs: Attr::empty(),
        }
    }
}

/// Renders frames by diffing against the previously rendered frame.
pub struct DiffRenderer {
    out: Vec<u8>,
    pen: PenState,
    previous: Option<FrameBuffer>,
}

impl DiffRenderer {
    /// A renderer with no history; the first frame is drawn in full.
    #[must_use]
    pub fn new() -> Self {
        Self {
            out: Vec::with_capacity(16 * 1024),
            pen: PenState::new(),
            previous: None,
        }
    }

    /// Diff `current` against the previous frame and buffer the output.
    pub fn render(&mut self, current: &FrameBuffer) -> RenderStats {
        self.out.clear();
        self.pen = PenState::new();
        let mut stats = RenderStats::default();

        let (width, height) = (current.width(), current.height());
        if width == 0 || height == 0 {
            self.previous = Some(current.clone());
            return stats;
        }

        ansi::begin_sync(&mut self.out).ok();

        let previous = self
            .previous
            .take()
            .filter(|p| p.width() == width && p.height() == height);
        if previous.is_none() {
            ansi::clear_screen(&mut self.out).ok();
        }

        for y in 0..height {
            let prev_row = previous.as_ref().and_then(|p| p.row(y));
            let Some(row) = current.row(y) else { continue };
            if prev_row == Some(row) {
                stats.cells_skipped += usize::from(width);
                continue;
            }
            for (x, cell) in (0..width).zip(row) {
                if prev_row.is_some_and(|p| p[usize::from(x)] == *cell) {
                    stats.cells_skipped += 1;
                } else {
                    self.write_cell(x, y, cell);
                    stats.cells_rendered += 1;
                }
            }
        }

        ansi::reset(&mut self.out).ok();
        ansi::end_sync(&mut self.out).ok();

        self.previous = Some(current.clone());
        stats
    }

    fn write_cell(&mut self, x: u16, y: u16, cell: &Cell) {
        let (xi, yi) = (i32::from(x), i32::from(y));

        if cell.is_continuation() && self.pen.last_y == yi && self.pen.last_x == xi - 1 {
            // The wide start already covered this column.
            self.pen.last_x = xi;
            return;
        }

        if yi != self.pen.last_y || xi != self.pen.last_x + 1 {
            ansi::cursor_to(&mut self.out, x, y).ok();
        }

        if cell.attrs != self.pen.attrs {
            if !self.pen.attrs.is_empty() {
                ansi::reset(&mut self.out).ok();
                self.pen.fg = None;
            }
            ansi::attrs(&mut self.out, cell.attrs).ok();
            self.pen.attrs = cell.attrs;
        }
        if self.pen.fg != Some(cell.fg) {
            ansi::fg(&mut self.out, cell.fg).ok();
            self.pen.fg = Some(cell.fg);
        }

        let ch = if cell.is_continuation() { ' ' } else { cell.ch };
        let mut utf8 = [0u8; 4];
        self.out.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());

        self.pen.last_x = xi;
        self.pen.last_y = yi;
    }

    /// The bytes produced by the last [`render`](Self::render).
    #[must_use]
    pub fn output_bytes(&self) -> &[u8] {
        &self.out
    }

    /// Write the buffered output to stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to stdout fails.
    pub fn flush(&mut self) -> io::Result<()> {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        self.flush_to(&mut lock)
    }

    /// Write the buffered output to `w` and clear it.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        w.write_all(&self.out)?;
        w.flush()?;
        self.out.clear();
        Ok(())
    }

    /// Forget the previous frame so the next render redraws everything.
    pub fn force_redraw(&mut self) {
        self.previous = None;
    }
}

impl Default for DiffRenderer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
