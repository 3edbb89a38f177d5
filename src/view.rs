// SPDX-License-Identifier: MIT
//
// Screen painting.
//
//   row 1          help line
//   row 2          operator counts
//   ...            arcs, stacked upward from the slot line
//   base_y         [slot] [slot] [slot] ...
//   ...            preview image region
//   status_y       Status: <message>
//   latex rows     LaTeX: <snippet, wrapped>
//   h - 1          prompt (edit / resize), blank otherwise
//
// All text starts at column 2. Geometry for the slot line and the arcs
// comes from `wick_core::layout`; this module only turns it into cells.

use wick_core::layout::{self, ArcPath, Rgb, SlotLine};
use wick_core::{Category, Session};
use wick_term::buffer::{FrameBuffer, string_width};
use wick_term::cell::{Attr, Cell, CellColor};
use wick_term::graphics::Placement;

use crate::prompt::LineInput;

/// Left text column.
const TEXT_X: u16 = 2;

pub const HELP: &str = "Arrows: move  Enter: pair  Bksp: unpair  i: edit  y: yank  p: paste  \
c: copy LaTeX  v: preview  Esc: hide preview  d: clear  r: resize counts  q: quit";

/// Everything a frame depends on.
pub struct View<'a> {
    pub session: &'a Session,
    pub selected: usize,
    pub status: &'a str,
    pub prompt: Option<&'a LineInput>,
}

/// Where things landed in the painted frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Painted {
    /// Free region for the preview image.
    pub preview: Placement,
    /// Prompt cursor, when a prompt is open.
    pub cursor: Option<(u16, u16)>,
}

fn clamp(v: usize) -> u16 {
    u16::try_from(v).unwrap_or(u16::MAX)
}

const fn rgb(c: Rgb) -> CellColor {
    CellColor::Rgb(c.0, c.1, c.2)
}

/// Paint one full frame.
pub fn paint(buf: &mut FrameBuffer, view: &View<'_>) -> Painted {
    let w = buf.width();
    let h = buf.height();
    let text_w = usize::from(w.saturating_sub(2 * TEXT_X));

    line(buf, 1, HELP, CellColor::Default, Attr::DIM);
    line(buf, 2, &counts_line(view.session), CellColor::Default, Attr::empty());

    let base_y = paint_diagram(buf, view);

    let latex = wrap(&format!("LaTeX: {}", view.session.snippet()), text_w.max(1));
    let prompt_y = h.saturating_sub(1);
    let latex_top = prompt_y.saturating_sub(clamp(latex.len())).max(3);
    for (i, text) in latex.iter().enumerate() {
        let y = latex_top.saturating_add(clamp(i));
        if y < prompt_y {
            line(buf, y, text, CellColor::Default, Attr::empty());
        }
    }

    let status_y = latex_top.saturating_sub(1).max(3);
    line(buf, status_y, &format!("Status: {}", view.status), CellColor::Default, Attr::BOLD);

    let cursor = view.prompt.map(|p| {
        let used = buf.paint_text(TEXT_X, prompt_y, p.label(), CellColor::Default, Attr::BOLD);
        buf.paint_text(TEXT_X + used, prompt_y, p.input(), CellColor::Default, Attr::empty());
        (TEXT_X + used + clamp(p.cursor_column()), prompt_y)
    });

    let preview_top = clamp(base_y).saturating_add(2);
    Painted {
        preview: Placement {
            x: TEXT_X,
            y: preview_top,
            cols: w.saturating_sub(2 * TEXT_X),
            rows: status_y.saturating_sub(preview_top),
        },
        cursor,
    }
}

fn line(buf: &mut FrameBuffer, y: u16, text: &str, fg: CellColor, attrs: Attr) {
    buf.paint_text(TEXT_X, y, text, fg, attrs);
}

fn counts_line(session: &Session) -> String {
    let counts = session.registry().counts();
    Category::ALL
        .iter()
        .map(|&c| format!("{}: {}", c.display_name(), counts.get(c)))
        .collect::<Vec<_>>()
        .join(" / ")
}

/// Slot line plus arcs. Returns the slot row.
fn paint_diagram(buf: &mut FrameBuffer, view: &View<'_>) -> usize {
    let session = view.session;
    let labels: Vec<String> = session.registry().slots().iter().map(|s| s.display()).collect();
    let widths: Vec<usize> = labels.iter().map(|l| string_width(l)).collect();
    let line = layout::place_slots(
        &widths,
        usize::from(buf.width()),
        layout::base_row(usize::from(buf.height())),
    );

    for path in layout::route(&session.arcs(), &line) {
        paint_arc(buf, &path);
    }
    paint_slots(buf, view, &labels, &line);
    line.base_y
}

fn paint_arc(buf: &mut FrameBuffer, path: &ArcPath) {
    let fg = rgb(path.arc.color());
    for (x, y, glyph) in path.cells() {
        buf.set(clamp(x), clamp(y), Cell::new(glyph).with_fg(fg));
    }
}

fn paint_slots(buf: &mut FrameBuffer, view: &View<'_>, labels: &[String], line: &SlotLine) {
    let session = view.session;
    for (idx, (label, &left)) in labels.iter().zip(&line.lefts).enumerate() {
        let mut attrs = Attr::empty();
        if idx == view.selected {
            attrs |= Attr::INVERSE;
        }
        if session.pending() == Some(idx) {
            attrs |= Attr::BOLD;
        }
        if session.is_used(idx) {
            attrs |= Attr::DIM;
        }
        buf.paint_text(clamp(left), clamp(line.base_y), label, CellColor::Default, attrs);
    }
}

/// Split `text` into pieces at most `width` columns wide.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = string_width(ch.encode_utf8(&mut [0; 4]));
        if used + w > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            used = 0;
        }
        current.push(ch);
        used += w;
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

// ─── Tests ──────────────────────────────────────────────────────────────────
