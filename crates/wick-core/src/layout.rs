//! Arc layout — lanes, slot positions, and right-angle arc geometry.
//!
//! Each contraction `{a, b}` is drawn as an arc above the slot line: up from
//! the left endpoint, across at its lane's height, down to the right
//! endpoint. Lanes are assigned greedily over the intervals `[a, b]`:
//!
//! 1. Sort by interval start, then by interval end.
//! 2. Give each interval the smallest lane not held by an already placed
//!    interval that shares any position with it.
//!
//! Nested intervals share positions, so `[0, 3]` and `[1, 2]` land on
//! different lanes; `[0, 1]` and `[2, 3]` are disjoint and both take lane 0.
//! Lane 0 sits closest to the slot line. Everything here is recomputed from
//! scratch on each call; there is no incremental state.
//!
//! Geometry is in terminal cells with `(0, 0)` at the top-left.

use crate::contraction::{Contraction, ContractionSet};

// ── Palette ───────────────────────────────────────────────────────────────

/// 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Arc colors (gruvbox: red, orange, yellow, green, teal, blue, purple).
pub const PALETTE: [Rgb; 7] = [
    Rgb(204, 36, 29),
    Rgb(214, 93, 14),
    Rgb(215, 153, 33),
    Rgb(152, 151, 26),
    Rgb(104, 157, 106),
    Rgb(69, 133, 136),
    Rgb(177, 98, 134),
];

/// Color for a lane. A pure function of the lane number.
#[must_use]
pub const fn color_for_lane(lane: usize) -> Rgb {
    PALETTE[lane % PALETTE.len()]
}

// ── Lanes ─────────────────────────────────────────────────────────────────

/// A contraction with its assigned lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedArc {
    pub contraction: Contraction,
    pub lane: usize,
}

impl PlacedArc {
    /// Left slot index.
    #[must_use]
    pub const fn start(&self) -> usize {
        self.contraction.start()
    }

    /// Right slot index.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.contraction.end()
    }

    /// Whether the two closed intervals share a position.
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.start() <= other.end() && other.start() <= self.end()
    }

    #[must_use]
    pub const fn color(&self) -> Rgb {
        color_for_lane(self.lane)
    }
}

/// Assign lanes, returning arcs in placement order (by start, then end).
#[must_use]
pub fn assign_lanes<I>(contractions: I) -> Vec<PlacedArc>
where
    I: IntoIterator<Item = Contraction>,
{
    let mut arcs: Vec<PlacedArc> = contractions
        .into_iter()
        .map(|contraction| PlacedArc { contraction, lane: 0 })
        .collect();
    arcs.sort_by_key(|a| (a.start(), a.end()));

    for i in 0..arcs.len() {
        let (placed, rest) = arcs.split_at_mut(i);
        let arc = &mut rest[0];
        let mut lane = 0;
        while placed.iter().any(|p| p.lane == lane && p.overlaps(arc)) {
            lane += 1;
        }
        arc.lane = lane;
    }
    arcs
}

/// Lanes for every contraction in a set.
#[must_use]
pub fn arcs_for(set: &ContractionSet) -> Vec<PlacedArc> {
    assign_lanes(set.iter().copied())
}

// ── Slot positions ────────────────────────────────────────────────────────

/// Columns kept free on each side of the slot line.
pub const MARGIN_X: usize = 4;

/// Where the slots sit on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotLine {
    /// Row of the slot line.
    pub base_y: usize,
    /// Left column of each slot's text.
    pub lefts: Vec<usize>,
    /// Column each slot's arcs attach to.
    pub centers: Vec<usize>,
}

/// Row of the slot line for a screen of `height` rows.
#[must_use]
pub fn base_row(height: usize) -> usize {
    (height / 2).max(4)
}

/// Spread slots of the given display widths evenly across `width` columns.
#[must_use]
pub fn place_slots(widths: &[usize], width: usize, base_y: usize) -> SlotLine {
    let n = widths.len();
    let available = width.saturating_sub(2 * MARGIN_X).max(10);
    let mut lefts = Vec::with_capacity(n);
    let mut centers = Vec::with_capacity(n);
    for (idx, &w) in widths.iter().enumerate() {
        let center = MARGIN_X + (2 * idx + 1) * available / (2 * n);
        let left = center.saturating_sub(w / 2).max(1);
        lefts.push(left);
        centers.push(left + w / 2);
    }
    SlotLine {
        base_y,
        lefts,
        centers,
    }
}

// ── Routing ───────────────────────────────────────────────────────────────

/// Vertical line glyph.
pub const VERTICAL: char = '│';
/// Horizontal line glyph.
pub const HORIZONTAL: char = '─';
/// Top-left corner glyph.
pub const CORNER_LEFT: char = '┌';
/// Top-right corner glyph.
pub const CORNER_RIGHT: char = '┐';

/// Screen geometry of one arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArcPath {
    pub arc: PlacedArc,
    pub left_x: usize,
    pub right_x: usize,
    /// Row of the horizontal segment.
    pub top_y: usize,
    /// Lowest row of the vertical legs, just above the slot line.
    pub bottom_y: usize,
}

impl ArcPath {
    /// Every cell of the arc with its glyph.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, char)> + '_ {
        let legs = (self.top_y + 1..=self.bottom_y)
            .flat_map(move |y| [(self.left_x, y, VERTICAL), (self.right_x, y, VERTICAL)]);
        let top = (self.left_x..=self.right_x).map(move |x| {
            let glyph = if x == self.left_x {
                CORNER_LEFT
            } else if x == self.right_x {
                CORNER_RIGHT
            } else {
                HORIZONTAL
            };
            (x, self.top_y, glyph)
        });
        legs.chain(top)
    }
}

/// Number of distinct heights that fit between row 1 and the slot line.
#[must_use]
pub fn drawable_levels(base_y: usize) -> usize {
    (base_y.saturating_sub(2).max(1) / 2).max(1)
}

/// Geometry for every arc. Lanes beyond the drawable height wrap around.
/// Arcs whose endpoints share a column are skipped.
#[must_use]
pub fn route(arcs: &[PlacedArc], line: &SlotLine) -> Vec<ArcPath> {
    if line.base_y <= 1 {
        return Vec::new();
    }
    let levels = drawable_levels(line.base_y);
    arcs.iter()
        .filter_map(|&arc| {
            let left_x = *line.centers.get(arc.start())?;
            let right_x = *line.centers.get(arc.end())?;
            if left_x == right_x {
                return None;
            }
            let level = arc.lane % levels;
            let top_y = line.base_y.saturating_sub(2 + level * 2).max(1);
            Some(ArcPath {
                arc,
                left_x: left_x.min(right_x),
                right_x: left_x.max(right_x),
                top_y,
                bottom_y: line.base_y - 1,
            })
        })
        .collect()
}

// ── Tests ──────────────────────────────────────────────────────────────
