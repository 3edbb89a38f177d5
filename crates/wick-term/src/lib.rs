// SPDX-License-Identifier: MIT
//
// wick-term — terminal backend for wick-tui.
//
// Direct terminal control through ANSI escape sequences and raw termios,
// the same way the editor this grew out of drives the screen: a cell
// grid is painted every dirty frame, diffed against the previous one,
// and only the changed cells are written. On top of that sits the one
// thing a diagram previewer needs that a text editor does not: placing
// a raster image inline through the kitty graphics protocol.

pub mod ansi;
pub mod buffer;
pub mod cell;
pub mod diff;
pub mod event_loop;
pub mod graphics;
pub mod input;
pub mod reader;
pub mod terminal;
