// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Event loop.
//
// stdin bytes arrive from the reader thread, get parsed into events, and
// are handed to the application; the application paints a frame buffer
// and the diff renderer writes what changed. The loop blocks on the input
// channel with a tick timeout, which gives three behaviors at once:
//
//   1. Keystrokes are handled the moment they arrive.
//   2. An idle screen costs nothing: `recv_timeout` parks the thread.
//   3. Every tick is a poll point. The application checks background
//      work there (preview jobs) and asks for a repaint when it changed.
//
// A lone ESC stays pending in the parser until a tick passes with no new
// bytes, then it is flushed as the Escape key.
//
// Resizes are detected through a SIGWINCH handler that flips an atomic.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::ansi;
use crate::buffer::FrameBuffer;
use crate::diff::DiffRenderer;
use crate::input::{Event, Parser};
use crate::reader::InputReader;
use crate::terminal::{Size, Terminal};

// ─── SIGWINCH ────────────────────────────────────────────────────────────────

static RESIZED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
fn install_sigwinch_handler() {
    // SAFETY: the handler only stores to an atomic, which is
    // async-signal-safe; sigaction is given a fully initialized struct.
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = on_sigwinch as *const () as usize;
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(libc::SIGWINCH, &raw const sa, std::ptr::null_mut());
    }
}

#[cfg(unix)]
extern "C" fn on_sigwinch(_sig: libc::c_int) {
    RESIZED.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
fn install_sigwinch_handler() {}

// ─── App ─────────────────────────────────────────────────────────────────────

/// What the application wants after handling an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Keep running.
    Continue,
    /// Leave the loop.
    Quit,
}

/// An application driven by [`EventLoop`].
///
/// Per iteration the loop calls, in order: [`on_event`](App::on_event) for
/// each parsed event, [`on_resize`](App::on_resize) after a size change,
/// [`on_tick`](App::on_tick), and, when anything changed,
/// [`paint`](App::paint) followed by [`overlay`](App::overlay) and
/// [`cursor`](App::cursor). Only `paint` is required.
pub trait App {
    /// Handle one input event.
    fn on_event(&mut self, _event: &Event) -> Action {
        Action::Continue
    }

    /// The terminal was resized. The frame buffer already has the new size.
    fn on_resize(&mut self, _size: Size) {}

    /// Called every iteration. Return `true` to request a repaint.
    fn on_tick(&mut self) -> bool {
        false
    }

    /// Paint the whole screen. The buffer is cleared beforehand.
    fn paint(&mut self, buf: &mut FrameBuffer);

    /// Write raw output after the frame is flushed.
    ///
    /// For content that lives outside the cell grid, such as inline
    /// images. Called after every repaint.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `out` fails.
    fn overlay(&mut self, _out: &mut dyn Write) -> io::Result<()> {
        Ok(())
    }

    /// Where to show the hardware cursor, or `None` to hide it.
    fn cursor(&self) -> Option<(u16, u16, ansi::CursorShape)> {
        None
    }
}

// ─── Config ──────────────────────────────────────────────────────────────────

/// Loop timing.
#[derive(Debug, Clone, Copy)]
pub struct LoopConfig {
    /// Input wait per iteration in microseconds. Doubles as the ESC
    /// timeout and the poll interval for background work.
    pub tick_interval_us: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            tick_interval_us: 16_667, // 60 Hz
        }
    }
}

// ─── EventLoop ───────────────────────────────────────────────────────────────

/// Owns the terminal, the parser and the renderer.
pub struct EventLoop {
    terminal: Terminal,
    parser: Parser,
    renderer: DiffRenderer,
    config: LoopConfig,
}

impl EventLoop {
    /// A loop with default timing.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal handle cannot be created.
    pub fn new() -> io::Result<Self> {
        Self::with_config(LoopConfig::default())
    }

    /// A loop with custom timing.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal handle cannot be created.
    pub fn with_config(config: LoopConfig) -> io::Result<Self> {
        Ok(Self {
            terminal: Terminal::new()?,
            parser: Parser::new(),
            renderer: DiffRenderer::new(),
            config,
        })
    }

    /// Current terminal size.
    #[must_use]
    pub const fn size(&self) -> Size {
        self.terminal.size()
    }

    /// Run until the application quits. The terminal is restored on every
    /// exit path, including errors.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal setup, rendering, or teardown fails.
    pub fn run(&mut self, app: &mut impl App) -> io::Result<()> {
        self.terminal.enter()?;
        install_sigwinch_handler();

        let result = match InputReader::spawn() {
            Ok((mut reader, rx)) => {
                let result = self.run_inner(app, &rx);
                reader.stop();
                result
            }
            Err(e) => Err(e),
        };

        self.terminal.leave()?;
        result
    }

    fn dispatch(app: &mut impl App, events: &[Event]) -> Option<Action> {
        for event in events {
            if app.on_event(event) == Action::Quit {
                return Some(Action::Quit);
            }
        }
        None
    }

    fn run_inner(&mut self, app: &mut impl App, rx: &Receiver<Vec<u8>>) -> io::Result<()> {
        let size = self.terminal.size();
        let mut frame = FrameBuffer::new(size.cols, size.rows);
        let mut dirty = true;
        let timeout = Duration::from_micros(self.config.tick_interval_us);

        loop {
            let events = match rx.recv_timeout(timeout) {
                Ok(bytes) => self.parser.advance(&bytes),
                Err(RecvTimeoutError::Timeout) if self.parser.has_pending() => self.parser.flush(),
                Err(RecvTimeoutError::Timeout) => Vec::new(),
                Err(RecvTimeoutError::Disconnected) => return Ok(()),
            };
            if Self::dispatch(app, &events).is_some() {
                return Ok(());
            }
            dirty |= !events.is_empty();

            if RESIZED.swap(false, Ordering::Relaxed) {
                let size = self.terminal.refresh_size();
                frame.resize(size.cols, size.rows);
                self.renderer.force_redraw();
                app.on_resize(size);
                dirty = true;
            }

            dirty |= app.on_tick();

            if dirty {
                frame.clear();
                app.paint(&mut frame);
                self.renderer.render(&frame);
                self.renderer.flush()?;

                let stdout = io::stdout();
                let mut lock = stdout.lock();
                app.overlay(&mut lock)?;
                if let Some((x, y, shape)) = app.cursor() {
                    ansi::cursor_to(&mut lock, x, y)?;
                    ansi::set_cursor_shape(&mut lock, shape)?;
                    ansi::cursor_show(&mut lock)?;
                } else {
                    ansi::cursor_hide(&mut lock)?;
                }
                lock.flush()?;
                dirty = false;
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
