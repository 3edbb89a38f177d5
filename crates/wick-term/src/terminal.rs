// SPDX-License-Identifier: MIT
//
// Terminal control: raw mode, alternate screen, RAII restore.
//
// termios, ioctl and isatty are plain POSIX calls with no safe wrapper,
// so this module allows `unsafe`; every block is a single FFI call.
#![allow(unsafe_code)]
//
// The panic hook writes a prebuilt restore sequence straight to fd 1,
// bypassing the stdout lock (a panic mid-frame may be holding it), puts
// termios back, and only then lets the original hook print the message.

use std::io::{self, Write};
use std::sync::{Mutex, Once};

use crate::ansi;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Columns.
    pub cols: u16,
    /// Rows.
    pub rows: u16,
}

/// Query the terminal size with `TIOCGWINSZ`. `None` when not a terminal.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    // SAFETY: winsize is plain old data; zeroed is a valid value.
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    // SAFETY: TIOCGWINSZ writes into the winsize we pass.
    let rc = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };
    (rc == 0 && ws.ws_col > 0 && ws.ws_row > 0).then_some(Size {
        cols: ws.ws_col,
        rows: ws.ws_row,
    })
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

/// Whether stdin is a TTY.
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    // SAFETY: isatty only inspects the descriptor.
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

// ─── Panic restore ──────────────────────────────────────────────────────────

#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

/// End sync, disable bracketed paste, reset SGR, reset cursor shape, show
/// cursor, leave the alternate screen. Alt-screen exit goes last.
#[rustfmt::skip]
const EMERGENCY_RESTORE: &[u8] = b"\
    \x1b[?2026l\
    \x1b[?2004l\
    \x1b[0m\
    \x1b[0 q\
    \x1b[?25h\
    \x1b[?1049l";

static PANIC_HOOK: Once = Once::new();

fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();
            original(info);
        }));
    });
}

fn emergency_restore() {
    #[cfg(unix)]
    {
        // SAFETY: writing a static byte slice to fd 1.
        unsafe {
            let _ = libc::write(
                libc::STDOUT_FILENO,
                EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
                EMERGENCY_RESTORE.len(),
            );
        }
        if let Ok(guard) = TERMIOS_BACKUP.lock() {
            if let Some(original) = guard.as_ref() {
                // SAFETY: restoring a termios previously read by tcgetattr.
                unsafe {
                    let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, original);
                }
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = io::stdout().write_all(EMERGENCY_RESTORE);
        let _ = io::stdout().flush();
    }
}

// ─── Terminal ───────────────────────────────────────────────────────────────

/// Terminal handle. Restores the terminal on drop.
pub struct Terminal {
    #[cfg(unix)]
    original: Option<libc::termios>,
    size: Size,
    active: bool,
}

impl Terminal {
    /// Create a handle without touching terminal modes.
    ///
    /// Falls back to 80x24 when the size cannot be queried (pipes, tests).
    ///
    /// # Errors
    ///
    /// Currently infallible; kept fallible for platform backends.
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            #[cfg(unix)]
            original: None,
            size: get_size().unwrap_or(Size { cols: 80, rows: 24 }),
            active: false,
        })
    }

    /// Cached size.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Re-query the size after SIGWINCH.
    pub fn refresh_size(&mut self) -> Size {
        if let Some(size) = get_size() {
            self.size = size;
        }
        self.size
    }

    /// Whether raw mode and the alternate screen are active.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Enter raw mode and the alternate screen, enable bracketed paste.
    /// No-op while already active.
    ///
    /// # Errors
    ///
    /// Returns an error if termios or terminal output fails.
    pub fn enter(&mut self) -> io::Result<()> {
        if self.active {
            return Ok(());
        }
        install_panic_hook();
        self.enable_raw_mode()?;

        let stdout = io::stdout();
        let mut lock = stdout.lock();
        ansi::enter_alt_screen(&mut lock)?;
        ansi::cursor_hide(&mut lock)?;
        ansi::clear_screen(&mut lock)?;
        ansi::enable_bracketed_paste(&mut lock)?;
        lock.flush()?;

        self.active = true;
        Ok(())
    }

    /// Undo everything [`enter`](Self::enter) did. No-op while inactive.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal output or termios restore fails.
    pub fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            ansi::end_sync(&mut lock)?;
            ansi::disable_bracketed_paste(&mut lock)?;
            ansi::reset(&mut lock)?;
            ansi::set_cursor_shape(&mut lock, ansi::CursorShape::Default)?;
            ansi::cursor_show(&mut lock)?;
            ansi::exit_alt_screen(&mut lock)?;
            lock.flush()?;
        }
        self.disable_raw_mode()?;
        self.active = false;
        Ok(())
    }

    #[cfg(unix)]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        if !is_tty() {
            return Ok(());
        }
        let fd = libc::STDIN_FILENO;

        // SAFETY: termios is plain old data; tcgetattr fills it in.
        let mut termios: libc::termios = unsafe { std::mem::zeroed() };
        // SAFETY: fd is stdin, termios is a valid out-pointer.
        if unsafe { libc::tcgetattr(fd, &raw mut termios) } != 0 {
            return Err(io::Error::last_os_error());
        }
        self.original = Some(termios);
        if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
            *guard = Some(termios);
        }

        termios.c_iflag &= !(libc::IGNBRK
            | libc::BRKINT
            | libc::PARMRK
            | libc::ISTRIP
            | libc::INLCR
            | libc::IGNCR
            | libc::ICRNL
            | libc::IXON);
        termios.c_oflag &= !libc::OPOST;
        termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
        termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
        termios.c_cflag |= libc::CS8;
        termios.c_cc[libc::VMIN] = 1;
        termios.c_cc[libc::VTIME] = 0;

        // SAFETY: applying a termios derived from the current one.
        if unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const termios) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }

    #[cfg(unix)]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        if let Some(original) = self.original.take() {
            // SAFETY: restoring the termios read in enable_raw_mode.
            if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw const original) } != 0 {
                return Err(io::Error::last_os_error());
            }
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = None;
            }
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
