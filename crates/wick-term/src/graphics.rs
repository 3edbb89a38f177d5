// SPDX-License-Identifier: MIT
//
// Inline images through the kitty graphics protocol.
//
// The preview PNG already sits on local disk, so it is sent by path
// (`t=f`) rather than streamed as base64 pixel data: the payload is the
// base64-encoded file path, and the terminal reads the file itself.
// The image is scaled into a cell rectangle with `c=`/`r=`, `C=1` keeps
// the cursor where it was, and `q=2` silences responses that would
// otherwise arrive on stdin as garbage input.
//
// Terminals without the protocol get nothing written at all; callers
// check `GraphicsSupport` first and fall back to a status message.

use std::env;
use std::io::{self, Write};
use std::path::Path;

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::ansi;

/// Environment facts used to decide whether inline images can work.
#[derive(Debug, Clone, Default)]
pub struct GraphicsHints {
    /// `$TERM`.
    pub term: Option<String>,
    /// Whether `$KITTY_WINDOW_ID` is set.
    pub kitty_window: bool,
}

impl GraphicsHints {
    /// Read hints from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            term: env::var("TERM").ok(),
            kitty_window: env::var_os("KITTY_WINDOW_ID").is_some(),
        }
    }
}

/// Which inline-image protocol the host terminal speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphicsSupport {
    /// kitty graphics protocol.
    Kitty,
    /// No inline images; display is degraded to text.
    Unsupported,
}

impl GraphicsSupport {
    /// Decide support from hints.
    #[must_use]
    pub fn detect(hints: &GraphicsHints) -> Self {
        let kitty_term = hints.term.as_deref().is_some_and(|t| t.contains("kitty"));
        if hints.kitty_window || kitty_term {
            Self::Kitty
        } else {
            Self::Unsupported
        }
    }

    /// Whether images can be placed.
    #[must_use]
    pub const fn is_supported(self) -> bool {
        matches!(self, Self::Kitty)
    }
}

/// Cell rectangle an image is scaled into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Left column.
    pub x: u16,
    /// Top row.
    pub y: u16,
    /// Width in cells.
    pub cols: u16,
    /// Height in cells.
    pub rows: u16,
}

impl Placement {
    /// Whether the rectangle has no area.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.cols == 0 || self.rows == 0
    }
}

/// Display the PNG at `path` inside `at`, replacing any earlier image.
///
/// # Errors
///
/// Returns an error if writing to `w` fails.
pub fn place_png(w: &mut impl Write, path: &Path, at: Placement) -> io::Result<()> {
    delete_images(w)?;
    ansi::cursor_to(w, at.x, at.y)?;
    let payload = STANDARD.encode(path.as_os_str().as_encoded_bytes());
    write!(
        w,
        "\x1b_Ga=T,t=f,f=100,c={},r={},C=1,q=2;{payload}\x1b\\",
        at.cols, at.rows
    )
}

/// Remove every image placed by this application.
///
/// # Errors
///
/// Returns an error if writing to `w` fails.
pub fn delete_images(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b_Ga=d,d=A,q=2;\x1b\\")
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_kitty_from_window_id() {
        let hints = GraphicsHints {
            term: Some("xterm-256color".into()),
            kitty_window: true,
        };
        assert_eq!(GraphicsSupport::detect(&hints), GraphicsSupport::Kitty);
    }

    #[test]
    fn detects_kitty_from_term() {
        let hints = GraphicsHints {
            term: Some("xterm-kitty".into()),
            kitty_window: false,
        };
        assert!(GraphicsSupport::detect(&hints).is_supported());
    }

    #[test]
    fn plain_terminal_is_unsupported() {
        let hints = GraphicsHints {
            term: Some("xterm-256color".into()),
            kitty_window: false,
        };
        assert_eq!(GraphicsSupport::detect(&hints), GraphicsSupport::Unsupported);
        assert_eq!(
            GraphicsSupport::detect(&GraphicsHints::default()),
            GraphicsSupport::Unsupported
        );
    }

    #[test]
    fn place_png_sends_path_by_file_transfer() {
        let mut out = Vec::new();
        let at = Placement { x: 2, y: 5, cols: 40, rows: 6 };
        place_png(&mut out, Path::new("/tmp/p.png"), at).unwrap();
        let s = String::from_utf8(out).unwrap();

        assert!(s.starts_with("\x1b_Ga=d,d=A,q=2;\x1b\\"));
        assert!(s.contains("\x1b[6;3H"));
        assert!(s.contains("a=T,t=f,f=100,c=40,r=6,C=1,q=2;"));
        assert!(s.contains(&STANDARD.encode("/tmp/p.png")));
        assert!(s.ends_with("\x1b\\"));
    }

    #[test]
    fn placement_empty() {
        assert!(Placement { x: 0, y: 0, cols: 0, rows: 3 }.is_empty());
        assert!(!Placement { x: 0, y: 0, cols: 1, rows: 1 }.is_empty());
    }
}
