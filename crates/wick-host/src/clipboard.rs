//! System clipboard through whichever copy program the host has.
//!
//! Candidates are tried in order; the first one that is on `PATH` and exits
//! successfully wins. Failing to copy is reported, never fatal, and has no
//! effect on the session's own yank register.

use std::io::{self, Write};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::ClipboardError;

/// A copy program reading the text from stdin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipboardTool {
    pub program: &'static str,
    pub args: &'static [&'static str],
}

/// macOS, X11 (two flavors), then Windows/WSL.
pub const CANDIDATES: [ClipboardTool; 4] = [
    ClipboardTool {
        program: "pbcopy",
        args: &[],
    },
    ClipboardTool {
        program: "xclip",
        args: &["-selection", "clipboard"],
    },
    ClipboardTool {
        program: "xsel",
        args: &["--clipboard", "--input"],
    },
    ClipboardTool {
        program: "clip.exe",
        args: &[],
    },
];

/// Copy `text` with the first working tool among [`CANDIDATES`]. Returns
/// the program that took it.
///
/// # Errors
///
/// [`ClipboardError::Empty`] for blank text, [`ClipboardError::NoTool`]
/// when nothing worked.
pub fn copy(text: &str) -> Result<&'static str, ClipboardError> {
    copy_with(&CANDIDATES, text)
}

/// [`copy`] over an explicit candidate list.
///
/// # Errors
///
/// See [`copy`].
pub fn copy_with(candidates: &[ClipboardTool], text: &str) -> Result<&'static str, ClipboardError> {
    if text.trim().is_empty() {
        return Err(ClipboardError::Empty);
    }
    for tool in candidates {
        if which::which(tool.program).is_err() {
            continue;
        }
        match pipe(tool, text) {
            Ok(true) => {
                debug!(program = tool.program, "copied to clipboard");
                return Ok(tool.program);
            }
            Ok(false) => debug!(program = tool.program, "clipboard tool exited unsuccessfully"),
            Err(e) => debug!(program = tool.program, error = %e, "clipboard tool failed"),
        }
    }
    Err(ClipboardError::NoTool)
}

fn pipe(tool: &ClipboardTool, text: &str) -> io::Result<bool> {
    let mut child = Command::new(tool.program)
        .args(tool.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    // The child is waited for even when it stopped reading early.
    let written = child
        .stdin
        .take()
        .map_or(Ok(()), |mut stdin| stdin.write_all(text.as_bytes()));
    let status = child.wait()?;
    written?;
    Ok(status.success())
}

// ── Tests ──────────────────────────────────────────────────────────────
