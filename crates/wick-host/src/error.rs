//! Failures of the external collaborators.
//!
//! None of these ever reach the editing loop as a panic or an early
//! return: preview errors are folded into a failed job's message, and
//! clipboard errors become a status line.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Why a preview compilation did not produce an image.
#[derive(Debug, Error)]
pub enum PreviewError {
    /// Required programs are not on `PATH`.
    #[error("Missing commands for preview: {}.", .0.join(", "))]
    ToolMissing(Vec<String>),

    /// A program ran and exited unsuccessfully.
    #[error("{tool} failed ({status}). stderr: {stderr}")]
    ToolFailed {
        tool: String,
        status: String,
        /// Trimmed and truncated stderr.
        stderr: String,
    },

    /// A program succeeded but its output file is not there.
    #[error("Expected {} was not generated.", .0.display())]
    MissingOutput(PathBuf),

    /// Nothing to compile.
    #[error("Add operators before generating a preview.")]
    EmptySnippet,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Why the snippet did not reach the system clipboard.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClipboardError {
    #[error("Nothing to copy.")]
    Empty,

    #[error("No clipboard tool found (tried pbcopy/xclip/xsel/clip.exe).")]
    NoTool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_tools_are_listed() {
        let err = PreviewError::ToolMissing(vec!["latexmk".into(), "pdftoppm".into()]);
        assert_eq!(err.to_string(), "Missing commands for preview: latexmk, pdftoppm.");
    }

    #[test]
    fn tool_failure_names_the_tool() {
        let err = PreviewError::ToolFailed {
            tool: "latexmk".into(),
            status: "exit status: 12".into(),
            stderr: "! Undefined control sequence.".into(),
        };
        assert_eq!(
            err.to_string(),
            "latexmk failed (exit status: 12). stderr: ! Undefined control sequence."
        );
    }

    #[test]
    fn io_errors_convert() {
        let err: PreviewError = io::Error::other("disk full").into();
        assert!(matches!(err, PreviewError::Io(_)));
    }
}
