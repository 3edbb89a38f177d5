//! # wick-host — External collaborators for wick-tui
//!
//! Everything that leaves the process lives here:
//!
//! - **[`pipeline`]** — `PreviewPipeline`, one background compilation at a
//!   time with a pollable job table and a session-scoped scratch directory
//! - **[`toolchain`]** — the `Compiler` seam and the `latexmk`/`pdftoppm`
//!   implementation
//! - **[`clipboard`]** — copy text through the host's clipboard program
//!
//! Failures here are values. Nothing in this crate panics on a missing or
//! misbehaving external program.

pub mod clipboard;
pub mod error;
pub mod pipeline;
pub mod toolchain;

pub use error::{ClipboardError, PreviewError};
pub use pipeline::{JobId, JobStatus, PreviewPipeline};
pub use toolchain::{Compiler, LatexToolchain, Tool, ToolchainConfig};
