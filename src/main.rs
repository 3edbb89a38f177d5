// SPDX-License-Identifier: MIT
//
// wick-tui: an interactive editor for Wick contraction diagrams.
//
// This is the main binary that wires together all the crates:
//
//   wick-term → terminal control, rendering, input parsing, event loop
//   wick-core → slots, contractions, arc layout, LaTeX snippet
//   wick-host → background preview pipeline, clipboard
//
// WickApp implements wick-term's App trait. Each keypress flows through:
//
//   stdin → parser → on_event → command dispatch → Session mutation
//   paint → view::paint → framebuffer → diff renderer → terminal
//   tick → preview pipeline poll → status line / inline image
//
// Layout:
//
//   ┌──────────────────────────────┐
//   │ key help, category counts    │  ← rows 1-2
//   │ arcs                         │
//   │ slots                        │  ← base row
//   │ preview image (kitty)        │
//   │ Status: ...                  │
//   │ LaTeX: ... (wrapped)         │
//   │ prompt (edit / resize)       │  ← last row
//   └──────────────────────────────┘
//
// On exit the final contractions and the snippet are printed to stdout.

mod app;
mod command;
mod prompt;
mod view;

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use wick_core::{OperatorCounts, Session};
use wick_host::{PreviewPipeline, ToolchainConfig};
use wick_term::event_loop::EventLoop;
use wick_term::graphics::{self, GraphicsHints, GraphicsSupport};

use crate::app::WickApp;

// ─── CLI ────────────────────────────────────────────────────────────────────

/// Build Wick contraction diagrams in the terminal and export them as
/// LaTeX (simpler-wick).
#[derive(Debug, Parser)]
#[command(name = "wick-tui", version, about)]
struct Cli {
    /// Number of input-state slots.
    #[arg(long, short = 'i', default_value_t = 2)]
    inputs: usize,

    /// Number of interaction-term slots.
    #[arg(long, short = 'v', default_value_t = 6)]
    interactions: usize,

    /// Number of external-state slots.
    #[arg(long, short = 'e', default_value_t = 2)]
    externals: usize,

    /// Write logs to this file. Filter with RUST_LOG (default: info).
    #[arg(long, env = "WICK_TUI_LOG", value_name = "FILE")]
    log: Option<PathBuf>,
}

impl Cli {
    const fn counts(&self) -> OperatorCounts {
        OperatorCounts::new(self.inputs, self.interactions, self.externals)
    }
}

// ─── Errors ─────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error("{0}")]
    Config(#[from] wick_core::Error),
    #[error("terminal: {0}")]
    Io(#[from] io::Error),
}

// ─── Logging ────────────────────────────────────────────────────────────────

/// Logs go to a file or nowhere; stdout and stderr belong to the screen.
fn init_logging(path: Option<&PathBuf>) -> io::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init();
    Ok(())
}

// ─── Run ────────────────────────────────────────────────────────────────────

fn run(cli: &Cli) -> Result<Session, RunError> {
    let session = Session::new(cli.counts())?;
    let pipeline = PreviewPipeline::with_toolchain(ToolchainConfig::default())?;
    let graphics = GraphicsSupport::detect(&GraphicsHints::from_env());

    let mut app = WickApp::new(session, pipeline, graphics);
    let mut event_loop = EventLoop::new()?;
    let result = event_loop.run(&mut app);

    if app.graphics().is_supported() {
        let mut out = io::stdout().lock();
        let _ = graphics::delete_images(&mut out);
        let _ = out.flush();
    }
    result?;
    tracing::info!("session ended");
    Ok(app.into_session())
}

/// The summary printed after the terminal is restored.
fn report(session: &Session) -> String {
    let mut out = String::from("\nFinal contractions:\n");
    let registry = session.registry();
    let mut any = false;
    for (n, c) in session.contractions().iter().enumerate() {
        let id = |i: usize| registry.get(i).map_or_else(|_| i.to_string(), wick_core::Slot::id);
        out.push_str(&format!("  {}. {} -> {}\n", n + 1, id(c.first), id(c.second)));
        any = true;
    }
    if !any {
        out.push_str("  (none)\n");
    }
    out.push_str("\nLaTeX snippet:\n");
    out.push_str(&session.snippet());
    out.push('\n');
    out
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log.as_ref()) {
        eprintln!("wick-tui: cannot open log file: {e}");
        process::exit(1);
    }

    match run(&cli) {
        Ok(session) => print!("{}", report(&session)),
        Err(e) => {
            eprintln!("wick-tui: {e}");
            process::exit(1);
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_counts() {
        let cli = Cli::parse_from(["wick-tui"]);
        assert_eq!(cli.counts(), OperatorCounts::new(2, 6, 2));
        assert!(cli.log.is_none());
    }

    #[test]
    fn counts_from_flags() {
        let cli = Cli::parse_from(["wick-tui", "--inputs", "1", "-v", "0", "--externals", "3"]);
        assert_eq!(cli.counts(), OperatorCounts::new(1, 0, 3));
    }

    #[test]
    fn zero_counts_fail_before_the_terminal_starts() {
        let cli = Cli::parse_from(["wick-tui", "-i", "0", "-v", "0", "-e", "0"]);
        let err = run(&cli).unwrap_err();
        assert!(err.to_string().ends_with("Need at least one operator."));
    }

    #[test]
    fn report_without_contractions() {
        let session = Session::new(OperatorCounts::new(1, 1, 0)).unwrap();
        assert_eq!(
            report(&session),
            "\nFinal contractions:\n  (none)\n\nLaTeX snippet:\n\\braket{ \\wick{ | } }\n"
        );
    }

    #[test]
    fn report_lists_contractions_in_order() {
        let mut session = Session::new(OperatorCounts::new(2, 1, 1)).unwrap();
        for (i, t) in ["a", "b", "c", "d"].into_iter().enumerate() {
            session.set_content(i, t).unwrap();
        }
        session.select(0).unwrap();
        session.select(3).unwrap();
        session.select(1).unwrap();
        session.select(2).unwrap();

        let text = report(&session);
        assert!(text.contains("  1. inputs-0 -> externals-0\n  2. inputs-1 -> interactions-0\n"));
        assert!(text.ends_with("\\braket{ \\wick{ \\c1{a}\\c2{b}|\\c2{c}|\\c1{d} } }\n"));
    }
}
