//! LaTeX toolchain — snippet to PNG through external programs.
//!
//! Two steps, both run with the scratch directory as working directory:
//!
//! 1. `latexmk -pdflua … preview.tex` builds `preview.pdf`.
//! 2. `pdftoppm -png -singlefile -f 1 -l 1 preview.pdf preview_image`
//!    rasterizes the first page to `preview_image.png`.
//!
//! The [`Compiler`] trait is the seam the preview pipeline runs through, so
//! the pipeline's state machine can be driven without a TeX installation.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, warn};

use crate::error::PreviewError;

/// Document source file.
pub const TEX_FILE: &str = "preview.tex";
/// Compiled document.
pub const PDF_FILE: &str = "preview.pdf";
/// Output prefix handed to the rasterizer.
pub const IMAGE_STEM: &str = "preview_image";
/// Rasterized first page.
pub const IMAGE_FILE: &str = "preview_image.png";

/// Characters of stderr kept in failure messages.
pub const STDERR_LIMIT: usize = 200;

/// Turns a snippet into an image file inside `scratch`.
pub trait Compiler: Send + Sync {
    /// Compile `snippet` and return the path of the produced image.
    ///
    /// # Errors
    ///
    /// Any [`PreviewError`]; the pipeline records it as a failed job.
    fn compile(&self, snippet: &str, scratch: &Path) -> Result<PathBuf, PreviewError>;
}

// ── Configuration ─────────────────────────────────────────────────────────

/// An external program and its fixed leading arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tool {
    pub program: String,
    pub args: Vec<String>,
}

impl Tool {
    #[must_use]
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|&a| a.to_owned()).collect(),
        }
    }

    /// Whether the program can be found on `PATH`.
    #[must_use]
    pub fn is_available(&self) -> bool {
        which::which(&self.program).is_ok()
    }
}

/// The two programs the toolchain runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainConfig {
    /// `.tex` to `.pdf`; the file name is appended.
    pub compiler: Tool,
    /// `.pdf` to `.png`; the PDF path and output prefix are appended.
    pub rasterizer: Tool,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            compiler: Tool::new(
                "latexmk",
                &["-pdflua", "-interaction=nonstopmode", "-halt-on-error", "-quiet"],
            ),
            rasterizer: Tool::new("pdftoppm", &["-png", "-singlefile", "-f", "1", "-l", "1"]),
        }
    }
}

// ── Document ──────────────────────────────────────────────────────────────

/// Wrap a snippet in a standalone document sized for a terminal preview.
#[must_use]
pub fn document(snippet: &str) -> String {
    format!(
        r"\documentclass[14pt]{{article}}
\usepackage[paperwidth=4in,paperheight=1.5in,margin=0.1in]{{geometry}}
\usepackage{{simpler-wick}}
\usepackage{{amsmath}}
\usepackage{{amssymb}}
\usepackage{{braket}}
\usepackage{{graphicx}}
\begin{{document}}
\thispagestyle{{empty}}
\[
\scalebox{{1.9}}{{$
{snippet}
$}}
\]
\end{{document}}
"
    )
}

// ── LatexToolchain ────────────────────────────────────────────────────────

/// The real [`Compiler`]: `latexmk` then `pdftoppm`.
#[derive(Debug, Clone, Default)]
pub struct LatexToolchain {
    config: ToolchainConfig,
}

impl LatexToolchain {
    #[must_use]
    pub const fn new(config: ToolchainConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &ToolchainConfig {
        &self.config
    }

    /// Programs that cannot be found, in run order.
    #[must_use]
    pub fn missing_tools(&self) -> Vec<String> {
        [&self.config.compiler, &self.config.rasterizer]
            .into_iter()
            .filter(|tool| !tool.is_available())
            .map(|tool| tool.program.clone())
            .collect()
    }
}

impl Compiler for LatexToolchain {
    fn compile(&self, snippet: &str, scratch: &Path) -> Result<PathBuf, PreviewError> {
        if snippet.trim().is_empty() {
            return Err(PreviewError::EmptySnippet);
        }
        let missing = self.missing_tools();
        if !missing.is_empty() {
            return Err(PreviewError::ToolMissing(missing));
        }

        fs::write(scratch.join(TEX_FILE), document(snippet))?;

        run(&self.config.compiler, &[TEX_FILE], scratch)?;
        let pdf = scratch.join(PDF_FILE);
        if !pdf.exists() {
            return Err(PreviewError::MissingOutput(pdf));
        }

        let prefix = scratch.join(IMAGE_STEM);
        run(
            &self.config.rasterizer,
            &[pdf.as_os_str(), prefix.as_os_str()],
            scratch,
        )?;
        let image = scratch.join(IMAGE_FILE);
        if !image.exists() {
            return Err(PreviewError::MissingOutput(image));
        }
        Ok(image)
    }
}

fn run<S: AsRef<std::ffi::OsStr>>(tool: &Tool, extra: &[S], cwd: &Path) -> Result<(), PreviewError> {
    debug!(program = %tool.program, cwd = %cwd.display(), "running preview tool");
    let output = Command::new(&tool.program)
        .args(&tool.args)
        .args(extra)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PreviewError::ToolMissing(vec![tool.program.clone()]),
            _ => PreviewError::Io(e),
        })?;

    if output.status.success() {
        return Ok(());
    }
    let stderr = truncate(String::from_utf8_lossy(&output.stderr).trim(), STDERR_LIMIT);
    warn!(program = %tool.program, status = %output.status, "preview tool failed");
    Err(PreviewError::ToolFailed {
        tool: tool.program.clone(),
        status: output.status.to_string(),
        stderr,
    })
}

/// First `limit` characters of `text`.
fn truncate(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

// ── Tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn missing_config() -> ToolchainConfig {
        ToolchainConfig {
            compiler: Tool::new("wick-test-no-such-latexmk", &[]),
            rasterizer: Tool::new("wick-test-no-such-pdftoppm", &[]),
        }
    }

    #[test]
    fn default_tools() {
        let config = ToolchainConfig::default();
        assert_eq!(config.compiler.program, "latexmk");
        assert_eq!(config.compiler.args[0], "-pdflua");
        assert_eq!(config.rasterizer.program, "pdftoppm");
        assert_eq!(config.rasterizer.args, ["-png", "-singlefile", "-f", "1", "-l", "1"]);
    }

    #[test]
    fn document_embeds_snippet_in_scaled_math() {
        let doc = document(r"\braket{ \wick{ a } }");
        assert!(doc.starts_with("\\documentclass[14pt]{article}\n"));
        assert!(doc.contains("\\usepackage{simpler-wick}\n"));
        assert!(doc.contains("\\scalebox{1.9}{$\n\\braket{ \\wick{ a } }\n$}"));
        assert!(doc.trim_end().ends_with("\\end{document}"));
    }

    #[test]
    fn missing_tools_are_reported_by_name() {
        let chain = LatexToolchain::new(missing_config());
        assert_eq!(
            chain.missing_tools(),
            vec!["wick-test-no-such-latexmk", "wick-test-no-such-pdftoppm"]
        );
        let dir = tempfile::tempdir().unwrap();
        let err = chain.compile("x", dir.path()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing commands for preview: wick-test-no-such-latexmk, wick-test-no-such-pdftoppm."
        );
        assert!(!dir.path().join(TEX_FILE).exists());
    }

    #[test]
    fn blank_snippet_is_rejected_before_tools() {
        let chain = LatexToolchain::new(missing_config());
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(chain.compile("  ", dir.path()), Err(PreviewError::EmptySnippet)));
    }

    #[cfg(unix)]
    #[test]
    fn failing_tool_reports_status() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(&Tool::new("false", &[]), &[] as &[&str], dir.path()).unwrap_err();
        match err {
            PreviewError::ToolFailed { tool, status, .. } => {
                assert_eq!(tool, "false");
                assert!(status.contains('1'));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn compiler_without_output_reports_missing_pdf() {
        let config = ToolchainConfig {
            compiler: Tool::new("true", &[]),
            rasterizer: Tool::new("true", &[]),
        };
        let dir = tempfile::tempdir().unwrap();
        let err = LatexToolchain::new(config).compile("x", dir.path()).unwrap_err();
        assert!(matches!(err, PreviewError::MissingOutput(ref p) if p.ends_with(PDF_FILE)));
        assert!(dir.path().join(TEX_FILE).exists());
    }

    #[test]
    fn truncate_counts_characters() {
        let long = "é".repeat(300);
        assert_eq!(truncate(&long, STDERR_LIMIT).chars().count(), 200);
        assert_eq!(truncate("short", STDERR_LIMIT), "short");
    }
}
