//! Preview pipeline — background compilation with a pollable job table.
//!
//! Each request becomes a job that moves `Pending → Running → Done | Failed`.
//! At most one job runs at a time, on its own worker thread, because every
//! job writes into the same scratch directory. A request that arrives while
//! a job runs waits in a single queue slot; a later request takes that slot
//! and the job it displaces fails as `superseded`. Running jobs are never
//! interrupted.
//!
//! The worker reports back over a channel. Results are picked up only in
//! [`PreviewPipeline::poll`], which the event loop calls once per tick, so
//! the foreground sees each transition at a well-defined point and never
//! blocks on a compilation.
//!
//! The job table keeps unfinished jobs and the most recent request. Other
//! jobs are dropped from it once `poll` has reported them.
//!
//! The scratch directory (`wick_preview_*` in the system temp dir) lives as
//! long as the pipeline. Dropping the pipeline deletes the directory without
//! waiting for a running worker; the detached worker's result is discarded.

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::error::PreviewError;
use crate::toolchain::{Compiler, LatexToolchain, ToolchainConfig};

/// Prefix of the scratch directory name.
pub const SCRATCH_PREFIX: &str = "wick_preview_";

/// Message of a job displaced from the queue by a newer request.
pub const SUPERSEDED: &str = "superseded";

// ── Jobs ──────────────────────────────────────────────────────────────────

/// Identifies one preview request. Ids increase with request order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a job is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    /// Waiting for the running job to finish.
    Pending,
    /// Compiling on the worker thread.
    Running,
    /// Finished with an image.
    Done(PathBuf),
    /// Finished without one.
    Failed(String),
}

impl JobStatus {
    /// Whether the job reached `Done` or `Failed`.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self, Self::Done(_) | Self::Failed(_))
    }
}

struct Completion {
    id: JobId,
    result: Result<PathBuf, PreviewError>,
    elapsed: Duration,
}

struct Running {
    id: JobId,
    handle: JoinHandle<()>,
}

// ── PreviewPipeline ───────────────────────────────────────────────────────

/// Serialized background compilation of snippets to images.
pub struct PreviewPipeline {
    compiler: Arc<dyn Compiler>,
    scratch: Option<TempDir>,
    jobs: BTreeMap<JobId, JobStatus>,
    running: Option<Running>,
    queued: Option<(JobId, String)>,
    next_id: u64,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
}

impl PreviewPipeline {
    /// A pipeline running `compiler`, with a fresh scratch directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the scratch directory cannot be created.
    pub fn new(compiler: Arc<dyn Compiler>) -> io::Result<Self> {
        let scratch = tempfile::Builder::new().prefix(SCRATCH_PREFIX).tempdir()?;
        debug!(dir = %scratch.path().display(), "created preview scratch directory");
        let (tx, rx) = mpsc::channel();
        Ok(Self {
            compiler,
            scratch: Some(scratch),
            jobs: BTreeMap::new(),
            running: None,
            queued: None,
            next_id: 1,
            tx,
            rx,
        })
    }

    /// A pipeline running the LaTeX toolchain.
    ///
    /// # Errors
    ///
    /// Returns an error if the scratch directory cannot be created.
    pub fn with_toolchain(config: ToolchainConfig) -> io::Result<Self> {
        Self::new(Arc::new(LatexToolchain::new(config)))
    }

    /// The scratch directory. Only the worker writes here.
    #[must_use]
    pub fn scratch_dir(&self) -> Option<&Path> {
        self.scratch.as_ref().map(TempDir::path)
    }

    /// Current status of a job.
    #[must_use]
    pub fn status(&self, id: JobId) -> Option<&JobStatus> {
        self.jobs.get(&id)
    }

    /// Whether a job is running or queued.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.running.is_some() || self.queued.is_some()
    }

    /// Submit a snippet. Never blocks and never fails; problems show up in
    /// the job's status.
    pub fn request(&mut self, snippet: impl Into<String>) -> JobId {
        let id = JobId(self.next_id);
        self.next_id += 1;
        let snippet = snippet.into();

        if snippet.trim().is_empty() {
            self.jobs
                .insert(id, JobStatus::Failed(PreviewError::EmptySnippet.to_string()));
            return id;
        }

        if self.running.is_some() {
            self.jobs.insert(id, JobStatus::Pending);
            if let Some((displaced, _)) = self.queued.replace((id, snippet)) {
                debug!(job = %displaced, by = %id, "queued preview superseded");
                self.jobs
                    .insert(displaced, JobStatus::Failed(SUPERSEDED.to_owned()));
            }
            return id;
        }

        self.start(id, snippet);
        id
    }

    fn start(&mut self, id: JobId, snippet: String) {
        let Some(dir) = self.scratch_dir().map(Path::to_path_buf) else {
            self.jobs
                .insert(id, JobStatus::Failed("preview directory is gone".to_owned()));
            return;
        };
        let compiler = Arc::clone(&self.compiler);
        let tx = self.tx.clone();

        let spawned = thread::Builder::new()
            .name("wick-preview".into())
            .spawn(move || {
                let started = Instant::now();
                let result = compiler.compile(&snippet, &dir);
                let _ = tx.send(Completion {
                    id,
                    result,
                    elapsed: started.elapsed(),
                });
            });

        match spawned {
            Ok(handle) => {
                info!(job = %id, "preview started");
                self.jobs.insert(id, JobStatus::Running);
                self.running = Some(Running { id, handle });
            }
            Err(e) => {
                warn!(job = %id, error = %e, "could not start preview worker");
                self.jobs
                    .insert(id, JobStatus::Failed(format!("could not start preview worker: {e}")));
            }
        }
    }

    /// Collect finished work and start the queued job if the worker is
    /// free. Returns the jobs that finished since the last poll.
    pub fn poll(&mut self) -> Vec<(JobId, JobStatus)> {
        let mut finished = Vec::new();
        while let Ok(done) = self.rx.try_recv() {
            if self.running.as_ref().is_some_and(|r| r.id == done.id) {
                if let Some(running) = self.running.take() {
                    let _ = running.handle.join();
                }
            }
            let status = match done.result {
                Ok(image) => {
                    info!(job = %done.id, elapsed = ?done.elapsed, image = %image.display(), "preview done");
                    JobStatus::Done(image)
                }
                Err(e) => {
                    warn!(job = %done.id, elapsed = ?done.elapsed, error = %e, "preview failed");
                    JobStatus::Failed(e.to_string())
                }
            };
            self.jobs.insert(done.id, status.clone());
            finished.push((done.id, status));
        }

        if self.running.is_none() {
            if let Some((id, snippet)) = self.queued.take() {
                self.start(id, snippet);
            }
        }

        let latest = JobId(self.next_id - 1);
        self.jobs.retain(|&id, status| id == latest || !status.is_finished());
        finished
    }
}

impl Drop for PreviewPipeline {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            debug!(job = %running.id, "detaching preview worker");
        }
        if let Some(dir) = self.scratch.take() {
            let path = dir.path().to_path_buf();
            if let Err(e) = dir.close() {
                warn!(dir = %path.display(), error = %e, "could not remove preview directory");
            }
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────
