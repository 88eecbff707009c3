//! Working directories for one pipeline run.
//!
//! A [`Workspace`] is acquired before the first stage and released when it
//! is dropped, on success and on every error path alike. Release is best
//! effort: failures are logged and swallowed.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const RAW_DIR: &str = "audios";
pub const TRIMMED_DIR: &str = "cuts";
pub const OUTPUT_DIR: &str = "output";

/// What to remove when the workspace is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupPolicy {
    /// Remove raw and trimmed clips, keep the output directory.
    Intermediate,
    /// Remove the whole workspace root.
    Everything,
}

/// Unique name for one web job, e.g. `20260116-093512-3f2a...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobId(String);

impl JobId {
    pub fn new() -> Self {
        let stamp = Utc::now().format("%Y%m%d-%H%M%S");
        Self(format!("{stamp}-{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    raw: PathBuf,
    trimmed: PathBuf,
    output: PathBuf,
    policy: CleanupPolicy,
}

impl Workspace {
    /// Prepare `root/{audios,cuts,output}`.
    ///
    /// Raw and trimmed directories are always emptied first. The output
    /// directory is emptied only under [`CleanupPolicy::Everything`]; with
    /// `Intermediate` it holds earlier deliverables and is left alone.
    pub fn prepare(root: impl Into<PathBuf>, policy: CleanupPolicy) -> io::Result<Self> {
        let root = root.into();
        let ws = Self {
            raw: root.join(RAW_DIR),
            trimmed: root.join(TRIMMED_DIR),
            output: root.join(OUTPUT_DIR),
            root,
            policy,
        };

        let mut fresh = vec![&ws.raw, &ws.trimmed];
        if policy == CleanupPolicy::Everything {
            fresh.push(&ws.output);
        }
        for dir in fresh {
            remove_if_present(dir)?;
        }
        for dir in [&ws.raw, &ws.trimmed, &ws.output] {
            fs::create_dir_all(dir)?;
        }

        info!("Workspace ready under {}", ws.root.display());
        Ok(ws)
    }

    /// Dedicated tree for one web job: `base/<job-id>/...`, removed entirely
    /// on release so concurrent jobs never see each other's files.
    pub fn for_job(base: &Path, job: &JobId) -> io::Result<Self> {
        Self::prepare(base.join(job.as_str()), CleanupPolicy::Everything)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn raw(&self) -> &Path {
        &self.raw
    }

    pub fn trimmed(&self) -> &Path {
        &self.trimmed
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    fn release(&self) {
        let targets: Vec<&Path> = match self.policy {
            CleanupPolicy::Intermediate => vec![self.raw.as_path(), self.trimmed.as_path()],
            CleanupPolicy::Everything => vec![self.root.as_path()],
        };
        for dir in targets {
            match fs::remove_dir_all(dir) {
                Ok(()) => debug!("Removed {}", dir.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove {}: {}", dir.display(), e),
            }
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.release();
    }
}

fn remove_if_present(dir: &Path) -> io::Result<()> {
    match fs::remove_dir_all(dir) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
