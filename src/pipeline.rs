//! The mashup pipeline: acquire, trim, concatenate.
//!
//! Each stage reads the previous stage's directory and writes into its own,
//! so no file is ever rewritten in place. Stages run strictly one after the
//! other; the first error aborts the run.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{MashupError, Result};
use crate::params::JobParams;
use crate::services::{AudioEngine, TrackSource};
use crate::workspace::Workspace;

/// One audio file produced by the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// Source title, taken from the file stem.
    pub title: String,
    pub path: PathBuf,
    pub duration_secs: f64,
}

impl Track {
    pub fn probe(path: &Path, engine: &dyn AudioEngine) -> Result<Self> {
        let title = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self {
            title,
            path: path.to_path_buf(),
            duration_secs: engine.probe_duration(path)?,
        })
    }
}

/// The concatenated result of a run.
#[derive(Debug, Clone)]
pub struct Mashup {
    pub path: PathBuf,
    /// Trimmed clips in the order they were appended.
    pub tracks: Vec<Track>,
    pub duration_secs: f64,
}

/// Progress notifications emitted as each stage starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Downloading { performer: String, count: u32 },
    Trimming { secs: u32 },
    Merging,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Downloading { performer, count } => {
                write!(f, "Downloading {count} videos for {performer}...")
            }
            Stage::Trimming { secs } => write!(f, "Cutting first {secs} seconds from each audio..."),
            Stage::Merging => f.write_str("Merging audios..."),
        }
    }
}

/// Lists the mp3 files directly inside `dir`, sorted by file name.
///
/// Sorting makes the order of clips in the mashup reproducible; raw
/// directory iteration order is platform dependent.
pub fn list_audio_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let is_mp3 = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("mp3"));
        if is_mp3 && entry.file_type()?.is_file() {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

pub struct Pipeline<'a> {
    source: &'a dyn TrackSource,
    engine: &'a dyn AudioEngine,
}

impl<'a> Pipeline<'a> {
    pub fn new(source: &'a dyn TrackSource, engine: &'a dyn AudioEngine) -> Self {
        Self { source, engine }
    }

    /// Download tracks into the raw directory and return what arrived.
    pub fn acquire(&self, ws: &Workspace, performer: &str, count: u32) -> Result<Vec<PathBuf>> {
        self.source.fetch(performer, count, ws.raw())?;

        let files = list_audio_files(ws.raw())?;
        if files.is_empty() {
            return Err(MashupError::NoTracks(performer.to_string()));
        }
        info!("Downloaded {} of {} requested tracks", files.len(), count);
        Ok(files)
    }

    /// Cut every raw track down to its leading `secs` seconds.
    pub fn trim_all(&self, ws: &Workspace, secs: u32) -> Result<Vec<Track>> {
        let mut trimmed = Vec::new();
        for input in list_audio_files(ws.raw())? {
            let Some(name) = input.file_name() else {
                continue;
            };
            let output = ws.trimmed().join(name);
            self.engine.trim(&input, &output, secs)?;

            let track = Track::probe(&output, self.engine)?;
            debug!("Trimmed \"{}\" to {:.1}s", track.title, track.duration_secs);
            trimmed.push(track);
        }
        Ok(trimmed)
    }

    /// Append the trimmed clips, in the order given, into
    /// `output/<output_name>`.
    pub fn concatenate(
        &self,
        ws: &Workspace,
        tracks: Vec<Track>,
        output_name: &str,
    ) -> Result<Mashup> {
        if tracks.is_empty() {
            return Err(MashupError::audio(ws.trimmed(), "no trimmed clips to merge"));
        }
        let inputs: Vec<PathBuf> = tracks.iter().map(|t| t.path.clone()).collect();
        let expected: f64 = tracks.iter().map(|t| t.duration_secs).sum();

        let path = ws.output().join(output_name);
        self.engine.concat(&inputs, &path)?;

        let duration_secs = self.engine.probe_duration(&path)?;
        info!(
            "Merged {} clips into {} ({:.1}s, expected {:.1}s)",
            tracks.len(),
            path.display(),
            duration_secs,
            expected
        );
        Ok(Mashup {
            path,
            tracks,
            duration_secs,
        })
    }

    /// Run all three stages, reporting each one as it starts.
    pub fn run(
        &self,
        ws: &Workspace,
        params: &JobParams,
        progress: &mut dyn FnMut(&Stage),
    ) -> Result<Mashup> {
        progress(&Stage::Downloading {
            performer: params.performer.clone(),
            count: params.track_count,
        });
        self.acquire(ws, &params.performer, params.track_count)?;

        progress(&Stage::Trimming {
            secs: params.trim_secs,
        });
        let tracks = self.trim_all(ws, params.trim_secs)?;

        progress(&Stage::Merging);
        self.concatenate(ws, tracks, &params.output_name)
    }
}
