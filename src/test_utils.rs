//! Fakes for the external collaborators.
//!
//! Audio files written by these fakes are plain text: the first line is the
//! duration in seconds, any further lines name the clips a merged file was
//! built from. That is enough to check trimming and ordering without a codec.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use lettre::Address;

use crate::error::{MashupError, Result};
use crate::services::{AudioEngine, Mailer, TrackSource};

/// Writes one fake track per configured `(title, duration)`.
pub struct FakeSource {
    tracks: Vec<(String, f64)>,
    calls: AtomicUsize,
}

impl FakeSource {
    pub fn new(tracks: &[(&str, f64)]) -> Self {
        Self {
            tracks: tracks.iter().map(|(t, d)| (t.to_string(), *d)).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TrackSource for FakeSource {
    fn fetch(&self, _performer: &str, count: u32, dest: &Path) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        for (title, duration) in self.tracks.iter().take(count as usize) {
            fs::write(dest.join(format!("{title}.mp3")), format!("{duration}\n"))?;
        }
        Ok(())
    }
}

/// A backend that is always unreachable.
pub struct FailingSource;

impl TrackSource for FailingSource {
    fn fetch(&self, _performer: &str, _count: u32, _dest: &Path) -> Result<()> {
        Err(MashupError::Download("network is unreachable".into()))
    }
}

pub struct FakeEngine;

impl FakeEngine {
    /// Clip names recorded in a merged fake file, in append order.
    pub fn merged_order(path: &Path) -> Vec<String> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .skip(1)
            .map(str::to_string)
            .collect()
    }
}

impl AudioEngine for FakeEngine {
    fn probe_duration(&self, path: &Path) -> Result<f64> {
        let text = fs::read_to_string(path)?;
        text.lines()
            .next()
            .and_then(|line| line.trim().parse::<f64>().ok())
            .ok_or_else(|| MashupError::audio(path, "invalid data found when processing input"))
    }

    fn trim(&self, input: &Path, output: &Path, secs: u32) -> Result<()> {
        let duration = self.probe_duration(input)?.min(f64::from(secs));
        fs::write(output, format!("{duration}\n"))?;
        Ok(())
    }

    fn concat(&self, inputs: &[PathBuf], output: &Path) -> Result<()> {
        let mut total = 0.0;
        let mut names = Vec::new();
        for input in inputs {
            total += self.probe_duration(input)?;
            names.push(input.file_name().unwrap().to_string_lossy().into_owned());
        }
        fs::write(output, format!("{total}\n{}", names.join("\n")))?;
        Ok(())
    }
}

/// What a [`RecordingMailer`] saw for one send.
#[derive(Debug, Clone)]
pub struct SentMail {
    pub recipient: String,
    pub archive_name: String,
    pub entries: Vec<String>,
    /// Clip names inside the first entry, when it is a merged fake file.
    pub clips: Vec<String>,
}

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<SentMail>>,
}

impl Mailer for RecordingMailer {
    fn send_archive(&self, recipient: &Address, archive: &Path) -> Result<()> {
        let mut bytes = Vec::new();
        fs::File::open(archive)?.read_to_end(&mut bytes)?;
        let mut zip = zip::ZipArchive::new(std::io::Cursor::new(bytes))?;
        let entries = zip.file_names().map(str::to_string).collect();
        let mut merged = String::new();
        zip.by_index(0)?.read_to_string(&mut merged)?;
        let clips = merged.lines().skip(1).map(str::to_string).collect();

        self.sent.lock().unwrap().push(SentMail {
            recipient: recipient.to_string(),
            archive_name: archive.file_name().unwrap().to_string_lossy().into_owned(),
            entries,
            clips,
        });
        Ok(())
    }
}

/// A relay that rejects the login.
pub struct FailingMailer;

impl Mailer for FailingMailer {
    fn send_archive(&self, _recipient: &Address, _archive: &Path) -> Result<()> {
        Err(MashupError::Mail("535 authentication failed".into()))
    }
}
