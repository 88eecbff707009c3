//! Seams to the external collaborators: the media backend, the audio codec
//! and the mail relay. The pipeline only ever talks to these traits.

use std::path::{Path, PathBuf};

use lettre::Address;

use crate::error::Result;

pub mod acquirer;
pub mod mailer;
pub mod packager;

/// Searches for and downloads tracks by a performer.
pub trait TrackSource: Send + Sync {
    /// Download up to `count` tracks for `performer` into `dest`, one mp3
    /// per track named after its source title.
    fn fetch(&self, performer: &str, count: u32, dest: &Path) -> Result<()>;
}

/// Decode, slice, join and encode audio files.
pub trait AudioEngine: Send + Sync {
    fn probe_duration(&self, path: &Path) -> Result<f64>;

    /// Write the leading `secs` seconds of `input` to `output`. A track
    /// shorter than `secs` is copied whole.
    fn trim(&self, input: &Path, output: &Path, secs: u32) -> Result<()>;

    /// Append `inputs` in order into one track at `output`.
    fn concat(&self, inputs: &[PathBuf], output: &Path) -> Result<()>;
}

/// Sends a finished archive to a recipient.
pub trait Mailer: Send + Sync {
    fn send_archive(&self, recipient: &Address, archive: &Path) -> Result<()>;
}
