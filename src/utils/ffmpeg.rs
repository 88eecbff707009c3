use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::AudioConfig;
use crate::error::{MashupError, Result};
use crate::services::AudioEngine;
use crate::utils::concat_list::write_concat_list;
use crate::utils::truncate::tail_graphemes;

/// How much of a failing tool's stderr ends up in the error message.
const STDERR_EXCERPT: usize = 400;

/// [`AudioEngine`] backed by the `ffmpeg` and `ffprobe` binaries.
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
    bitrate: String,
}

impl Ffmpeg {
    pub fn new(config: &AudioConfig) -> Self {
        Self {
            ffmpeg: config.ffmpeg.clone(),
            ffprobe: config.ffprobe.clone(),
            bitrate: format!("{}k", config.bitrate_kbps),
        }
    }

    /// `true` when the configured ffmpeg binary can be started.
    pub fn is_available(&self) -> bool {
        Command::new(&self.ffmpeg)
            .arg("-version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    /// Output options shared by trim and concat: audio only, mp3 at the
    /// configured bitrate.
    fn encode_args(&self) -> [&str; 7] {
        ["-vn", "-c:a", "libmp3lame", "-b:a", self.bitrate.as_str(), "-f", "mp3"]
    }

    /// Run ffmpeg, mapping a failed exit to an audio error about `subject`.
    fn run_ffmpeg(&self, args: &[OsString], subject: &Path) -> Result<()> {
        let program = self.ffmpeg.to_string_lossy().into_owned();
        debug!("spawning {} {:?}", program, args);

        let output = Command::new(&self.ffmpeg)
            .args(args)
            .output()
            .map_err(|e| MashupError::spawn(&program, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MashupError::audio(
                subject,
                format!(
                    "ffmpeg exited with {}: {}",
                    output.status,
                    tail_graphemes(&stderr, STDERR_EXCERPT)
                ),
            ));
        }
        Ok(())
    }
}

fn os(s: impl AsRef<OsStr>) -> OsString {
    s.as_ref().to_os_string()
}

impl AudioEngine for Ffmpeg {
    fn probe_duration(&self, path: &Path) -> Result<f64> {
        let program = self.ffprobe.to_string_lossy().into_owned();
        let output = Command::new(&self.ffprobe)
            .args(["-v", "error", "-show_entries", "format=duration", "-of", "json"])
            .arg(path)
            .output()
            .map_err(|e| MashupError::spawn(&program, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MashupError::audio(
                path,
                format!("ffprobe failed: {}", tail_graphemes(&stderr, STDERR_EXCERPT)),
            ));
        }

        parse_probe_json(&String::from_utf8_lossy(&output.stdout))
            .map_err(|message| MashupError::audio(path, message))
    }

    fn trim(&self, input: &Path, output: &Path, secs: u32) -> Result<()> {
        debug!("trimming {} to {}s", input.display(), secs);
        let mut args = vec![os("-y"), os("-hide_banner"), os("-loglevel"), os("error")];
        args.extend([os("-i"), os(input), os("-t"), os(secs.to_string())]);
        args.extend(self.encode_args().iter().map(os));
        args.push(os(output));
        self.run_ffmpeg(&args, input)
    }

    fn concat(&self, inputs: &[PathBuf], output: &Path) -> Result<()> {
        let list = output.with_extension("ffconcat");
        write_concat_list(inputs, &list)?;
        info!("concatenating {} clips into {}", inputs.len(), output.display());

        let mut args = vec![os("-y"), os("-hide_banner"), os("-loglevel"), os("error")];
        args.extend([os("-f"), os("concat"), os("-safe"), os("0"), os("-i"), os(&list)]);
        args.extend(self.encode_args().iter().map(os));
        args.push(os(output));
        let result = self.run_ffmpeg(&args, output);

        if let Err(e) = fs::remove_file(&list) {
            warn!("could not remove concat list {}: {}", list.display(), e);
        }
        result
    }
}

#[derive(Deserialize)]
struct ProbeOutput {
    format: ProbeFormat,
}

#[derive(Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Parse `ffprobe -show_entries format=duration -of json` output.
fn parse_probe_json(json: &str) -> std::result::Result<f64, String> {
    let parsed: ProbeOutput =
        serde_json::from_str(json).map_err(|e| format!("unreadable ffprobe output: {e}"))?;
    let raw = parsed
        .format
        .duration
        .ok_or_else(|| "ffprobe reported no duration".to_string())?;
    raw.trim()
        .parse::<f64>()
        .map_err(|_| format!("ffprobe reported a non-numeric duration: {raw}"))
}
