//! Command-line front end.
//!
//! `mashup <SingerName> <NumberOfVideos> <AudioDuration> <OutputFileName>`
//! writes the result to `./output/<OutputFileName>`. Everything the user
//! sees goes to the writer handed to [`run`]; logs go elsewhere.

use std::io::{self, Write};
use std::path::Path;

use clap::Parser;
use tracing::info;

use crate::jobs::run_cli_job;
use crate::params::validate_cli;
use crate::services::{AudioEngine, TrackSource};
use crate::workspace::OUTPUT_DIR;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
/// Bad arguments, matching the status clap uses for usage errors.
pub const EXIT_USAGE: u8 = 2;

/// Download songs by a singer, cut the first seconds of each and merge
/// them into one mp3.
#[derive(Debug, Parser)]
#[command(name = "mashup", version, about, allow_negative_numbers = true)]
pub struct Cli {
    /// Singer to search for
    #[arg(value_name = "SingerName")]
    pub singer: String,
    /// How many songs to download (more than 10)
    #[arg(value_name = "NumberOfVideos")]
    pub videos: String,
    /// Seconds to keep from the start of each song (more than 20)
    #[arg(value_name = "AudioDuration")]
    pub duration: String,
    /// Name of the merged file, ending in .mp3
    #[arg(value_name = "OutputFileName")]
    pub output: String,
}

/// Validate the arguments, build the mashup under `root` and report the
/// outcome on `out`. Returns the process exit status.
///
/// Nothing is created under `root` when validation fails.
pub fn run<W: Write>(
    cli: &Cli,
    root: &Path,
    source: &dyn TrackSource,
    engine: &dyn AudioEngine,
    out: &mut W,
) -> io::Result<u8> {
    let params = match validate_cli(&cli.singer, &cli.videos, &cli.duration, &cli.output) {
        Ok(params) => params,
        Err(e) => {
            writeln!(out, "{}", e.cli_message())?;
            return Ok(EXIT_USAGE);
        }
    };

    let mut write_error = None;
    let result = run_cli_job(root, &params, source, engine, &mut |stage| {
        if let Err(e) = writeln!(out, "{stage}") {
            write_error.get_or_insert(e);
        }
    });
    if let Some(e) = write_error {
        return Err(e);
    }

    match result {
        Ok(mashup) => {
            info!(
                "{} clips, {:.1}s total, written to {}",
                mashup.tracks.len(),
                mashup.duration_secs,
                mashup.path.display()
            );
            writeln!(out, "SUCCESS: Mashup created in {}/{}", OUTPUT_DIR, params.output_name)?;
            Ok(EXIT_SUCCESS)
        }
        Err(e) => {
            writeln!(out, "ERROR: {e}")?;
            Ok(EXIT_FAILURE)
        }
    }
}
