//! Performer mashups: download a performer's songs, keep the opening
//! seconds of each, join the clips into one track, then either leave it on
//! disk (CLI) or zip and email it (web form).

pub mod app_state;
pub mod cli;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod jobs;
pub mod params;
pub mod pipeline;
pub mod services;
#[cfg(test)]
pub mod test_utils;
pub mod utils;
pub mod workspace;

pub use error::{MashupError, Result};
