use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::services::acquirer::YtDlp;
use crate::services::mailer::SmtpMailer;
use crate::services::{AudioEngine, Mailer, TrackSource};
use crate::utils::ffmpeg::Ffmpeg;

/// Shared by every request of the web service.
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn TrackSource>,
    pub engine: Arc<dyn AudioEngine>,
    pub mailer: Arc<dyn Mailer>,
    /// Each job gets its own directory under here.
    pub workspace_root: PathBuf,
}

impl AppState {
    /// Wire up the production services. Missing mail credentials are a
    /// startup fault, not something individual requests report.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mailer = SmtpMailer::new(config.require_mail()?.clone())?;
        Ok(Self {
            source: Arc::new(YtDlp::new(config.backend.clone())),
            engine: Arc::new(Ffmpeg::new(&config.audio)),
            mailer: Arc::new(mailer),
            workspace_root: config.workspace_root.clone(),
        })
    }
}
