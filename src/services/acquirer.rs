use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info, warn};

use crate::config::{BackendConfig, AUDIO_CODEC};
use crate::error::{MashupError, Result};
use crate::pipeline::list_audio_files;
use crate::services::TrackSource;
use crate::utils::truncate::tail_graphemes;

const STDERR_EXCERPT: usize = 400;
/// Name of the per-download copy of the cookie file.
const COOKIE_JAR: &str = "cookies.txt";

/// Search query handed to the backend: the top `count` results for
/// "`performer` song".
pub fn search_query(performer: &str, count: u32) -> String {
    format!("ytsearch{count}:{performer} song")
}

/// [`TrackSource`] backed by the `yt-dlp` command-line tool.
#[derive(Debug, Clone)]
pub struct YtDlp {
    config: BackendConfig,
}

impl YtDlp {
    pub fn new(config: BackendConfig) -> Self {
        Self { config }
    }

    /// Copy the secret cookie file into `dest`.
    ///
    /// The backend rewrites the cookie jar while it runs and the secret
    /// mount is read-only. Each download directory gets its own copy, so
    /// concurrent jobs never touch the same jar, and the copy goes away
    /// with the directory. Returns the path to pass along, if any.
    fn writable_cookies(&self, dest: &Path) -> Option<PathBuf> {
        let source = &self.config.cookies_source;
        if !source.is_file() {
            return None;
        }

        let jar = dest.join(COOKIE_JAR);
        match fs::copy(source, &jar) {
            Ok(_) => {
                debug!("copied cookies to {}", jar.display());
                Some(jar)
            }
            Err(e) => {
                warn!("could not copy cookies from {}: {}", source.display(), e);
                None
            }
        }
    }

    fn build_args(
        &self,
        performer: &str,
        count: u32,
        dest: &Path,
        cookies: Option<&Path>,
    ) -> Vec<OsString> {
        let template = dest.join("%(title)s.%(ext)s");
        let mut args: Vec<OsString> = vec![
            search_query(performer, count).into(),
            "--format".into(),
            "bestaudio/best".into(),
            "--output".into(),
            template.into_os_string(),
            "--no-playlist".into(),
            "--quiet".into(),
            "--no-warnings".into(),
            "--extract-audio".into(),
            "--audio-format".into(),
            AUDIO_CODEC.into(),
            "--audio-quality".into(),
            format!("{}K", self.config.bitrate_kbps).into(),
            "--socket-timeout".into(),
            self.config.socket_timeout.as_secs().to_string().into(),
            "--retries".into(),
            self.config.retries.to_string().into(),
        ];
        if let Some(cookies) = cookies {
            args.push("--cookies".into());
            args.push(cookies.as_os_str().to_owned());
        }
        args
    }
}

impl TrackSource for YtDlp {
    fn fetch(&self, performer: &str, count: u32, dest: &Path) -> Result<()> {
        let cookies = self.writable_cookies(dest);
        let args = self.build_args(performer, count, dest, cookies.as_deref());
        let program = self.config.binary.to_string_lossy().into_owned();

        info!("searching {} for \"{}\"", program, search_query(performer, count));
        debug!("spawning {} {:?}", program, args);

        let output = Command::new(&self.config.binary)
            .args(&args)
            .output()
            .map_err(|e| MashupError::spawn(&program, e))?;

        if output.status.success() {
            return Ok(());
        }

        // Some results failing is tolerated; the later stages work with
        // whatever landed in `dest`.
        let stderr = String::from_utf8_lossy(&output.stderr);
        let downloaded = list_audio_files(dest)?.len();
        if downloaded > 0 {
            warn!(
                "{} exited with {} after downloading {} tracks: {}",
                program,
                output.status,
                downloaded,
                tail_graphemes(&stderr, STDERR_EXCERPT)
            );
            return Ok(());
        }

        Err(MashupError::Download(format!(
            "{} exited with {}: {}",
            program,
            output.status,
            tail_graphemes(&stderr, STDERR_EXCERPT)
        )))
    }
}
