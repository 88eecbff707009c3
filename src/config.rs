//! Process configuration.
//!
//! Values are pulled through a lookup function instead of reading the
//! environment directly: the web binary feeds it from the shuttle secret
//! store, the CLI from `std::env`, tests from a map.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{MashupError, Result};

pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 465;
pub const DEFAULT_COOKIES_SOURCE: &str = "/etc/secrets/cookies.txt";

/// Target encoding for every file the pipeline writes.
pub const AUDIO_CODEC: &str = "mp3";
pub const AUDIO_BITRATE_KBPS: u32 = 192;

#[derive(Debug, Clone)]
pub struct Config {
    pub backend: BackendConfig,
    pub audio: AudioConfig,
    /// Only the web binary needs mail, so a missing or malformed setting is
    /// kept here and reported by [`Config::require_mail`].
    mail: std::result::Result<MailConfig, String>,
    /// Root under which each web job gets its own directory tree.
    pub workspace_root: PathBuf,
}

/// Media search/download backend (yt-dlp).
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub binary: PathBuf,
    /// Secret cookie file, possibly on a read-only mount. Each download
    /// works on its own copy.
    pub cookies_source: PathBuf,
    pub socket_timeout: Duration,
    pub retries: u32,
    pub bitrate_kbps: u32,
}

#[derive(Debug, Clone)]
pub struct AudioConfig {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
    pub bitrate_kbps: u32,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub sender: String,
    pub password: String,
    pub smtp_host: String,
    pub smtp_port: u16,
}

impl Config {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let path_or = |key: &str, default: PathBuf| get(key).map(PathBuf::from).unwrap_or(default);

        let backend = BackendConfig {
            binary: path_or("YTDLP_BIN", PathBuf::from("yt-dlp")),
            cookies_source: path_or("COOKIES_SOURCE", PathBuf::from(DEFAULT_COOKIES_SOURCE)),
            socket_timeout: Duration::from_secs(30),
            retries: 10,
            bitrate_kbps: AUDIO_BITRATE_KBPS,
        };

        let audio = AudioConfig {
            ffmpeg: path_or("FFMPEG_BIN", PathBuf::from("ffmpeg")),
            ffprobe: path_or("FFPROBE_BIN", PathBuf::from("ffprobe")),
            bitrate_kbps: AUDIO_BITRATE_KBPS,
        };

        Self {
            backend,
            audio,
            mail: mail_settings(&get),
            workspace_root: path_or("MASHUP_WORKSPACE", std::env::temp_dir().join("mashup-jobs")),
        }
    }

    /// Mail settings, or a configuration fault naming what is missing or
    /// malformed.
    pub fn require_mail(&self) -> Result<&MailConfig> {
        self.mail
            .as_ref()
            .map_err(|message| MashupError::config(message.clone()))
    }
}

fn mail_settings(
    get: &dyn Fn(&str) -> Option<String>,
) -> std::result::Result<MailConfig, String> {
    let (Some(sender), Some(password)) = (get("SENDER_EMAIL"), get("SENDER_PASSWORD")) else {
        return Err("SENDER_EMAIL and SENDER_PASSWORD must both be set".to_string());
    };
    let smtp_port = match get("SMTP_PORT") {
        Some(raw) => raw
            .trim()
            .parse::<u16>()
            .map_err(|_| format!("SMTP_PORT is not a valid port: {raw}"))?,
        None => DEFAULT_SMTP_PORT,
    };
    Ok(MailConfig {
        sender,
        password,
        smtp_host: get("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
        smtp_port,
    })
}
