use std::path::PathBuf;

/// Result type shared by every pipeline stage.
pub type Result<T> = std::result::Result<T, MashupError>;

/// Everything that can stop a mashup job once validation has passed.
///
/// The top-level handlers (CLI and web route) turn any of these into a
/// single `ERROR: <text>` line, so the `Display` texts are user-facing.
#[derive(Debug, thiserror::Error)]
pub enum MashupError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("download failed: {0}")]
    Download(String),

    #[error("no tracks were downloaded for \"{0}\"")]
    NoTracks(String),

    #[error("audio processing failed for {path}: {message}")]
    Audio { path: PathBuf, message: String },

    #[error("packaging failed: {0}")]
    Package(#[from] zip::result::ZipError),

    #[error("mail delivery failed: {0}")]
    Mail(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl MashupError {
    pub fn spawn(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source,
        }
    }

    pub fn audio(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Audio {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

impl From<lettre::error::Error> for MashupError {
    fn from(e: lettre::error::Error) -> Self {
        Self::Mail(e.to_string())
    }
}

impl From<lettre::transport::smtp::Error> for MashupError {
    fn from(e: lettre::transport::smtp::Error) -> Self {
        Self::Mail(e.to_string())
    }
}
