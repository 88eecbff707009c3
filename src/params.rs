//! Job parameters and their validation.
//!
//! Validation is pure: nothing here touches the filesystem or the network,
//! so a rejected request leaves no trace.

use std::path::Path;

use lettre::Address;
use serde::Deserialize;

/// Track counts must be strictly greater than this.
pub const MIN_TRACK_COUNT: u32 = 10;
/// Trim durations (seconds) must be strictly greater than this.
pub const MIN_TRIM_SECS: u32 = 20;
pub const AUDIO_EXTENSION: &str = ".mp3";

/// A validated request to build one mashup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobParams {
    pub performer: String,
    pub track_count: u32,
    pub trim_secs: u32,
    pub output_name: String,
}

/// A validated web request: the job plus where to send the result.
#[derive(Debug, Clone)]
pub struct EmailJob {
    pub params: JobParams,
    pub recipient: Address,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    NotIntegers,
    TooFewTracks,
    TrimTooShort,
    BadExtension,
    NotAFileName,
    InvalidEmail,
    MissingPerformer,
}

impl ValidationError {
    /// Wording printed by the command-line tool.
    pub fn cli_message(self) -> &'static str {
        match self {
            Self::NotIntegers => "Error: NumberOfVideos and AudioDuration must be integers",
            Self::TooFewTracks => "Error: NumberOfVideos must be greater than 10",
            Self::TrimTooShort => "Error: AudioDuration must be greater than 20 seconds",
            Self::BadExtension => "Error: OutputFileName must end with .mp3",
            Self::NotAFileName => "Error: OutputFileName must be a file name, not a path",
            Self::InvalidEmail => "Error: Invalid Email ID",
            Self::MissingPerformer => "Error: Singer name must not be empty",
        }
    }

    /// Wording returned in the body of the web form response.
    pub fn web_message(self) -> &'static str {
        match self {
            Self::NotIntegers => "Error: Videos and Duration must be integers",
            Self::TooFewTracks => "Error: Number of videos must be greater than 10",
            Self::TrimTooShort => "Error: Duration must be greater than 20 seconds",
            Self::InvalidEmail => "Error: Invalid Email ID",
            other => other.cli_message(),
        }
    }
}

/// Fields posted by the web form. Every field is optional so that a
/// missing one becomes a validation message instead of an extractor error.
#[derive(Debug, Default, Deserialize)]
pub struct MashupForm {
    pub singer: Option<String>,
    pub videos: Option<String>,
    pub duration: Option<String>,
    pub email: Option<String>,
}

/// Parse a decimal integer, saturated into `u32`.
///
/// Both limits are lower bounds, so negative values collapse to 0 and
/// values past `u32::MAX` are clamped rather than rejected.
fn parse_int(raw: Option<&str>) -> Option<u32> {
    let raw = raw?.trim();
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if negative {
        return Some(0);
    }
    Some(digits.parse::<u32>().unwrap_or(u32::MAX))
}

/// Parse and range-check the two numeric parameters.
fn check_numbers(count: Option<&str>, trim: Option<&str>) -> Result<(u32, u32), ValidationError> {
    let (Some(count), Some(trim)) = (parse_int(count), parse_int(trim)) else {
        return Err(ValidationError::NotIntegers);
    };
    if count <= MIN_TRACK_COUNT {
        return Err(ValidationError::TooFewTracks);
    }
    if trim <= MIN_TRIM_SECS {
        return Err(ValidationError::TrimTooShort);
    }
    Ok((count, trim))
}

fn check_performer(raw: Option<&str>) -> Result<String, ValidationError> {
    match raw.map(str::trim) {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(ValidationError::MissingPerformer),
    }
}

fn check_output_name(name: &str) -> Result<String, ValidationError> {
    if !name.ends_with(AUDIO_EXTENSION) {
        return Err(ValidationError::BadExtension);
    }
    let bare = Path::new(name)
        .file_name()
        .is_some_and(|file| file == name)
        && name.len() > AUDIO_EXTENSION.len();
    if !bare {
        return Err(ValidationError::NotAFileName);
    }
    Ok(name.to_string())
}

/// Parse a recipient address. Beyond the syntax `lettre` checks, the
/// domain must be a dotted name such as `example.com`; bare hosts like
/// `localhost` cannot receive mail from a public relay.
fn parse_email(raw: &str) -> Option<Address> {
    let address = raw.trim().parse::<Address>().ok()?;
    let domain = address.domain();
    let dotted = domain.contains('.') && domain.split('.').all(|label| !label.is_empty());
    dotted.then_some(address)
}

/// Validate the four positional arguments of the command-line tool.
pub fn validate_cli(
    performer: &str,
    track_count: &str,
    trim_secs: &str,
    output_name: &str,
) -> Result<JobParams, ValidationError> {
    let (track_count, trim_secs) = check_numbers(Some(track_count), Some(trim_secs))?;
    let output_name = check_output_name(output_name)?;
    let performer = check_performer(Some(performer))?;
    Ok(JobParams {
        performer,
        track_count,
        trim_secs,
        output_name,
    })
}

/// Validate a posted form. The output name is fixed for web jobs.
pub fn validate_form(form: &MashupForm, output_name: &str) -> Result<EmailJob, ValidationError> {
    let (track_count, trim_secs) =
        check_numbers(form.videos.as_deref(), form.duration.as_deref())?;
    let recipient = form
        .email
        .as_deref()
        .and_then(parse_email)
        .ok_or(ValidationError::InvalidEmail)?;
    let performer = check_performer(form.singer.as_deref())?;
    Ok(EmailJob {
        params: JobParams {
            performer,
            track_count,
            trim_secs,
            output_name: output_name.to_string(),
        },
        recipient,
    })
}
