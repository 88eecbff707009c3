use std::fs;
use std::path::Path;
use std::time::Duration;

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, Message, SmtpTransport, Transport};
use tracing::info;

use crate::config::MailConfig;
use crate::error::{MashupError, Result};
use crate::services::Mailer;

pub const SUBJECT: &str = "Your Mashup File (ZIP)";
pub const BODY: &str = "Hello,\n\nYour mashup ZIP file is attached.\n\nThanks!";

const SMTP_TIMEOUT: Duration = Duration::from_secs(60);

/// [`Mailer`] that logs in to an SMTP relay over implicit TLS.
pub struct SmtpMailer {
    sender: Mailbox,
    config: MailConfig,
}

impl SmtpMailer {
    /// Fails when the configured sender is not a valid address.
    pub fn new(config: MailConfig) -> Result<Self> {
        let sender = config
            .sender
            .parse::<Address>()
            .map_err(|e| MashupError::config(format!("SENDER_EMAIL is not an address: {e}")))?;
        Ok(Self {
            sender: Mailbox::new(None, sender),
            config,
        })
    }

    /// Build the message carrying `archive` as a zip attachment.
    pub fn compose(&self, recipient: &Address, archive: &Path) -> Result<Message> {
        let file_name = archive
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "mashup.zip".to_string());
        let bytes = fs::read(archive)?;
        let zip_type = ContentType::parse("application/zip")
            .map_err(|e| MashupError::Mail(e.to_string()))?;

        let message = Message::builder()
            .from(self.sender.clone())
            .to(Mailbox::new(None, recipient.clone()))
            .subject(SUBJECT)
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(BODY.to_string()))
                    .singlepart(Attachment::new(file_name).body(bytes, zip_type)),
            )?;
        Ok(message)
    }

    fn transport(&self) -> Result<SmtpTransport> {
        let credentials = Credentials::new(self.config.sender.clone(), self.config.password.clone());
        Ok(SmtpTransport::relay(&self.config.smtp_host)?
            .port(self.config.smtp_port)
            .credentials(credentials)
            .timeout(Some(SMTP_TIMEOUT))
            .build())
    }
}

impl Mailer for SmtpMailer {
    fn send_archive(&self, recipient: &Address, archive: &Path) -> Result<()> {
        let message = self.compose(recipient, archive)?;
        self.transport()?.send(&message)?;
        info!("Mailed {} to {}", archive.display(), recipient);
        Ok(())
    }
}
