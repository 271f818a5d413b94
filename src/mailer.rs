//! Email notification for completed batches.
//!
//! Sent only when both an SMTP password and a destination address are
//! configured; leaving either out means the user opted out. A send failure
//! is surfaced to the operator, but by that point the results are already
//! durable on disk.

use chrono::Utc;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::path::Path;
use thiserror::Error;

use crate::config::EmailConfig;

const DEFAULT_SMTP_SERVER: &str = "smtp.gmail.com";
const DEFAULT_SENDER: &str = "serpsum-notify@gmail.com";

#[derive(Error, Debug)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("smtp failure: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
    #[error("failed to read attachment: {0}")]
    Attachment(#[from] std::io::Error),
}

/// True when the configuration carries everything needed to send mail.
pub fn mail_enabled(email: &EmailConfig) -> bool {
    email.smtp_password.is_some() && email.destination.is_some()
}

/// Send the completion notification with the zip archive attached.
///
/// Callers should check [`mail_enabled`] first; this returns `Ok(())`
/// without sending when the configuration opts out.
pub fn send_notification(
    email: &EmailConfig,
    project_dir: &Path,
    zip_path: &Path,
) -> Result<(), MailError> {
    let (Some(password), Some(destination)) = (&email.smtp_password, &email.destination) else {
        return Ok(());
    };

    let sender = email.sender.as_deref().unwrap_or(DEFAULT_SENDER);
    let smtp_server = email.smtp_server.as_deref().unwrap_or(DEFAULT_SMTP_SERVER);

    let project_name = project_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| project_dir.display().to_string());
    let body = format!(
        "Summarization job has now completed. Project name: {}. Finished at {}.",
        project_name,
        Utc::now().format("%Y-%m-%d %H:%M UTC")
    );

    let archive = std::fs::read(zip_path)?;
    let archive_name = zip_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "summary_files.zip".to_string());

    let message = Message::builder()
        .from(sender.parse()?)
        .to(destination.parse()?)
        .subject("serpsum notification")
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(body))
                .singlepart(
                    Attachment::new(archive_name)
                        .body(archive, ContentType::parse("application/zip").unwrap()),
                ),
        )?;

    let transport = SmtpTransport::relay(smtp_server)?
        .credentials(Credentials::new(sender.to_string(), password.clone()))
        .build();
    transport.send(&message)?;
    Ok(())
}
