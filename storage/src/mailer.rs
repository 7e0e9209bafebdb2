//! Outbound email for session reports.
//!
//! [`ReportMailer`] is the sink; [`SmtpMailer`] implements it over an SMTP relay with STARTTLS
//! (lettre, tokio executor).

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, warn};

use crate::config::MailConfig;
use crate::error::DeliveryError;

/// A rendered report ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailReport {
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub attachments: Vec<PathBuf>,
}

/// Delivers report emails.
#[async_trait]
pub trait ReportMailer: Send + Sync {
    async fn send(&self, report: &EmailReport) -> Result<(), DeliveryError>;
}

/// SMTP relay mailer authenticated with the configured username/password.
pub struct SmtpMailer {
    from: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Builds a mailer when both credentials are configured; `Ok(None)` otherwise.
    pub fn from_config(config: &MailConfig) -> Result<Option<Self>, DeliveryError> {
        let (Some(username), Some(password)) = (&config.username, &config.password) else {
            return Ok(None);
        };
        let from: Mailbox = username
            .parse()
            .map_err(|e| DeliveryError::Address(format!("{}: {}", username, e)))?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_server)
            .map_err(|e| DeliveryError::Smtp(e.to_string()))?
            .port(config.smtp_port)
            .credentials(Credentials::new(username.clone(), password.clone()))
            .build();
        Ok(Some(Self { from, transport }))
    }
}

fn content_type_for(path: &Path) -> Result<ContentType, DeliveryError> {
    let mime = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => "application/json",
        Some("csv") => "text/csv",
        _ => "application/octet-stream",
    };
    ContentType::parse(mime).map_err(|e| DeliveryError::Build(e.to_string()))
}

#[async_trait]
impl ReportMailer for SmtpMailer {
    async fn send(&self, report: &EmailReport) -> Result<(), DeliveryError> {
        let to: Mailbox = report
            .to
            .parse()
            .map_err(|e| DeliveryError::Address(format!("{}: {}", report.to, e)))?;

        let mut body = MultiPart::mixed().singlepart(SinglePart::html(report.html_body.clone()));
        for path in &report.attachments {
            if !path.exists() {
                warn!(path = %path.display(), "Attachment missing, skipped");
                continue;
            }
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|source| DeliveryError::Attachment {
                    path: path.clone(),
                    source,
                })?;
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "attachment".to_string());
            body = body.singlepart(Attachment::new(filename).body(bytes, content_type_for(path)?));
        }

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(report.subject.clone())
            .multipart(body)
            .map_err(|e| DeliveryError::Build(e.to_string()))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| DeliveryError::Smtp(e.to_string()))?;
        info!(to = %report.to, attachments = report.attachments.len(), "Report email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(username: Option<&str>, password: Option<&str>) -> MailConfig {
        MailConfig {
            username: username.map(String::from),
            password: password.map(String::from),
            smtp_server: "smtp.example.com".to_string(),
            smtp_port: 587,
            admin_email: Some("admin@example.com".to_string()),
        }
    }

    #[test]
    fn test_no_mailer_without_credentials() {
        assert!(SmtpMailer::from_config(&config(None, Some("pw"))).unwrap().is_none());
        assert!(SmtpMailer::from_config(&config(Some("me@example.com"), None)).unwrap().is_none());
    }

    #[test]
    fn test_invalid_sender_address() {
        let err = SmtpMailer::from_config(&config(Some("not an address"), Some("pw")));
        assert!(matches!(err, Err(DeliveryError::Address(_))));
    }

    #[test]
    fn test_content_types() {
        assert_eq!(
            content_type_for(Path::new("a.json")).unwrap(),
            ContentType::parse("application/json").unwrap()
        );
        assert_eq!(
            content_type_for(Path::new("a.csv")).unwrap(),
            ContentType::parse("text/csv").unwrap()
        );
    }
}
