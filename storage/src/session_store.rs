//! Session store: writes the conversation JSON, appends the CSV summary row and optionally
//! emails an HTML report with both files attached.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bestie_core::ConversationSession;
use chrono::Utc;
use experiment::PreferenceStats;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument, warn};

use crate::error::PersistenceError;
use crate::mailer::{EmailReport, ReportMailer};
use crate::models::{ConversationRecord, SummaryRow};
use crate::report::{render_report_html, report_subject};

pub const SUMMARY_FILE_NAME: &str = "preferences_summary.csv";

/// What happened to the email step of a persist call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    NotRequested,
    NoRecipient,
    MailerUnavailable,
    Sent,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistResult {
    pub json_path: PathBuf,
    pub csv_path: PathBuf,
    pub report: ReportOutcome,
}

impl PersistResult {
    pub fn email_sent(&self) -> bool {
        self.report == ReportOutcome::Sent
    }
}

#[derive(Clone)]
pub struct SessionStore {
    data_dir: PathBuf,
    mailer: Option<Arc<dyn ReportMailer>>,
    admin_email: Option<String>,
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> PersistenceError + '_ {
    move |source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl SessionStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            mailer: None,
            admin_email: None,
        }
    }

    /// Attaches a mailer and the report recipient.
    pub fn with_mailer(mut self, mailer: Arc<dyn ReportMailer>, admin_email: Option<String>) -> Self {
        self.mailer = Some(mailer);
        self.admin_email = admin_email;
        self
    }

    /// Sets the recipient without a mailer (reports then resolve to `MailerUnavailable`).
    pub fn with_admin_email(mut self, admin_email: Option<String>) -> Self {
        self.admin_email = admin_email;
        self
    }

    pub fn json_path(&self, session: &ConversationSession) -> PathBuf {
        self.data_dir
            .join(format!("conversation_{}.json", session.conversation_id))
    }

    pub fn csv_path(&self) -> PathBuf {
        self.data_dir.join(SUMMARY_FILE_NAME)
    }

    async fn write_json(
        &self,
        path: &Path,
        record: &ConversationRecord<'_>,
    ) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(record)?;
        fs::write(path, json).await.map_err(io_error(path))?;
        info!(path = %path.display(), "Conversation JSON saved");
        Ok(())
    }

    /// Encodes the row in memory, then appends it in one write.
    async fn append_summary(&self, path: &Path, row: &SummaryRow) -> Result<(), PersistenceError> {
        let needs_header = fs::metadata(path)
            .await
            .map(|m| m.len() == 0)
            .unwrap_or(true);
        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(Vec::new());
        writer.serialize(row)?;
        let bytes = writer
            .into_inner()
            .map_err(|e| io_error(path)(e.into_error()))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(io_error(path))?;
        file.write_all(&bytes).await.map_err(io_error(path))?;
        file.flush().await.map_err(io_error(path))?;
        info!(path = %path.display(), header = needs_header, "Summary row appended");
        Ok(())
    }

    /// Writes both files, then runs the email step. A delivery failure leaves the files in place.
    #[instrument(skip_all, fields(conversation_id = %session.conversation_id))]
    pub async fn persist(
        &self,
        session: &ConversationSession,
        stats: &PreferenceStats,
        feedback: &str,
        send_report: bool,
    ) -> Result<PersistResult, PersistenceError> {
        let now = Utc::now();
        fs::create_dir_all(&self.data_dir)
            .await
            .map_err(io_error(&self.data_dir))?;

        let json_path = self.json_path(session);
        self.write_json(&json_path, &ConversationRecord::new(session, stats, feedback, now))
            .await?;

        let csv_path = self.csv_path();
        self.append_summary(&csv_path, &SummaryRow::new(session, stats, feedback, now))
            .await?;

        let report = if !send_report {
            ReportOutcome::NotRequested
        } else {
            match (&self.admin_email, &self.mailer) {
                (None, _) => ReportOutcome::NoRecipient,
                (Some(_), None) => ReportOutcome::MailerUnavailable,
                (Some(to), Some(mailer)) => {
                    let email = EmailReport {
                        to: to.clone(),
                        subject: report_subject(session, now),
                        html_body: render_report_html(session, stats, feedback, now),
                        attachments: vec![csv_path.clone(), json_path.clone()],
                    };
                    match mailer.send(&email).await {
                        Ok(()) => ReportOutcome::Sent,
                        Err(e) => {
                            warn!(error = %e, "Report email failed");
                            ReportOutcome::Failed(e.to_string())
                        }
                    }
                }
            }
        };

        Ok(PersistResult {
            json_path,
            csv_path,
            report,
        })
    }
}
