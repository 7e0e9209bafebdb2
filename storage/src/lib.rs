//! Storage crate: conversation persistence and the emailed session report.
//!
//! ## Modules
//!
//! - [`error`] – PersistenceError, DeliveryError
//! - [`config`] – MailConfig (env)
//! - [`models`] – ConversationRecord (JSON), SummaryRow (CSV)
//! - [`report`] – HTML report body and subject
//! - [`mailer`] – ReportMailer trait, SmtpMailer (lettre)
//! - [`session_store`] – SessionStore::persist

mod config;
mod error;
mod mailer;
mod models;
mod report;
mod session_store;

pub use config::{MailConfig, DEFAULT_SMTP_PORT, DEFAULT_SMTP_SERVER};
pub use error::{DeliveryError, PersistenceError};
pub use mailer::{EmailReport, ReportMailer, SmtpMailer};
pub use models::{ConversationRecord, SummaryRow};
pub use report::{render_report_html, report_subject};
pub use session_store::{PersistResult, ReportOutcome, SessionStore, SUMMARY_FILE_NAME};
