//! Mail configuration loaded from environment variables.

use std::env;

pub const DEFAULT_SMTP_SERVER: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Outbound mail settings. Every field is optional; missing ones disable the email step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub smtp_server: String,
    pub smtp_port: u16,
    /// Report recipient.
    pub admin_email: Option<String>,
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.trim().is_empty())
}

impl MailConfig {
    /// Reads EMAIL_USERNAME, EMAIL_PASSWORD, SMTP_SERVER, SMTP_PORT and ADMIN_EMAIL.
    pub fn from_env() -> Self {
        Self {
            username: non_empty_var("EMAIL_USERNAME"),
            password: non_empty_var("EMAIL_PASSWORD"),
            smtp_server: non_empty_var("SMTP_SERVER")
                .unwrap_or_else(|| DEFAULT_SMTP_SERVER.to_string()),
            smtp_port: env::var("SMTP_PORT")
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            admin_email: non_empty_var("ADMIN_EMAIL"),
        }
    }

    /// Names of the variables that must still be set for reports to be emailed.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.username.is_none() {
            missing.push("EMAIL_USERNAME");
        }
        if self.password.is_none() {
            missing.push("EMAIL_PASSWORD");
        }
        if self.admin_email.is_none() {
            missing.push("ADMIN_EMAIL");
        }
        missing
    }
}
