//! Application configuration aggregated from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use experiment::{DEFAULT_IDLE_THRESHOLD, DEFAULT_NUDGE_COOLDOWN};
use llm_client::{EnvLlmConfig, LlmConfig};
use storage::MailConfig;

pub const DEFAULT_DATA_DIR: &str = "conversation_data";
pub const DEFAULT_LOG_FILE: &str = "logs/bestie.log";

/// Everything the terminal host needs; loaded once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub llm: EnvLlmConfig,
    pub mail: MailConfig,
    pub data_dir: PathBuf,
    pub log_file: String,
    pub idle_threshold: Duration,
    pub nudge_cooldown: Duration,
}

fn secs_var(key: &str, default: Duration) -> Duration {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}

impl AppConfig {
    /// Loads from the environment. `data_dir` overrides DATA_DIR.
    pub fn load(data_dir: Option<PathBuf>) -> Self {
        let data_dir = data_dir.unwrap_or_else(|| {
            PathBuf::from(env::var("DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string()))
        });
        Self {
            llm: EnvLlmConfig::from_env(),
            mail: MailConfig::from_env(),
            data_dir,
            log_file: env::var("LOG_FILE").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string()),
            idle_threshold: secs_var("IDLE_NUDGE_SECS", DEFAULT_IDLE_THRESHOLD),
            nudge_cooldown: secs_var("NUDGE_COOLDOWN_SECS", DEFAULT_NUDGE_COOLDOWN),
        }
    }

    /// Startup warnings for optional features that are not configured.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.llm.api_key().is_none() {
            warnings.push(
                "OpenAI API key not found. Please set OPENAI_API_KEY in your environment variables or .env file. Replies will show the configuration error."
                    .to_string(),
            );
        }
        let missing = self.mail.missing_fields();
        if !missing.is_empty() {
            warnings.push(format!(
                "Email reports disabled; missing {}.",
                missing.join(", ")
            ));
        }
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const KEYS: [&str; 12] = [
        "OPENAI_API_KEY",
        "OPENAI_BASE_URL",
        "MODEL",
        "EMAIL_USERNAME",
        "EMAIL_PASSWORD",
        "SMTP_SERVER",
        "SMTP_PORT",
        "ADMIN_EMAIL",
        "DATA_DIR",
        "LOG_FILE",
        "IDLE_NUDGE_SECS",
        "NUDGE_COOLDOWN_SECS",
    ];

    fn clear() {
        for key in KEYS {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_load_defaults() {
        clear();
        let config = AppConfig::load(None);

        assert_eq!(config.data_dir, PathBuf::from("conversation_data"));
        assert_eq!(config.log_file, "logs/bestie.log");
        assert_eq!(config.idle_threshold, Duration::from_secs(60));
        assert_eq!(config.nudge_cooldown, Duration::from_secs(100));
        assert_eq!(config.llm.model(), "gpt-4o-mini");
        assert!(config.llm.api_key().is_none());
        assert_eq!(config.mail.smtp_port, 587);

        let warnings = config.warnings();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("OPENAI_API_KEY"));
        assert!(warnings[1].contains("ADMIN_EMAIL"));
    }

    #[test]
    #[serial]
    fn test_load_custom_values() {
        clear();
        env::set_var("OPENAI_API_KEY", "sk-test-key-123456");
        env::set_var("MODEL", "gpt-4o");
        env::set_var("EMAIL_USERNAME", "bot@example.com");
        env::set_var("EMAIL_PASSWORD", "pw");
        env::set_var("ADMIN_EMAIL", "admin@example.com");
        env::set_var("DATA_DIR", "/tmp/bestie-data");
        env::set_var("LOG_FILE", "/tmp/bestie.log");
        env::set_var("IDLE_NUDGE_SECS", "5");
        env::set_var("NUDGE_COOLDOWN_SECS", "10");

        let config = AppConfig::load(None);

        assert_eq!(config.llm.api_key(), Some("sk-test-key-123456"));
        assert_eq!(config.llm.model(), "gpt-4o");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/bestie-data"));
        assert_eq!(config.log_file, "/tmp/bestie.log");
        assert_eq!(config.idle_threshold, Duration::from_secs(5));
        assert_eq!(config.nudge_cooldown, Duration::from_secs(10));
        assert!(config.warnings().is_empty());
        clear();
    }

    #[test]
    #[serial]
    fn test_data_dir_argument_overrides_env() {
        clear();
        env::set_var("DATA_DIR", "from-env");
        let config = AppConfig::load(Some(PathBuf::from("from-arg")));
        assert_eq!(config.data_dir, PathBuf::from("from-arg"));
        clear();
    }

    #[test]
    #[serial]
    fn test_invalid_seconds_fall_back() {
        clear();
        env::set_var("IDLE_NUDGE_SECS", "soon");
        let config = AppConfig::load(None);
        assert_eq!(config.idle_threshold, Duration::from_secs(60));
        clear();
    }
}
