//! End-to-end tests for the terminal chat loop with scripted input, a mock gateway and a mock
//! mailer. Files go to a temporary directory.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bestie_cli::{App, Terminal};
use bestie_core::UserProfile;
use experiment::ExperimentController;
use llm_client::{CompletionGateway, GatewayError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use storage::{DeliveryError, EmailReport, ReportMailer, SessionStore};

const CONDITIONAL_MARKER: &str = "IF user is sharing personal experiences";

struct EchoGateway;

#[async_trait]
impl CompletionGateway for EchoGateway {
    async fn complete(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<String, GatewayError> {
        if system_prompt.contains(CONDITIONAL_MARKER) {
            Ok(format!("conditional reply to: {}", user_message))
        } else {
            Ok(format!("dynamic reply to: {}", user_message))
        }
    }
}

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<EmailReport>>,
}

#[async_trait]
impl ReportMailer for RecordingMailer {
    async fn send(&self, report: &EmailReport) -> Result<(), DeliveryError> {
        self.sent.lock().unwrap().push(report.clone());
        Ok(())
    }
}

fn controller() -> ExperimentController {
    ExperimentController::with_rng(Arc::new(EchoGateway), StdRng::seed_from_u64(7))
}

fn output<R, W>(app: &App<R, W>) -> String
where
    R: tokio::io::AsyncBufRead + Unpin,
    W: std::io::Write + AsRef<[u8]>,
{
    String::from_utf8_lossy(app.terminal().output().as_ref()).into_owned()
}

/// **Test: message, vote, stats, end with feedback, then quit.**
///
/// **Setup:** Profile given up front (no onboarding questions); mailer records sends.
/// **Expected:** Both options shown, the vote is acknowledged, stats show one rated response at
/// 100%, the JSON file exists and one report email is sent.
#[tokio::test]
async fn test_full_session_with_profile() {
    let dir = tempfile::tempdir().unwrap();
    let mailer = Arc::new(RecordingMailer::default());
    let store = SessionStore::new(dir.path())
        .with_mailer(mailer.clone(), Some("admin@example.com".to_string()));

    let input: &[u8] = b"I started a new job\n/b\n/stats\n/end\nLoved it\n/quit\n";
    let mut app = App::new(Terminal::new(input, Vec::new()), controller(), store)
        .with_profile(UserProfile::new("Rae"));
    app.run().await.unwrap();

    let out = output(&app);
    assert!(out.contains("Hi Rae! I'm BestieAI"));
    assert!(out.contains("--- Option A ---"));
    assert!(out.contains("conditional reply to: I started a new job"));
    assert!(out.contains("dynamic reply to: I started a new job"));
    assert!(out.contains("Preference saved: Option B"));
    assert!(out.contains("Response style preferences (1 rated):"));
    assert!(out.contains("(100.0%)"));
    assert!(out.contains("Email report sent."));
    assert!(out.trim_end().ends_with("Goodbye!"));

    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].subject.contains("User: Rae"));

    let json_files = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().map_or(false, |x| x == "json"))
        .count();
    assert_eq!(json_files, 1);
    assert!(dir.path().join("preferences_summary.csv").exists());
}

/// **Test: a second message is refused while a vote is pending; a vote with nothing pending is
/// refused too.**
#[tokio::test]
async fn test_pending_turn_blocks_new_message() {
    let dir = tempfile::tempdir().unwrap();
    let input: &[u8] = b"/a\nfirst\nsecond\n/a\n/a\n/quit\n";
    let mut app = App::new(
        Terminal::new(input, Vec::new()),
        controller(),
        SessionStore::new(dir.path()),
    )
    .with_profile(UserProfile::new("Rae"));
    app.run().await.unwrap();

    let out = output(&app);
    assert_eq!(out.matches("No response is waiting for a vote").count(), 2);
    assert!(out.contains("Please choose a preferred response first"));
    assert!(!out.contains("reply to: second"));
    assert_eq!(out.matches("Preference saved").count(), 1);
}

/// **Test: interactive onboarding, then end of input.**
#[tokio::test]
async fn test_onboarding_then_eof() {
    let dir = tempfile::tempdir().unwrap();
    let input: &[u8] = b"Jordan\nJo\n\n\n\n\n\n\n\n/help\n";
    let mut app = App::new(
        Terminal::new(input, Vec::new()),
        controller(),
        SessionStore::new(dir.path()),
    );
    app.run().await.unwrap();

    let out = output(&app);
    assert!(out.contains("What's your name?"));
    assert!(out.contains("Hi Jo! I'm BestieAI"));
    assert!(out.contains("/profile"));
    assert!(out.contains("Goodbye!"));
}

/// **Test: /end without a mailer still saves and reports why no email went out.**
#[tokio::test]
async fn test_end_without_mailer() {
    let dir = tempfile::tempdir().unwrap();
    let input: &[u8] = b"/end\n\n/quit\n";
    let mut app = App::new(
        Terminal::new(input, Vec::new()),
        controller(),
        SessionStore::new(dir.path()),
    )
    .with_profile(UserProfile::new("Rae"));
    app.run().await.unwrap();

    let out = output(&app);
    assert!(out.contains("Conversation saved to"));
    assert!(out.contains("preferred style: None"));
    assert!(out.contains("Email report skipped: ADMIN_EMAIL not set."));
}

/// **Test: a failed save keeps the conversation open.**
///
/// **Setup:** The data directory sits below a regular file.
/// **Expected:** The save error is shown, no goodbye from `/end`, and the earlier vote is still
/// counted by `/stats`.
#[tokio::test]
async fn test_end_with_unwritable_data_dir_keeps_session() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "file").unwrap();

    let input: &[u8] = b"hello\n/a\n/end\nfb\n/stats\n/quit\n";
    let mut app = App::new(
        Terminal::new(input, Vec::new()),
        controller(),
        SessionStore::new(blocker.join("sub")),
    )
    .with_profile(UserProfile::new("Rae"));
    app.run().await.unwrap();

    let out = output(&app);
    assert!(out.contains("Could not save the conversation"));
    assert!(!out.contains("Starting a new conversation"));
    assert!(out.contains("Response style preferences (1 rated):"));
}

const LEO_ANSWERS: &str = "Leo\n\n\n\n\n\n\n\n\n";

/// **Test: /profile discards the running session without saving it.**
///
/// **Expected:** The new greeting uses the new name, the earlier vote is gone and nothing is
/// written to disk.
#[tokio::test]
async fn test_profile_update_discards_session() {
    let dir = tempfile::tempdir().unwrap();
    let mailer = Arc::new(RecordingMailer::default());
    let store = SessionStore::new(dir.path())
        .with_mailer(mailer.clone(), Some("admin@example.com".to_string()));

    let input = format!("hello\n/a\n/profile\n{}/stats\n/quit\n", LEO_ANSWERS);
    let mut app = App::new(Terminal::new(input.as_bytes(), Vec::new()), controller(), store)
        .with_profile(UserProfile::new("Rae"));
    app.run().await.unwrap();

    let out = output(&app);
    assert!(out.contains("Hi Leo! I'm BestieAI"));
    assert!(out.contains("No preferences recorded yet."));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    assert!(mailer.sent.lock().unwrap().is_empty());
}

/// **Test: the profile entered through /profile is the one reused after /end.**
#[tokio::test]
async fn test_profile_update_replaces_saved_profile() {
    let dir = tempfile::tempdir().unwrap();
    let input = format!("/profile\n{}/end\nfb\n/quit\n", LEO_ANSWERS);
    let mut app = App::new(
        Terminal::new(input.as_bytes(), Vec::new()),
        controller(),
        SessionStore::new(dir.path()),
    )
    .with_profile(UserProfile::new("Rae"));
    app.run().await.unwrap();

    let out = output(&app);
    assert_eq!(out.matches("Hi Rae!").count(), 1);
    assert_eq!(out.matches("Hi Leo! I'm BestieAI").count(), 2);

    let summary = std::fs::read_to_string(dir.path().join("preferences_summary.csv")).unwrap();
    assert!(summary.contains("Leo"));
    assert!(!summary.contains("Rae"));
}
