//! Terminal chat loop: routes input lines to the experiment, runs idle nudges on a timer tick and
//! ends sessions through the session store.

use std::io::Write;
use std::time::{Duration, Instant};

use anyhow::Result;
use bestie_core::{ConversationSession, OptionLabel, UserProfile, ASSISTANT_NAME};
use experiment::{compute_stats, ExperimentController, ExperimentError, IdleMonitor};
use storage::{ReportOutcome, SessionStore};
use tokio::io::AsyncBufRead;
use tokio::time::{interval_at, MissedTickBehavior};
use tracing::{info, warn};

use crate::onboarding::collect_profile;
use crate::terminal::Terminal;

/// How often the idle monitor is checked.
pub const TICK_INTERVAL: Duration = Duration::from_secs(5);

const HELP: &str = "Commands:
  <text>     send a message
  /a, /b     choose Option A or Option B for the last reply
  /stats     show your response-style preferences so far
  /profile   update your profile (starts a new conversation, nothing is saved)
  /end       leave feedback, save the conversation and start over
  /help      show this help
  /quit      exit";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Message(String),
    Vote(OptionLabel),
    Stats,
    Profile,
    End,
    Help,
    Quit,
    Unknown(String),
    Empty,
}

impl Input {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Input::Empty;
        }
        if !line.starts_with('/') {
            return Input::Message(line.to_string());
        }
        match line.to_ascii_lowercase().as_str() {
            "/a" => Input::Vote(OptionLabel::A),
            "/b" => Input::Vote(OptionLabel::B),
            "/stats" => Input::Stats,
            "/profile" => Input::Profile,
            "/end" => Input::End,
            "/help" => Input::Help,
            "/quit" | "/exit" => Input::Quit,
            _ => Input::Unknown(line.to_string()),
        }
    }
}

enum Flow {
    Continue,
    Quit,
}

pub struct App<R, W> {
    term: Terminal<R, W>,
    controller: ExperimentController,
    store: SessionStore,
    monitor: IdleMonitor,
    saved_profile: Option<UserProfile>,
}

impl<R: AsyncBufRead + Unpin, W: Write> App<R, W> {
    pub fn new(term: Terminal<R, W>, controller: ExperimentController, store: SessionStore) -> Self {
        Self {
            term,
            controller,
            store,
            monitor: IdleMonitor::new(Instant::now()),
            saved_profile: None,
        }
    }

    pub fn with_idle_monitor(mut self, monitor: IdleMonitor) -> Self {
        self.monitor = monitor;
        self
    }

    /// Profile used instead of onboarding questions at startup and after `/end`.
    pub fn with_profile(mut self, profile: UserProfile) -> Self {
        self.saved_profile = Some(profile);
        self
    }

    pub fn terminal(&self) -> &Terminal<R, W> {
        &self.term
    }

    async fn onboard(&mut self) -> Result<Option<UserProfile>> {
        match &self.saved_profile {
            Some(profile) => Ok(Some(profile.clone())),
            None => collect_profile(&mut self.term).await,
        }
    }

    /// Shows the greeting of a fresh session and restarts idle tracking.
    fn greet(&mut self, session: &ConversationSession) -> Result<()> {
        self.monitor.reset(Instant::now());
        if let Some(greeting) = session.turns().first() {
            self.term
                .say(format!("\n{}: {}", ASSISTANT_NAME, greeting.content()))?;
        }
        self.term.say("(type /help for commands)")?;
        Ok(())
    }

    /// Runs until `/quit` or end of input.
    pub async fn run(&mut self) -> Result<()> {
        let Some(profile) = self.onboard().await? else {
            return Ok(());
        };
        let mut session = ConversationSession::new(profile);
        self.greet(&session)?;

        let mut ticker = interval_at(tokio::time::Instant::now() + TICK_INTERVAL, TICK_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                line = self.term.next_line() => {
                    let Some(line) = line? else { break };
                    match self.handle_line(&mut session, &line).await? {
                        Flow::Continue => {}
                        Flow::Quit => break,
                    }
                }
                _ = ticker.tick() => {
                    if let Some(nudge) = self.monitor.check(Instant::now(), &mut session) {
                        self.term.say(format!("\n{}: {}", ASSISTANT_NAME, nudge))?;
                    }
                }
            }
        }
        self.term.say("Goodbye!")?;
        Ok(())
    }

    async fn handle_line(&mut self, session: &mut ConversationSession, line: &str) -> Result<Flow> {
        let input = Input::parse(line);
        if !matches!(input, Input::Empty) {
            self.monitor.record_interaction(Instant::now());
        }
        match input {
            Input::Empty => {}
            Input::Message(text) => self.send_message(session, &text).await?,
            Input::Vote(label) => self.vote(session, label)?,
            Input::Stats => self.show_stats(session)?,
            Input::Help => self.term.say(HELP)?,
            Input::Unknown(cmd) => self
                .term
                .say(format!("Unknown command {}. Type /help for commands.", cmd))?,
            Input::Quit => return Ok(Flow::Quit),
            Input::Profile => {
                info!(conversation_id = %session.conversation_id, "Profile update; session discarded");
                let Some(profile) = collect_profile(&mut self.term).await? else {
                    return Ok(Flow::Quit);
                };
                if self.saved_profile.is_some() {
                    self.saved_profile = Some(profile.clone());
                }
                session.reset(profile);
                self.greet(session)?;
            }
            Input::End => {
                if !self.end_session(session).await? {
                    return Ok(Flow::Continue);
                }
                let Some(profile) = self.onboard().await? else {
                    return Ok(Flow::Quit);
                };
                session.reset(profile);
                self.greet(session)?;
            }
        }
        Ok(Flow::Continue)
    }

    async fn send_message(&mut self, session: &mut ConversationSession, text: &str) -> Result<()> {
        self.term.say("Thinking...")?;
        match self.controller.submit_message(session, text).await {
            Ok(_) => {
                if let Some(experiment) = session.pending_experiment() {
                    self.term.say(format!(
                        "\n--- Option A ---\n{}\n\n--- Option B ---\n{}\n\nWhich response do you prefer? (/a or /b)",
                        experiment.text_for(OptionLabel::A),
                        experiment.text_for(OptionLabel::B)
                    ))?;
                }
            }
            Err(ExperimentError::TurnPending(_)) => self.term.say(
                "Please choose a preferred response first (/a or /b) before sending another message.",
            )?,
            Err(e) => self.term.say(e.to_string())?,
        }
        Ok(())
    }

    fn vote(&mut self, session: &mut ConversationSession, label: OptionLabel) -> Result<()> {
        let chosen = session
            .pending_experiment()
            .map(|e| e.text_for(label).to_string());
        match self.controller.vote(session, label) {
            Ok(_) => {
                self.term.say(format!("Preference saved: {}", label))?;
                if let Some(text) = chosen {
                    self.term.say(format!("\n{}: {}", ASSISTANT_NAME, text))?;
                }
            }
            Err(e) => self.term.say(e.to_string())?,
        }
        Ok(())
    }

    fn show_stats(&mut self, session: &ConversationSession) -> Result<()> {
        let stats = compute_stats(session.preferences());
        if stats.total == 0 {
            self.term.say("No preferences recorded yet.")?;
            return Ok(());
        }
        self.term.say(format!(
            "Response style preferences ({} rated):",
            stats.total
        ))?;
        for line in stats.summary_lines() {
            self.term.say(format!("- {}", line))?;
        }
        self.term
            .say(format!("Preferred style: {}", stats.dominant_label()))?;
        Ok(())
    }

    /// Asks for feedback and persists the session. `false` when saving failed and the session
    /// stays open.
    async fn end_session(&mut self, session: &ConversationSession) -> Result<bool> {
        let feedback = self
            .term
            .ask("Please share what you liked, what could be improved, or what's missing:")
            .await?
            .unwrap_or_default();
        let stats = compute_stats(session.preferences());

        let result = match self.store.persist(session, &stats, &feedback, true).await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "Persist failed");
                self.term
                    .say(format!("Could not save the conversation: {}", e))?;
                return Ok(false);
            }
        };

        self.term.say(format!(
            "Conversation saved to {}.\nMessages: {}, responses rated: {}, preferred style: {}",
            result.json_path.display(),
            session.turn_count(),
            session.vote_count(),
            stats.dominant_label()
        ))?;
        let status = match &result.report {
            ReportOutcome::Sent => "Email report sent.".to_string(),
            ReportOutcome::Failed(e) => format!("Email report failed: {}", e),
            ReportOutcome::NoRecipient => "Email report skipped: ADMIN_EMAIL not set.".to_string(),
            ReportOutcome::MailerUnavailable => {
                "Email report skipped: email credentials not configured.".to_string()
            }
            ReportOutcome::NotRequested => "Email report not requested.".to_string(),
        };
        self.term.say(status)?;
        self.term.say("Thank you! Starting a new conversation.")?;
        Ok(true)
    }
}
