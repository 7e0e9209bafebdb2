//! Idle re-engagement: a friendly nudge after a stretch of silence, at most once per cool-down.

use std::time::{Duration, Instant};

use bestie_core::ConversationSession;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::info;

pub const DEFAULT_IDLE_THRESHOLD: Duration = Duration::from_secs(60);
pub const DEFAULT_NUDGE_COOLDOWN: Duration = Duration::from_secs(100);

/// Re-engagement messages addressed to `name`.
pub fn nudge_messages(name: &str) -> [String; 5] {
    [
        "Hey there! Still with me? I'd love to chat more about what's on your mind.".to_string(),
        format!("Hi {}! Anything else you'd like to talk about today?", name),
        "I'm here if you want to continue our conversation. What else is on your mind?".to_string(),
        format!(
            "Just checking in! Is there anything else you'd like to discuss, {}?",
            name
        ),
        "Taking a break? I'm here whenever you're ready to chat again!".to_string(),
    ]
}

/// Tracks user activity and decides when a nudge is due. Checked by the host on each tick.
pub struct IdleMonitor<R = StdRng> {
    idle_threshold: Duration,
    cooldown: Duration,
    last_interaction: Instant,
    last_nudge: Option<Instant>,
    rng: R,
}

impl IdleMonitor<StdRng> {
    pub fn new(now: Instant) -> Self {
        Self::with_rng(now, StdRng::from_entropy())
    }
}

impl<R: Rng> IdleMonitor<R> {
    pub fn with_rng(now: Instant, rng: R) -> Self {
        Self {
            idle_threshold: DEFAULT_IDLE_THRESHOLD,
            cooldown: DEFAULT_NUDGE_COOLDOWN,
            last_interaction: now,
            last_nudge: None,
            rng,
        }
    }

    pub fn with_thresholds(mut self, idle_threshold: Duration, cooldown: Duration) -> Self {
        self.idle_threshold = idle_threshold;
        self.cooldown = cooldown;
        self
    }

    pub fn record_interaction(&mut self, now: Instant) {
        self.last_interaction = now;
    }

    /// Forgets previous nudges; used when the session is reset.
    pub fn reset(&mut self, now: Instant) {
        self.last_interaction = now;
        self.last_nudge = None;
    }

    /// Appends a nudge to `session` when the user has been idle longer than the threshold and
    /// the last nudge is older than the cool-down. Returns the appended text.
    pub fn check(&mut self, now: Instant, session: &mut ConversationSession) -> Option<String> {
        let idle = now.saturating_duration_since(self.last_interaction);
        if idle <= self.idle_threshold {
            return None;
        }
        if let Some(last) = self.last_nudge {
            if now.saturating_duration_since(last) <= self.cooldown {
                return None;
            }
        }

        let messages = nudge_messages(session.profile().display_name());
        let message = messages.choose(&mut self.rng)?.clone();
        session.push_assistant(message.clone());
        self.last_nudge = Some(now);
        self.last_interaction = now;
        info!(idle_secs = idle.as_secs(), "Idle nudge sent");
        Some(message)
    }
}
