//! Conversation session: turns, profile and preference log for one interacting user.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::error::VoteError;
use crate::preference::{PreferenceLog, ResponseId};
use crate::profile::UserProfile;
use crate::strategy::{LabelAssignment, OptionLabel, Strategy};
use crate::ASSISTANT_NAME;

/// Candidate reply texts keyed by the strategy that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidates {
    pub conditional: String,
    pub dynamic_context: String,
}

impl Candidates {
    pub fn get(&self, strategy: Strategy) -> &str {
        match strategy {
            Strategy::Conditional => &self.conditional,
            Strategy::DynamicContext => &self.dynamic_context,
        }
    }
}

/// A/B experiment attached to an assistant turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Experiment {
    pub response_id: ResponseId,
    pub responses: Candidates,
    #[serde(flatten)]
    pub assignment: LabelAssignment,
}

impl Experiment {
    /// Candidate text shown behind `label`.
    pub fn text_for(&self, label: OptionLabel) -> &str {
        self.responses.get(self.assignment.strategy_for(label))
    }
}

/// Assistant turn. With an experiment, `content` stays empty until a vote resolves it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssistantTurn {
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub experiment: Option<Experiment>,
}

/// One message exchange unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Turn {
    User {
        content: String,
        timestamp: DateTime<Utc>,
    },
    Assistant(AssistantTurn),
}

impl Turn {
    /// Displayed text (empty for an unresolved experiment).
    pub fn content(&self) -> &str {
        match self {
            Turn::User { content, .. } => content,
            Turn::Assistant(a) => &a.content,
        }
    }

    pub fn is_user(&self) -> bool {
        matches!(self, Turn::User { .. })
    }

    pub fn experiment(&self) -> Option<&Experiment> {
        match self {
            Turn::Assistant(a) => a.experiment.as_ref(),
            Turn::User { .. } => None,
        }
    }
}

/// State of one conversation from onboarding to session end.
#[derive(Debug, Clone)]
pub struct ConversationSession {
    pub conversation_id: Uuid,
    pub user_id: Uuid,
    pub started_at: DateTime<Utc>,
    profile: UserProfile,
    turns: Vec<Turn>,
    preferences: PreferenceLog,
}

impl ConversationSession {
    /// Starts a session with fresh ids and the greeting turn.
    pub fn new(profile: UserProfile) -> Self {
        let greeting = greeting(&profile);
        let mut session = Self {
            conversation_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            started_at: Utc::now(),
            profile,
            turns: Vec::new(),
            preferences: PreferenceLog::new(),
        };
        session.push_assistant(greeting);
        info!(
            conversation_id = %session.conversation_id,
            user_id = %session.user_id,
            "Session started"
        );
        session
    }

    /// Discards all state and starts over with fresh ids for `profile`.
    pub fn reset(&mut self, profile: UserProfile) {
        info!(conversation_id = %self.conversation_id, "Session reset");
        *self = Self::new(profile);
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn preferences(&self) -> &PreferenceLog {
        &self.preferences
    }

    pub fn turn_count(&self) -> usize {
        self.turns.len()
    }

    pub fn vote_count(&self) -> usize {
        self.preferences.len()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.turns.push(Turn::User {
            content: content.into(),
            timestamp: Utc::now(),
        });
    }

    /// Appends a finalized assistant turn.
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.turns.push(Turn::Assistant(AssistantTurn {
            content: content.into(),
            timestamp: Utc::now(),
            experiment: None,
        }));
    }

    /// The experiment still waiting for a vote, if any.
    pub fn pending_experiment(&self) -> Option<&Experiment> {
        self.turns
            .iter()
            .rev()
            .filter_map(Turn::experiment)
            .find(|e| !self.preferences.contains(&e.response_id))
    }

    /// Appends a pending experiment turn and returns its response id.
    ///
    /// Callers must check [`pending_experiment`](Self::pending_experiment) first: at most one
    /// turn may be pending.
    pub fn begin_experiment(
        &mut self,
        responses: Candidates,
        assignment: LabelAssignment,
    ) -> ResponseId {
        debug_assert!(self.pending_experiment().is_none());
        let response_id = ResponseId::new();
        self.turns.push(Turn::Assistant(AssistantTurn {
            content: String::new(),
            timestamp: Utc::now(),
            experiment: Some(Experiment {
                response_id,
                responses,
                assignment,
            }),
        }));
        response_id
    }

    /// Resolves the experiment `response_id` with the strategy behind `label`.
    ///
    /// The turn's displayed content becomes the chosen text; the other text stays in the record.
    /// A second vote for the same id is rejected.
    pub fn resolve(
        &mut self,
        response_id: ResponseId,
        label: OptionLabel,
    ) -> Result<Strategy, VoteError> {
        let turn = self
            .turns
            .iter_mut()
            .find_map(|t| match t {
                Turn::Assistant(a)
                    if a.experiment.as_ref().map(|e| e.response_id) == Some(response_id) =>
                {
                    Some(a)
                }
                _ => None,
            })
            .ok_or(VoteError::UnknownResponse(response_id))?;
        let experiment = turn
            .experiment
            .as_ref()
            .ok_or(VoteError::UnknownResponse(response_id))?;
        let strategy = experiment.assignment.strategy_for(label);
        let chosen = experiment.responses.get(strategy).to_string();

        self.preferences.record(response_id, strategy)?;
        turn.content = chosen;
        info!(%response_id, %label, %strategy, "Preference recorded");
        Ok(strategy)
    }
}

/// First assistant message of every session.
pub fn greeting(profile: &UserProfile) -> String {
    format!(
        "Hi {}! I'm {}, your friendly companion. What's on your mind today?",
        profile.display_name(),
        ASSISTANT_NAME
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> Candidates {
        Candidates {
            conditional: "cond reply".to_string(),
            dynamic_context: "dyn reply".to_string(),
        }
    }

    #[test]
    fn test_new_session_has_greeting() {
        let s = ConversationSession::new(UserProfile::new("Mia"));
        assert_eq!(s.turn_count(), 1);
        assert!(s.turns()[0].content().starts_with("Hi Mia!"));
        assert!(s.pending_experiment().is_none());
    }

    #[test]
    fn test_resolve_sets_content_and_logs() {
        let mut s = ConversationSession::new(UserProfile::new("Mia"));
        s.push_user("hello");
        let id = s.begin_experiment(candidates(), LabelAssignment::new(Strategy::DynamicContext));
        assert_eq!(s.turns().last().unwrap().content(), "");
        assert!(s.pending_experiment().is_some());

        let chosen = s.resolve(id, OptionLabel::B).unwrap();
        assert_eq!(chosen, Strategy::Conditional);
        assert_eq!(s.turns().last().unwrap().content(), "cond reply");
        assert_eq!(s.preferences().get(&id), Some(Strategy::Conditional));
        assert!(s.pending_experiment().is_none());
        // unchosen text kept for audit
        let exp = s.turns().last().unwrap().experiment().unwrap();
        assert_eq!(exp.responses.dynamic_context, "dyn reply");
    }

    #[test]
    fn test_second_vote_is_rejected() {
        let mut s = ConversationSession::new(UserProfile::new("Mia"));
        let id = s.begin_experiment(candidates(), LabelAssignment::new(Strategy::Conditional));
        s.resolve(id, OptionLabel::A).unwrap();
        assert_eq!(
            s.resolve(id, OptionLabel::B),
            Err(VoteError::AlreadyResolved(id))
        );
        assert_eq!(s.vote_count(), 1);
        assert_eq!(s.turns().last().unwrap().content(), "cond reply");
    }

    #[test]
    fn test_unknown_response_id() {
        let mut s = ConversationSession::new(UserProfile::new("Mia"));
        let id = ResponseId::new();
        assert_eq!(s.resolve(id, OptionLabel::A), Err(VoteError::UnknownResponse(id)));
        assert!(s.preferences().is_empty());
    }

    #[test]
    fn test_reset_gives_fresh_ids() {
        let mut s = ConversationSession::new(UserProfile::new("Mia"));
        let old = (s.conversation_id, s.user_id);
        s.push_user("hi");
        s.reset(UserProfile::new("Leo"));
        assert_ne!(old.0, s.conversation_id);
        assert_ne!(old.1, s.user_id);
        assert_eq!(s.turn_count(), 1);
        assert_eq!(s.profile().name, "Leo");
    }

    #[test]
    fn test_turn_json_shape() {
        let mut s = ConversationSession::new(UserProfile::new("Mia"));
        s.push_user("hello");
        let id = s.begin_experiment(candidates(), LabelAssignment::new(Strategy::Conditional));
        let json = serde_json::to_value(s.turns()).unwrap();
        assert_eq!(json[1]["role"], "user");
        assert_eq!(json[2]["role"], "assistant");
        assert_eq!(json[2]["response_id"], id.to_string());
        assert_eq!(json[2]["option_a_tech"], "conditional");
        assert_eq!(json[2]["option_b_tech"], "dynamic_context");
        assert_eq!(json[2]["responses"]["dynamic_context"], "dyn reply");
        assert!(json[0].get("response_id").is_none());
    }
}
