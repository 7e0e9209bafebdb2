//! Experiment controller: one pending A/B experiment per user turn.

use std::sync::Arc;

use bestie_core::{
    Candidates, ConversationSession, LabelAssignment, OptionLabel, ResponseId, Strategy,
    VoteError,
};
use llm_client::{error_reply, CompletionGateway, GatewayError};
use prompt::{build_prompt, render_context, CONTEXT_WINDOW};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, instrument, warn};

use crate::error::ExperimentError;

/// Runs the two-strategy experiment for each user message of a session.
pub struct ExperimentController<R = StdRng> {
    gateway: Arc<dyn CompletionGateway>,
    rng: R,
}

impl ExperimentController<StdRng> {
    pub fn new(gateway: Arc<dyn CompletionGateway>) -> Self {
        Self::with_rng(gateway, StdRng::from_entropy())
    }
}

impl<R: Rng> ExperimentController<R> {
    /// Controller drawing label assignments from `rng` (seed it for deterministic tests).
    pub fn with_rng(gateway: Arc<dyn CompletionGateway>, rng: R) -> Self {
        Self { gateway, rng }
    }

    /// Appends the user message and a pending experiment turn; returns its response id.
    ///
    /// Rejected without touching the session when `text` is blank or a previous turn is still
    /// pending. Both prompts are built from the same context snapshot and both gateway calls
    /// complete before the turn is appended. A failed call fills its slot with the error text.
    #[instrument(skip(self, session, text), fields(conversation_id = %session.conversation_id))]
    pub async fn submit_message(
        &mut self,
        session: &mut ConversationSession,
        text: &str,
    ) -> Result<ResponseId, ExperimentError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ExperimentError::EmptyMessage);
        }
        if let Some(pending) = session.pending_experiment() {
            info!(response_id = %pending.response_id, "Message ignored: vote pending");
            return Err(ExperimentError::TurnPending(pending.response_id));
        }

        session.push_user(text);
        let context = render_context(session.turns(), CONTEXT_WINDOW);
        let conditional_prompt = build_prompt(Strategy::Conditional, session.profile(), &context);
        let dynamic_prompt = build_prompt(Strategy::DynamicContext, session.profile(), &context);

        let (conditional, dynamic_context) = tokio::join!(
            self.gateway.complete(&conditional_prompt, text),
            self.gateway.complete(&dynamic_prompt, text),
        );
        let responses = Candidates {
            conditional: reply_or_error(Strategy::Conditional, conditional),
            dynamic_context: reply_or_error(Strategy::DynamicContext, dynamic_context),
        };

        let assignment = LabelAssignment::random(&mut self.rng);
        let response_id = session.begin_experiment(responses, assignment);
        info!(
            %response_id,
            conditional = %assignment.label_for(Strategy::Conditional),
            "Experiment pending"
        );
        Ok(response_id)
    }

    /// Resolves the pending experiment with the strategy behind `label`.
    pub fn vote(
        &self,
        session: &mut ConversationSession,
        label: OptionLabel,
    ) -> Result<Strategy, ExperimentError> {
        let response_id = session
            .pending_experiment()
            .map(|e| e.response_id)
            .ok_or(VoteError::NothingPending)?;
        Ok(session.resolve(response_id, label)?)
    }
}

fn reply_or_error(strategy: Strategy, result: Result<String, GatewayError>) -> String {
    result.unwrap_or_else(|e| {
        warn!(%strategy, error = %e, "Completion failed; showing error text");
        error_reply(&e)
    })
}
