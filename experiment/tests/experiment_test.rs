//! Integration tests for the experiment loop.
//!
//! Uses a scripted CompletionGateway (no network) and seeded StdRng for label assignment.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bestie_core::{OptionLabel, Strategy, UserProfile, VoteError, ConversationSession, LabelAssignment};
use experiment::{compute_stats, ExperimentController, ExperimentError};
use llm_client::{CompletionGateway, GatewayError};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Marker only present in the conditional prompt template.
const CONDITIONAL_MARKER: &str = "IF user is sharing personal experiences";

/// Mock gateway: answers per strategy, can fail one of them, records every call.
#[derive(Default)]
struct ScriptedGateway {
    fail_conditional: bool,
    fail_dynamic: bool,
    calls: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl CompletionGateway for ScriptedGateway {
    async fn complete(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<String, GatewayError> {
        self.calls
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), user_message.to_string()));
        if system_prompt.contains(CONDITIONAL_MARKER) {
            if self.fail_conditional {
                return Err(GatewayError::Api("rate limit exceeded".to_string()));
            }
            Ok(format!("conditional reply to: {}", user_message))
        } else {
            if self.fail_dynamic {
                return Err(GatewayError::Api("connection reset".to_string()));
            }
            Ok(format!("dynamic reply to: {}", user_message))
        }
    }
}

fn traveller() -> UserProfile {
    let mut p = UserProfile::new("Jordan");
    p.top_interests = vec!["Music".to_string(), "Travel".to_string()];
    p
}

/// First seed whose first draw puts `strategy` behind Option B.
fn seed_with_option_b(strategy: Strategy) -> u64 {
    (0..)
        .find(|&seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            LabelAssignment::random(&mut rng).strategy_for(OptionLabel::B) == strategy
        })
        .unwrap()
}

/// **Test: End-to-end: message → two calls → vote Option B (conditional) → 100% conditional.**
#[tokio::test]
async fn end_to_end_vote_for_conditional() {
    let gateway = Arc::new(ScriptedGateway::default());
    let seed = seed_with_option_b(Strategy::Conditional);
    let mut controller = ExperimentController::with_rng(gateway.clone(), StdRng::seed_from_u64(seed));
    let mut session = ConversationSession::new(traveller());

    let id = controller
        .submit_message(&mut session, "I'm nervous about my trip tomorrow")
        .await
        .unwrap();
    assert_eq!(gateway.calls.lock().unwrap().len(), 2);

    let pending = session.pending_experiment().unwrap();
    assert_eq!(pending.response_id, id);
    assert_eq!(pending.assignment.strategy_for(OptionLabel::B), Strategy::Conditional);
    assert_eq!(
        pending.text_for(OptionLabel::B),
        "conditional reply to: I'm nervous about my trip tomorrow"
    );

    let chosen = controller.vote(&mut session, OptionLabel::B).unwrap();
    assert_eq!(chosen, Strategy::Conditional);
    assert_eq!(session.preferences().len(), 1);
    assert_eq!(session.preferences().get(&id), Some(Strategy::Conditional));

    let stats = compute_stats(session.preferences());
    assert_eq!(stats.percentage(Strategy::Conditional), 100.0);
    assert_eq!(stats.percentage(Strategy::DynamicContext), 0.0);
    assert_eq!(stats.dominant, Some(Strategy::Conditional));
}

/// **Test: Both prompts see the same context, which includes the new user message.**
#[tokio::test]
async fn both_strategies_share_context_snapshot() {
    let gateway = Arc::new(ScriptedGateway::default());
    let mut controller = ExperimentController::with_rng(gateway.clone(), StdRng::seed_from_u64(3));
    let mut session = ConversationSession::new(traveller());

    controller.submit_message(&mut session, "hello there").await.unwrap();

    let calls = gateway.calls.lock().unwrap();
    let expected = "User: hello there";
    assert!(calls.iter().all(|(prompt, msg)| prompt.contains(expected) && msg == "hello there"));
    assert_eq!(calls.iter().filter(|(p, _)| p.contains(CONDITIONAL_MARKER)).count(), 1);
}

/// **Test: A second message while a turn is pending is not appended and makes no calls.**
#[tokio::test]
async fn only_one_pending_turn() {
    let gateway = Arc::new(ScriptedGateway::default());
    let mut controller = ExperimentController::with_rng(gateway.clone(), StdRng::seed_from_u64(5));
    let mut session = ConversationSession::new(traveller());

    let id = controller.submit_message(&mut session, "first").await.unwrap();
    let turns_before = session.turn_count();

    let err = controller.submit_message(&mut session, "second").await.unwrap_err();
    assert_eq!(err, ExperimentError::TurnPending(id));
    assert_eq!(session.turn_count(), turns_before);
    assert_eq!(gateway.calls.lock().unwrap().len(), 2);

    controller.vote(&mut session, OptionLabel::A).unwrap();
    controller.submit_message(&mut session, "second").await.unwrap();
    assert_eq!(session.turn_count(), turns_before + 2);
}

/// **Test: Blank messages are rejected.**
#[tokio::test]
async fn blank_message_rejected() {
    let gateway = Arc::new(ScriptedGateway::default());
    let mut controller = ExperimentController::with_rng(gateway, StdRng::seed_from_u64(5));
    let mut session = ConversationSession::new(traveller());
    assert_eq!(
        controller.submit_message(&mut session, "   ").await.unwrap_err(),
        ExperimentError::EmptyMessage
    );
    assert_eq!(session.turn_count(), 1);
}

/// **Test: A/B mapping is re-randomized per turn with roughly equal frequency.**
#[tokio::test]
async fn assignment_randomized_per_turn() {
    let gateway = Arc::new(ScriptedGateway::default());
    let mut controller = ExperimentController::with_rng(gateway, StdRng::seed_from_u64(2024));
    let mut session = ConversationSession::new(traveller());

    let turns = 400;
    let mut conditional_on_a = 0;
    for i in 0..turns {
        controller
            .submit_message(&mut session, &format!("message {}", i))
            .await
            .unwrap();
        if session
            .pending_experiment()
            .unwrap()
            .assignment
            .strategy_for(OptionLabel::A)
            == Strategy::Conditional
        {
            conditional_on_a += 1;
        }
        controller.vote(&mut session, OptionLabel::A).unwrap();
    }
    let conditional_on_b = turns - conditional_on_a;
    assert!(conditional_on_a > 140 && conditional_on_b > 140, "{} / {}", conditional_on_a, conditional_on_b);
}

/// **Test: Voting twice for one response does not add a second entry.**
#[tokio::test]
async fn second_vote_is_rejected() {
    let gateway = Arc::new(ScriptedGateway::default());
    let mut controller = ExperimentController::with_rng(gateway, StdRng::seed_from_u64(9));
    let mut session = ConversationSession::new(traveller());

    let id = controller.submit_message(&mut session, "hi").await.unwrap();
    let first = controller.vote(&mut session, OptionLabel::A).unwrap();

    assert_eq!(
        session.resolve(id, OptionLabel::B),
        Err(VoteError::AlreadyResolved(id))
    );
    assert_eq!(
        controller.vote(&mut session, OptionLabel::B).unwrap_err(),
        ExperimentError::Vote(VoteError::NothingPending)
    );
    assert_eq!(session.preferences().len(), 1);
    assert_eq!(session.preferences().get(&id), Some(first));
}

/// **Test: One failed strategy still yields a pending turn that can be voted on.**
#[tokio::test]
async fn gateway_failure_fills_slot_with_error_text() {
    let gateway = Arc::new(ScriptedGateway {
        fail_dynamic: true,
        ..Default::default()
    });
    let mut controller = ExperimentController::with_rng(gateway, StdRng::seed_from_u64(11));
    let mut session = ConversationSession::new(traveller());

    let id = controller.submit_message(&mut session, "hi").await.unwrap();
    let pending = session.pending_experiment().unwrap();
    assert_eq!(pending.responses.dynamic_context, "Error: connection reset");
    assert_eq!(pending.responses.conditional, "conditional reply to: hi");

    let label = pending.assignment.label_for(Strategy::DynamicContext);
    let chosen = controller.vote(&mut session, label).unwrap();
    assert_eq!(chosen, Strategy::DynamicContext);
    assert_eq!(session.preferences().get(&id), Some(Strategy::DynamicContext));
    assert_eq!(session.turns().last().unwrap().content(), "Error: connection reset");
}

/// **Test: Missing credential surfaces as inline text in both slots.**
#[tokio::test]
async fn missing_credential_is_inline_text() {
    let gateway = Arc::new(llm_client::OpenAIGateway::unconfigured());
    let mut controller = ExperimentController::with_rng(gateway, StdRng::seed_from_u64(1));
    let mut session = ConversationSession::new(traveller());

    controller.submit_message(&mut session, "hi").await.unwrap();
    let pending = session.pending_experiment().unwrap();
    assert!(pending.responses.conditional.starts_with("Error: OpenAI API key not found"));
    assert_eq!(pending.responses.conditional, pending.responses.dynamic_context);
}
