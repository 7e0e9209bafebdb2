//! One row of the cumulative CSV summary.

use bestie_core::{ConversationSession, Strategy};
use chrono::{DateTime, Utc};
use experiment::PreferenceStats;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub conversation_id: Uuid,
    pub user_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub preferred_technique: Option<Strategy>,
    pub conditional_percentage: f64,
    pub dynamic_context_percentage: f64,
    pub conversation_length: usize,
    pub total_responses: usize,
    pub user_name: String,
    pub communication_style: String,
    pub feedback: String,
}

impl SummaryRow {
    pub fn new(
        session: &ConversationSession,
        stats: &PreferenceStats,
        feedback: &str,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            conversation_id: session.conversation_id,
            user_id: session.user_id,
            timestamp,
            preferred_technique: stats.dominant,
            conditional_percentage: stats.percentage(Strategy::Conditional),
            dynamic_context_percentage: stats.percentage(Strategy::DynamicContext),
            conversation_length: session.turn_count(),
            total_responses: stats.total,
            user_name: session.profile().name.clone(),
            communication_style: session.profile().communication_style.clone(),
            feedback: feedback.to_string(),
        }
    }
}
