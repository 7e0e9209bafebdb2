//! Per-conversation JSON document.
//!
//! Written once per session end to `conversation_{conversation_id}.json`.

use std::collections::BTreeMap;

use bestie_core::{ConversationSession, PreferenceLog, Strategy, Turn, UserProfile};
use chrono::{DateTime, Utc};
use experiment::PreferenceStats;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct ConversationRecord<'a> {
    pub conversation_id: Uuid,
    pub user_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub conversation_history: &'a [Turn],
    pub preferred_technique: Option<Strategy>,
    pub technique_percentages: &'a BTreeMap<Strategy, f64>,
    pub user_profile: &'a UserProfile,
    pub total_responses: usize,
    pub detailed_preferences: &'a PreferenceLog,
    pub feedback: &'a str,
}

impl<'a> ConversationRecord<'a> {
    pub fn new(
        session: &'a ConversationSession,
        stats: &'a PreferenceStats,
        feedback: &'a str,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            conversation_id: session.conversation_id,
            user_id: session.user_id,
            timestamp,
            conversation_history: session.turns(),
            preferred_technique: stats.dominant,
            technique_percentages: &stats.percentages,
            user_profile: session.profile(),
            total_responses: stats.total,
            detailed_preferences: session.preferences(),
            feedback,
        }
    }
}
