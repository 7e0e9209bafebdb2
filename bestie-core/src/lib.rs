//! # bestie-core
//!
//! Core types for the BestieAI preference experiment: [`UserProfile`], the two prompt
//! [`Strategy`] variants, A/B [`LabelAssignment`], conversation [`Turn`]s, the
//! [`PreferenceLog`] and the [`ConversationSession`] that ties them together.
//! Also owns tracing initialization. Transport-agnostic; used by every other crate.

pub mod error;
pub mod logger;
pub mod preference;
pub mod profile;
pub mod session;
pub mod strategy;

pub use error::{ProfileError, VoteError};
pub use logger::init_tracing;
pub use preference::{PreferenceLog, ResponseId};
pub use profile::{
    parse_list, EmotionalState, UserProfile, COMMUNICATION_STYLES, INTEREST_OPTIONS,
};
pub use session::{AssistantTurn, Candidates, ConversationSession, Experiment, Turn};
pub use strategy::{LabelAssignment, OptionLabel, Strategy};

/// Assistant persona name, used in greetings, transcripts and reports.
pub const ASSISTANT_NAME: &str = "BestieAI";
