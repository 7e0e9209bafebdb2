//! # experiment
//!
//! The A/B prompt-preference loop:
//!
//! - [`ExperimentController`] – per user turn, asks the gateway once per [`Strategy`], shuffles
//!   the two replies behind "Option A"/"Option B" and resolves the user's vote.
//! - [`compute_stats`] – folds the preference log into counts, percentages and the dominant
//!   strategy.
//! - [`IdleMonitor`] – appends a re-engagement message after a period of silence.
//!
//! [`Strategy`]: bestie_core::Strategy

mod controller;
mod error;
mod nudge;
mod stats;

pub use controller::ExperimentController;
pub use error::ExperimentError;
pub use nudge::{
    nudge_messages, IdleMonitor, DEFAULT_IDLE_THRESHOLD, DEFAULT_NUDGE_COOLDOWN,
};
pub use stats::{compute_stats, PreferenceStats};
