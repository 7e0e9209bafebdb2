//! Prompt strategies under test and the A/B labels they are shown behind.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// One of the two prompt-construction approaches compared by the experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Conditional response-framework prompting.
    Conditional,
    /// Dynamic context (profile injection) prompting.
    DynamicContext,
}

impl Strategy {
    /// Fixed iteration order; also the tie-break order for the dominant strategy.
    pub const ALL: [Strategy; 2] = [Strategy::Conditional, Strategy::DynamicContext];

    /// Wire name used in JSON, CSV and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Conditional => "conditional",
            Strategy::DynamicContext => "dynamic_context",
        }
    }

    /// Human-readable name ("Dynamic Context").
    pub fn display_name(self) -> &'static str {
        match self {
            Strategy::Conditional => "Conditional",
            Strategy::DynamicContext => "Dynamic Context",
        }
    }

    pub fn other(self) -> Strategy {
        match self {
            Strategy::Conditional => Strategy::DynamicContext,
            Strategy::DynamicContext => Strategy::Conditional,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display label a candidate reply is shown behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionLabel {
    #[serde(rename = "Option A")]
    A,
    #[serde(rename = "Option B")]
    B,
}

impl OptionLabel {
    pub const ALL: [OptionLabel; 2] = [OptionLabel::A, OptionLabel::B];
}

impl fmt::Display for OptionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionLabel::A => f.write_str("Option A"),
            OptionLabel::B => f.write_str("Option B"),
        }
    }
}

/// Bijection between the two strategies and the two labels for a single turn.
///
/// Only the strategy behind Option A is stored; Option B is always the other one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LabelAssignment {
    #[serde(rename = "option_a_tech")]
    option_a: Strategy,
    #[serde(rename = "option_b_tech")]
    option_b: Strategy,
}

impl LabelAssignment {
    pub fn new(option_a: Strategy) -> Self {
        Self {
            option_a,
            option_b: option_a.other(),
        }
    }

    /// Uniform random permutation of the two strategies over the two labels.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.gen_bool(0.5) {
            Self::new(Strategy::Conditional)
        } else {
            Self::new(Strategy::DynamicContext)
        }
    }

    pub fn strategy_for(&self, label: OptionLabel) -> Strategy {
        match label {
            OptionLabel::A => self.option_a,
            OptionLabel::B => self.option_b,
        }
    }

    pub fn label_for(&self, strategy: Strategy) -> OptionLabel {
        if self.option_a == strategy {
            OptionLabel::A
        } else {
            OptionLabel::B
        }
    }
}
