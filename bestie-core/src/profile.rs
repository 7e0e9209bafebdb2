//! User profile collected at onboarding.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ProfileError;

/// Communication styles offered during onboarding.
pub const COMMUNICATION_STYLES: [&str; 4] = [
    "Direct and to-the-point",
    "Detailed and expressive",
    "Casual and conversational",
    "Thoughtful and analytical",
];

/// Interest tags offered during onboarding; custom tags are accepted too.
pub const INTEREST_OPTIONS: [&str; 15] = [
    "Technology",
    "Sports",
    "Cooking",
    "Travel",
    "Music",
    "Movies",
    "Reading",
    "Fitness",
    "Art",
    "Photography",
    "Gaming",
    "Fashion",
    "Science",
    "Education",
    "Business",
];

/// Self-reported emotional state on a fixed ordered scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum EmotionalState {
    #[serde(rename = "Very stressed")]
    VeryStressed,
    #[serde(rename = "Somewhat stressed")]
    SomewhatStressed,
    #[default]
    #[serde(rename = "Neutral")]
    Neutral,
    #[serde(rename = "Somewhat positive")]
    SomewhatPositive,
    #[serde(rename = "Very positive")]
    VeryPositive,
}

impl EmotionalState {
    /// Scale order, most stressed first.
    pub const SCALE: [EmotionalState; 5] = [
        EmotionalState::VeryStressed,
        EmotionalState::SomewhatStressed,
        EmotionalState::Neutral,
        EmotionalState::SomewhatPositive,
        EmotionalState::VeryPositive,
    ];

    pub fn label(self) -> &'static str {
        match self {
            EmotionalState::VeryStressed => "Very stressed",
            EmotionalState::SomewhatStressed => "Somewhat stressed",
            EmotionalState::Neutral => "Neutral",
            EmotionalState::SomewhatPositive => "Somewhat positive",
            EmotionalState::VeryPositive => "Very positive",
        }
    }
}

impl fmt::Display for EmotionalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EmotionalState {
    type Err = ProfileError;

    /// Accepts a 1-based position on the scale or the label (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(n) = s.parse::<usize>() {
            return n
                .checked_sub(1)
                .and_then(|i| Self::SCALE.get(i).copied())
                .ok_or_else(|| ProfileError::InvalidChoice(s.to_string()));
        }
        Self::SCALE
            .into_iter()
            .find(|state| state.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| ProfileError::InvalidChoice(s.to_string()))
    }
}

/// What the user told us about themselves. Replaced wholesale on profile update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct UserProfile {
    pub name: String,
    pub preferred_name: String,
    pub communication_style: String,
    #[serde(deserialize_with = "list_or_text")]
    pub top_interests: Vec<String>,
    pub recent_events: String,
    #[serde(deserialize_with = "list_or_text")]
    pub recent_topics: Vec<String>,
    pub open_questions: String,
    #[serde(deserialize_with = "list_or_text")]
    pub stated_preferences: Vec<String>,
    #[serde(rename = "emotional_trends")]
    pub emotional_state: EmotionalState,
}

impl UserProfile {
    /// Creates a profile with the given name; the preferred name defaults to it.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            preferred_name: name.clone(),
            name,
            ..Self::default()
        }
    }

    /// Name to address the user by: preferred name, falling back to the name.
    pub fn display_name(&self) -> &str {
        if self.preferred_name.trim().is_empty() {
            &self.name
        } else {
            &self.preferred_name
        }
    }

    /// Checks the onboarding requirements and fills the preferred-name default.
    pub fn validate(mut self) -> Result<Self, ProfileError> {
        if self.name.trim().is_empty() {
            return Err(ProfileError::MissingName);
        }
        self.name = self.name.trim().to_string();
        if self.preferred_name.trim().is_empty() {
            self.preferred_name = self.name.clone();
        }
        Ok(self)
    }
}

/// Splits a comma-separated answer into trimmed, non-empty entries.
pub fn parse_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Accepts either a JSON list or a comma-separated string.
fn list_or_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ListOrText {
        List(Vec<String>),
        Text(String),
    }

    Ok(match ListOrText::deserialize(deserializer)? {
        ListOrText::List(items) => items,
        ListOrText::Text(text) => parse_list(&text),
    })
}
