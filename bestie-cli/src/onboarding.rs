//! Onboarding: builds a [`UserProfile`] from terminal answers or a JSON file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use bestie_core::{
    parse_list, EmotionalState, ProfileError, UserProfile, COMMUNICATION_STYLES,
    INTEREST_OPTIONS,
};
use tokio::io::AsyncBufRead;
use tracing::info;

use crate::terminal::Terminal;

/// Loads and validates a profile saved as JSON (same field names as the conversation record).
pub fn load_profile(path: &Path) -> Result<UserProfile> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Read profile file {}", path.display()))?;
    let profile: UserProfile = serde_json::from_str(&raw)
        .with_context(|| format!("Parse profile file {}", path.display()))?;
    Ok(profile.validate()?)
}

/// Resolves a style answer: a number from the list, free text, or empty for the first style.
pub fn parse_style(answer: &str) -> String {
    let answer = answer.trim();
    if answer.is_empty() {
        return COMMUNICATION_STYLES[0].to_string();
    }
    answer
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| COMMUNICATION_STYLES.get(i))
        .map(|s| s.to_string())
        .unwrap_or_else(|| answer.to_string())
}

/// Resolves comma-separated interest answers. Numbers pick from [`INTEREST_OPTIONS`];
/// anything else is kept as a custom tag. Duplicates are dropped.
pub fn parse_interests(answer: &str) -> Vec<String> {
    let mut interests: Vec<String> = Vec::new();
    for item in parse_list(answer) {
        let tag = item
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| INTEREST_OPTIONS.get(i))
            .map(|s| s.to_string())
            .unwrap_or(item);
        if !interests.iter().any(|t| t.eq_ignore_ascii_case(&tag)) {
            interests.push(tag);
        }
    }
    interests
}

fn numbered<'a>(items: impl IntoIterator<Item = &'a str>) -> String {
    items
        .into_iter()
        .enumerate()
        .map(|(i, s)| format!("  {}. {}", i + 1, s))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Asks the onboarding questions. Returns `None` when input ends first.
pub async fn collect_profile<R, W>(term: &mut Terminal<R, W>) -> Result<Option<UserProfile>>
where
    R: AsyncBufRead + Unpin,
    W: std::io::Write,
{
    term.say("\nLet's get to know you better.")?;

    let name = loop {
        let Some(answer) = term.ask("What's your name?").await? else {
            return Ok(None);
        };
        if !answer.is_empty() {
            break answer;
        }
        term.say(ProfileError::MissingName.to_string())?;
    };
    let Some(preferred_name) = term.ask("What do you prefer to be called?").await? else {
        return Ok(None);
    };

    term.say(format!(
        "How would you describe your communication style?\n{}",
        numbered(COMMUNICATION_STYLES)
    ))?;
    let Some(style) = term.ask("Style (number or your own words):").await? else {
        return Ok(None);
    };

    term.say(format!(
        "What are your main interests? (Select at least 2)\n{}",
        numbered(INTEREST_OPTIONS)
    ))?;
    let Some(interests) = term
        .ask("Interests (comma-separated numbers or names, custom ones welcome):")
        .await?
    else {
        return Ok(None);
    };

    let Some(recent_events) = term.ask("What's been happening in your life recently?").await?
    else {
        return Ok(None);
    };
    let Some(recent_topics) = term
        .ask("What topics have been on your mind lately? (Comma-separated)")
        .await?
    else {
        return Ok(None);
    };
    let Some(open_questions) = term
        .ask("Is there anything specific you're looking for advice on?")
        .await?
    else {
        return Ok(None);
    };
    let Some(stated_preferences) = term
        .ask("What are some things you enjoy in daily life? (Comma-separated)")
        .await?
    else {
        return Ok(None);
    };

    term.say(format!(
        "How would you describe your current emotional state?\n{}",
        numbered(EmotionalState::SCALE.iter().map(|s| s.label()))
    ))?;
    let emotional_state = loop {
        let Some(answer) = term.ask("Emotional state (1-5, empty for Neutral):").await? else {
            return Ok(None);
        };
        if answer.is_empty() {
            break EmotionalState::default();
        }
        match answer.parse::<EmotionalState>() {
            Ok(state) => break state,
            Err(e) => term.say(e.to_string())?,
        }
    };

    let profile = UserProfile {
        name,
        preferred_name,
        communication_style: parse_style(&style),
        top_interests: parse_interests(&interests),
        recent_events,
        recent_topics: parse_list(&recent_topics),
        open_questions,
        stated_preferences: parse_list(&stated_preferences),
        emotional_state,
    }
    .validate()?;
    info!(
        interests = profile.top_interests.len(),
        emotional_state = %profile.emotional_state,
        "Onboarding complete"
    );
    Ok(Some(profile))
}
