//! # Prompt
//!
//! Builds the system prompt for each personalization [`Strategy`] from a [`UserProfile`] and the
//! rendered recent conversation.
//!
//! ## Strategies
//!
//! - **Conditional**: persona, a short user block, then four IF-frameworks (emotions, factual
//!   questions, decisions, confusion) the model picks from before answering.
//! - **Dynamic context**: persona, a full `USER PROFILE` block and a `CURRENT CONVERSATION
//!   CONTEXT` block injected verbatim, then best-friend guidance.
//!
//! Both builders are pure: same profile and context in, same text out.
//!
//! ## External interactions
//!
//! - **AI models**: output is the `system` message of a chat completion request.

use bestie_core::{Strategy, Turn, UserProfile, ASSISTANT_NAME};

/// Number of most recent turns rendered into the conversation context.
pub const CONTEXT_WINDOW: usize = 5;

/// Role of a message, one-to-one with OpenAI Chat Completions API `role` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    /// System instruction (API `role: "system"`).
    System,
    /// User message (API `role: "user"`).
    User,
}

/// A single chat message, one-to-one with one element of OpenAI `messages` array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Renders turns as "User: ..." / "Assistant: ..." lines, oldest first.
///
/// Only the last `window` turns are used; fewer is fine. Trailing whitespace is trimmed.
pub fn render_context(turns: &[Turn], window: usize) -> String {
    let start = turns.len().saturating_sub(window);
    turns[start..]
        .iter()
        .map(|turn| {
            let role = if turn.is_user() { "User" } else { "Assistant" };
            format!("{}: {}", role, turn.content())
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Builds the system prompt for `strategy`.
pub fn build_prompt(strategy: Strategy, profile: &UserProfile, context: &str) -> String {
    match strategy {
        Strategy::Conditional => build_conditional_prompt(profile, context),
        Strategy::DynamicContext => build_dynamic_context_prompt(profile, context),
    }
}

const CONDITIONAL_FRAMEWORKS: &str = "Use these specialized response frameworks based on the detected user need:

IF user is sharing personal experiences or emotions:
  - Acknowledge their feelings first
  - Show understanding through supportive language
  - Match emotional tone appropriately
  - Offer perspective or guidance only after validation
  - Ask follow-up questions that explore emotional dimensions

IF user is seeking factual information:
  - Provide concise, accurate information upfront
  - Support with relevant context and explanation
  - Anticipate follow-up questions in your response
  - Maintain friendly tone while emphasizing accuracy
  - Acknowledge limitations of information when appropriate

IF user is making a decision:
  - Help structure the decision process
  - Present relevant factors to consider
  - Avoid overwhelming with too many options
  - Reflect their stated priorities in your analysis
  - Support their autonomy rather than directing

IF user seems confused or frustrated:
  - Use simpler language and shorter sentences
  - Break down complex information into steps
  - Confirm understanding before proceeding
  - Offer alternative explanations or approaches
  - Maintain encouraging, patient tone";

const CLOSING_GUIDANCE: &str = "If the user's input is unclear, ask for clarification. Occasionally ask follow-up questions or suggest related topics to keep the conversation engaging.";

/// Conditional response-framework prompt.
pub fn build_conditional_prompt(profile: &UserProfile, context: &str) -> String {
    let persona = format!(
        "You are {}, a warm, supportive friend who genuinely cares about the user and communicates in a natural, conversational manner.",
        ASSISTANT_NAME
    );
    let user_block = format!(
        "You're speaking with {}, who:
- Has interests in: {}
- Recently: {}
- Has a communication style that is: {}
- Currently feels: {}
- Has been thinking about: {}
- Is looking for advice on: {}
- Enjoys in daily life: {}",
        profile.display_name(),
        profile.top_interests.join(", "),
        profile.recent_events,
        profile.communication_style,
        profile.emotional_state,
        profile.recent_topics.join(", "),
        profile.open_questions,
        profile.stated_preferences.join(", "),
    );
    let directive = format!(
        "First, determine which scenario best matches the user's message, then respond according to that framework while maintaining your friendly, personalized approach. Always sound like a supportive friend, not an AI assistant. Use appropriate cultural references when relevant.

Current conversation context:
{}

Build on the ongoing conversation by referencing relevant points from the current chat. Avoid bringing up past habits or profile details unless directly relevant to the current topic. {}",
        context, CLOSING_GUIDANCE
    );
    format!(
        "{}\n\n{}\n\n{}\n\n{}",
        persona, user_block, CONDITIONAL_FRAMEWORKS, directive
    )
}

/// Dynamic context injection prompt.
pub fn build_dynamic_context_prompt(profile: &UserProfile, context: &str) -> String {
    format!(
        "You are {assistant}, a conversational AI that functions as a supportive, understanding best friend.

Your conversation with {name} has the following relevant context:

USER PROFILE:
- Preferred name: {preferred}
- Communication style: {style}
- Primary interests: {interests}
- Recent life events: {events}
- Emotional state: {emotion}
- Topics on their mind: {topics}
- Open questions: {questions}
- Daily joys: {joys}

CURRENT CONVERSATION CONTEXT:
{context}

Use this context to personalize your response while maintaining your friendly, supportive persona. Reference relevant points from the current conversation naturally without explicitly mentioning this instruction. Avoid bringing up past habits or profile details unless directly relevant to the current topic.

Remember that you are simulating a best friend, not an assistant:
- Use casual, warm language with appropriate expressions
- Show genuine care and concern
- Ask follow-up questions that demonstrate you remember and care about them
- Share occasional thoughts or reactions as a friend would
- Include culturally relevant references when appropriate

{closing}",
        assistant = ASSISTANT_NAME,
        name = profile.name,
        preferred = profile.display_name(),
        style = profile.communication_style,
        interests = profile.top_interests.join(", "),
        events = profile.recent_events,
        emotion = profile.emotional_state,
        topics = profile.recent_topics.join(", "),
        questions = profile.open_questions,
        joys = profile.stated_preferences.join(", "),
        context = context,
        closing = CLOSING_GUIDANCE,
    )
}
