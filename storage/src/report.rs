//! HTML email report: profile block, statistics block and transcript.

use std::fmt::Write;

use bestie_core::{ConversationSession, Strategy, Turn, ASSISTANT_NAME};
use chrono::{DateTime, Local, Utc};
use experiment::PreferenceStats;
use html_escape::encode_text;

const STYLE: &str = "
        body { font-family: Arial, sans-serif; line-height: 1.6; }
        .summary { background-color: #f0f0f0; padding: 15px; margin-bottom: 20px; border-radius: 5px; }
        .user-info { background-color: #e8f5e9; padding: 15px; margin-bottom: 20px; border-radius: 5px; }
        .conversation { margin-top: 20px; }
        .user-message { background-color: #e1f5fe; padding: 10px; margin: 5px 0; border-radius: 5px; }
        .assistant-message { background-color: #f5f5f5; padding: 10px; margin: 5px 0; border-radius: 5px; }";

/// Subject line: "BestieAI Conversation Summary - User: {name} - {YYYY-MM-DD HH:MM}", in local time.
pub fn report_subject(session: &ConversationSession, at: DateTime<Utc>) -> String {
    let name = &session.profile().name;
    format!(
        "{} Conversation Summary - User: {} - {}",
        ASSISTANT_NAME,
        if name.is_empty() { "Unknown" } else { name },
        at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
    )
}

fn or_missing(value: &str) -> String {
    if value.trim().is_empty() {
        "Not provided".to_string()
    } else {
        encode_text(value).into_owned()
    }
}

/// Renders the report body. All user-provided text is HTML-escaped.
pub fn render_report_html(
    session: &ConversationSession,
    stats: &PreferenceStats,
    feedback: &str,
    at: DateTime<Utc>,
) -> String {
    let profile = session.profile();
    let mut html = String::new();

    // write! to a String cannot fail
    let _ = write!(
        html,
        "<html>\n<head>\n    <style>{}\n    </style>\n</head>\n<body>\n    <h2>{} Conversation Summary</h2>\n",
        STYLE, ASSISTANT_NAME
    );

    let _ = write!(
        html,
        r#"    <div class="user-info">
        <h3>User Information</h3>
        <p><strong>Name:</strong> {}</p>
        <p><strong>Preferred Name:</strong> {}</p>
        <p><strong>Communication Style:</strong> {}</p>
        <p><strong>Interests:</strong> {}</p>
        <p><strong>Emotional State:</strong> {}</p>
        <p><strong>User ID:</strong> {}</p>
        <p><strong>Conversation ID:</strong> {}</p>
        <p><strong>Timestamp:</strong> {}</p>
    </div>
"#,
        or_missing(&profile.name),
        or_missing(&profile.preferred_name),
        or_missing(&profile.communication_style),
        or_missing(&profile.top_interests.join(", ")),
        profile.emotional_state,
        session.user_id,
        session.conversation_id,
        at.to_rfc3339(),
    );

    let feedback_html = if feedback.trim().is_empty() {
        "No feedback provided".to_string()
    } else {
        encode_text(feedback).into_owned()
    };
    let _ = write!(
        html,
        r#"    <div class="summary">
        <h3>Conversation Statistics</h3>
        <p><strong>Total messages:</strong> {}</p>
        <p><strong>Total responses rated:</strong> {}</p>
        <p><strong>Conditional responses preferred:</strong> {} ({:.1}%)</p>
        <p><strong>Dynamic context responses preferred:</strong> {} ({:.1}%)</p>
        <p><strong>Overall preferred technique:</strong> {}</p>
        <p><strong>User Feedback:</strong> {}</p>
    </div>
"#,
        session.turn_count(),
        stats.total,
        stats.count(Strategy::Conditional),
        stats.percentage(Strategy::Conditional),
        stats.count(Strategy::DynamicContext),
        stats.percentage(Strategy::DynamicContext),
        stats.dominant_label(),
        feedback_html,
    );

    html.push_str("    <div class=\"conversation\">\n        <h3>Conversation Transcript</h3>\n");
    for turn in session.turns() {
        match turn {
            Turn::User { content, .. } => {
                let _ = writeln!(
                    html,
                    r#"        <div class="user-message"><strong>User:</strong> {}</div>"#,
                    encode_text(content)
                );
            }
            Turn::Assistant(a) => {
                let text = if a.content.is_empty() && a.experiment.is_some() {
                    "(no preference selected)".to_string()
                } else {
                    encode_text(&a.content).into_owned()
                };
                let _ = writeln!(
                    html,
                    r#"        <div class="assistant-message"><strong>{}:</strong> {}</div>"#,
                    ASSISTANT_NAME, text
                );
            }
        }
    }
    html.push_str("    </div>\n</body>\n</html>\n");
    html
}
