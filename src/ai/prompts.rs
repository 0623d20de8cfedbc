//! System prompt and prompt builders for wellness interactions.
//!
//! Every function here is pure: the same inputs always render the same text,
//! and nothing touches the network or the database.

use crate::constants::{
    DATE_FORMAT_ISO, INSIGHT_MOOD_LIMIT, PROMPT_EXCERPT_CHARS, RECENT_CHAT_LIMIT,
    RECENT_SIGNAL_LIMIT, SUGGESTIONS_PER_REQUEST,
};
use crate::models::{ChatMessage, MoodSample, SentimentLabel, TextSample};
use std::fmt::Write;

/// Persona sent ahead of every remote conversation.
pub const SYSTEM_PROMPT: &str = "You are a supportive and empathetic mental wellness assistant. \
Respond to the user with care and understanding, keep your replies concise, \
and use a natural, conversational tone.";

/// Example line that anchors the suggestion output format.
pub const SUGGESTION_FORMAT_EXAMPLE: &str =
    "relaxation|Take a warm bath with lavender essential oils|20 minutes";

/// First `PROMPT_EXCERPT_CHARS` characters of `text` followed by `...`.
fn excerpt(text: &str) -> String {
    let head: String = text.chars().take(PROMPT_EXCERPT_CHARS).collect();
    format!("{}...", head)
}

/// Builds the prompt asking for a short, supportive reading of mood history.
///
/// At most ten samples are embedded, one `Date, Mood, Notes` line each, in
/// the order given. Callers handle the empty case themselves.
pub fn mood_insight_prompt(moods: &[MoodSample]) -> String {
    let entries = moods
        .iter()
        .take(INSIGHT_MOOD_LIMIT)
        .map(|m| {
            format!(
                "Date: {}, Mood: {}, Notes: {}",
                m.created_at.format(DATE_FORMAT_ISO),
                m.mood.as_str(),
                m.notes
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Based on these mood entries, provide a brief, supportive analysis:
{}

Focus on:
1. Identifying patterns or trends
2. Offering positive observations
3. Suggesting coping strategies
4. Maintaining an encouraging tone"#,
        entries
    )
}

/// Builds the prompt asking for self-care suggestions in the pipe format.
///
/// `journals` and `chats` are expected most-recent-first. The theme and
/// conversation sections are only rendered when they have content.
pub fn suggestion_prompt(
    sentiment: SentimentLabel,
    journals: &[TextSample],
    chats: &[ChatMessage],
) -> String {
    let mut context = format!("User's emotional state: {}\n", sentiment);

    if !journals.is_empty() {
        context.push_str("Recent themes:\n");
        for journal in journals.iter().take(RECENT_SIGNAL_LIMIT) {
            let _ = writeln!(context, "- {}", excerpt(&journal.text));
        }
    }

    if !chats.is_empty() {
        context.push_str("Recent conversation context:\n");
        for chat in chats.iter().take(RECENT_CHAT_LIMIT) {
            let _ = writeln!(context, "- {}", excerpt(&chat.text));
        }
    }

    format!(
        r#"Based on the following user context, generate {count} personalized self-care suggestions:
{context}
Consider:
1. User's current emotional state ({sentiment})
2. Recent activities and themes
3. Different categories:
   - relaxation (e.g., music, breathing exercises, warm baths)
   - physical (e.g., walks, stretching, gentle exercise)
   - social (e.g., reaching out to friends, group activities)
   - mindfulness (e.g., meditation, grounding exercises)
   - creative (e.g., art, writing, music)
4. Practical and achievable activities
5. Time of day and typical user schedule

Write exactly {count} suggestions, one per line, and nothing else.
Format each suggestion as: category|suggestion|duration
Example: {example}"#,
        count = SUGGESTIONS_PER_REQUEST,
        context = context,
        sentiment = sentiment,
        example = SUGGESTION_FORMAT_EXAMPLE,
    )
}

/// Renders prior turns as `User:` / `Assistant:` lines.
///
/// `messages` arrive most-recent-first, as the store returns them; the
/// rendered history reads oldest-first.
pub fn chat_history_context(messages: &[ChatMessage]) -> String {
    let mut history = String::new();
    for message in messages.iter().rev() {
        let speaker = if message.is_user() { "User" } else { "Assistant" };
        let _ = writeln!(history, "{}: {}", speaker, message.text);
    }
    history
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Mood;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_system_prompt_sets_persona() {
        assert!(SYSTEM_PROMPT.contains("supportive"));
        assert!(SYSTEM_PROMPT.contains("empathetic"));
        assert!(SYSTEM_PROMPT.contains("concise"));
    }

    #[test]
    fn test_mood_insight_prompt_lines() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 18, 30, 0).unwrap();
        let mut sample = MoodSample::new(Mood::VeryHappy, at);
        sample.notes = "sunny walk".to_string();

        let prompt = mood_insight_prompt(&[sample]);

        assert!(prompt.contains("Date: 2024-03-09, Mood: very_happy, Notes: sunny walk"));
        assert!(prompt.contains("Identifying patterns"));
        assert!(prompt.contains("positive observations"));
        assert!(prompt.contains("coping strategies"));
        assert!(prompt.contains("encouraging tone"));
    }

    #[test]
    fn test_mood_insight_prompt_caps_at_ten() {
        let moods: Vec<MoodSample> = (0..15)
            .map(|_| MoodSample::new(Mood::Neutral, Utc::now()))
            .collect();
        let prompt = mood_insight_prompt(&moods);
        assert_eq!(prompt.matches("Mood: neutral").count(), 10);
    }

    #[test]
    fn test_suggestion_prompt_contract() {
        let prompt = suggestion_prompt(SentimentLabel::Negative, &[], &[]);

        assert!(prompt.contains("User's emotional state: negative"));
        assert!(prompt.contains("category|suggestion|duration"));
        assert!(prompt.contains(SUGGESTION_FORMAT_EXAMPLE));
        for category in crate::models::Category::ALL {
            assert!(prompt.contains(&format!("- {} (", category)));
        }
        assert!(!prompt.contains("Recent themes"));
        assert!(!prompt.contains("Recent conversation context"));
    }

    #[test]
    fn test_suggestion_prompt_truncates_excerpts() {
        let long = "a".repeat(250);
        let journals = vec![TextSample::new(long, Utc::now())];
        let chats = vec![ChatMessage::assistant("short reply", Utc::now())];

        let prompt = suggestion_prompt(SentimentLabel::Neutral, &journals, &chats);

        assert!(prompt.contains(&format!("- {}...\n", "a".repeat(100))));
        assert!(!prompt.contains(&"a".repeat(101)));
        assert!(prompt.contains("- short reply...\n"));
        assert!(prompt.contains("Recent themes:"));
        assert!(prompt.contains("Recent conversation context:"));
    }

    #[test]
    fn test_excerpt_is_char_safe() {
        let text = "é".repeat(120);
        assert_eq!(excerpt(&text).chars().count(), 103);
    }

    #[test]
    fn test_suggestion_prompt_is_deterministic() {
        let journals = vec![TextSample::new("work was long", Utc::now())];
        assert_eq!(
            suggestion_prompt(SentimentLabel::Positive, &journals, &[]),
            suggestion_prompt(SentimentLabel::Positive, &journals, &[])
        );
    }

    #[test]
    fn test_chat_history_reads_oldest_first() {
        let newest_first = vec![
            ChatMessage::assistant("Glad to hear it", Utc::now()),
            ChatMessage::user("I slept well", Utc::now()),
        ];

        assert_eq!(
            chat_history_context(&newest_first),
            "User: I slept well\nAssistant: Glad to hear it\n"
        );
        assert!(chat_history_context(&[]).is_empty());
    }
}
