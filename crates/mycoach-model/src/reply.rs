//! Tolerant reading of the model's structured reply.
//!
//! The model is asked for a JSON object but may wrap it in code fences,
//! surround it with prose, or ignore the format entirely. [`parse_reply`]
//! tries, in order:
//!
//! 1. strict: strip fences and parse the whole text
//! 2. embedded: parse the span from the first `{` to the last `}`
//! 3. raw: use the entire text as the chat response
//!
//! None of these can fail, so no error escapes.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A structured coaching reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachReply {
    pub chat_response: String,
    pub suggested_plan: Vec<String>,
    pub new_habits: Vec<String>,
}

/// Wire shape: every field optional and nullable.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct WireReply {
    chat_response: Option<String>,
    suggested_plan: Option<Vec<String>>,
    new_habits: Option<Vec<String>>,
}

impl From<WireReply> for CoachReply {
    fn from(wire: WireReply) -> Self {
        Self {
            chat_response: wire.chat_response.unwrap_or_default(),
            suggested_plan: wire.suggested_plan.unwrap_or_default(),
            new_habits: wire.new_habits.unwrap_or_default(),
        }
    }
}

impl CoachReply {
    /// A reply that is only chat text.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            chat_response: text.into(),
            ..Self::default()
        }
    }
}

pub fn parse_reply(text: &str) -> CoachReply {
    if let Some(reply) = parse_strict(text) {
        return reply;
    }
    if let Some(reply) = parse_embedded(text) {
        debug!("recovered reply embedded in surrounding text");
        return reply;
    }
    debug!("reply is not structured, using raw text");
    CoachReply::plain(text)
}

fn parse_strict(text: &str) -> Option<CoachReply> {
    let cleaned = text.replace("```json", "").replace("```", "");
    serde_json::from_str::<WireReply>(cleaned.trim())
        .ok()
        .map(CoachReply::from)
}

fn parse_embedded(text: &str) -> Option<CoachReply> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str::<WireReply>(&text[start..=end])
        .ok()
        .map(CoachReply::from)
}

/// Append the suggested plan to the chat text when the text does not
/// already appear to mention it.
///
/// The check looks for the first (up to) ten characters of the first plan
/// item, case-insensitively.
pub fn ensure_plan_in_text(mut reply: CoachReply) -> CoachReply {
    let Some(first) = reply.suggested_plan.first() else {
        return reply;
    };

    let opening: String = first.chars().take(10).collect::<String>().to_lowercase();
    if reply.chat_response.to_lowercase().contains(&opening) {
        return reply;
    }

    let list = reply
        .suggested_plan
        .iter()
        .map(|item| format!("• {item}"))
        .collect::<Vec<_>>()
        .join("\n");
    reply.chat_response = format!(
        "{}\n\n**Proposed Plan:**\n{list}",
        reply.chat_response.trim()
    );
    reply
}
