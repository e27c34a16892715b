//! Coaching operations over any [`CoachModel`].

use tracing::{info, warn};

use mycoach_core::models::message::Message;
use mycoach_core::models::profile::UserProfile;

use crate::error::ModelError;
use crate::model::{ChatMessage, CoachModel, CoachRequest, InlineImage};
use crate::prompt;
use crate::reply::{self, CoachReply};

/// Starter plan offered when the greeting call fails.
pub const FALLBACK_GREETING_PLAN: [&str; 2] = ["Drink 3L Water", "10 Minute Walk"];

pub const FALLBACK_GREETING: &str =
    "I'm hyped to start! Here's a starter plan. Does this look good to add to your dashboard?";

pub const FALLBACK_MOTIVATION: &str =
    "The top 1% don't wait for motivation. They just work. Let's go!";

/// Ask the model to answer one user turn.
///
/// `history` holds the messages before this turn; only the last
/// [`prompt::HISTORY_WINDOW`] are sent. An empty `input` with an image is
/// sent as [`prompt::IMAGE_ONLY_INPUT`].
pub async fn coach_reply<M: CoachModel>(
    model: &M,
    profile: &UserProfile,
    history: &[Message],
    input: &str,
    image: Option<&str>,
) -> Result<CoachReply, ModelError> {
    let window = &history[history.len().saturating_sub(prompt::HISTORY_WINDOW)..];

    let input = if input.trim().is_empty() && image.is_some() {
        prompt::IMAGE_ONLY_INPUT
    } else {
        input
    };

    let request = CoachRequest {
        system_prompt: prompt::coach_system_prompt(profile),
        history: window.iter().map(ChatMessage::from).collect(),
        input: input.to_string(),
        image: image.map(InlineImage::from_payload).transpose()?,
    };

    let text = model.converse(&request).await?;
    if text.trim().is_empty() {
        return Err(ModelError::EmptyResponse);
    }

    let reply = reply::ensure_plan_in_text(reply::parse_reply(&text));
    info!(
        plan_items = reply.suggested_plan.len(),
        new_habits = reply.new_habits.len(),
        "coach reply received"
    );
    Ok(reply)
}

/// The opening message for an empty conversation.
///
/// Never fails: a model error yields a built-in greeting and starter plan.
/// Habit suggestions are dropped from greetings.
pub async fn greeting<M: CoachModel>(model: &M, profile: &UserProfile) -> CoachReply {
    let system = prompt::greeting_system_prompt(profile);

    let reply = match model.generate_text(&system, prompt::GREETING_INPUT).await {
        Ok(text) if !text.trim().is_empty() => reply::parse_reply(&text),
        Ok(_) => {
            warn!("greeting came back empty, using fallback");
            fallback_greeting()
        }
        Err(e) => {
            warn!(error = %e, "greeting failed, using fallback");
            fallback_greeting()
        }
    };

    reply::ensure_plan_in_text(CoachReply {
        new_habits: Vec::new(),
        ..reply
    })
}

fn fallback_greeting() -> CoachReply {
    CoachReply {
        chat_response: FALLBACK_GREETING.to_string(),
        suggested_plan: FALLBACK_GREETING_PLAN.iter().map(|s| s.to_string()).collect(),
        new_habits: Vec::new(),
    }
}

/// A short motivational message about the current plan. Never fails.
pub async fn motivation<M: CoachModel>(model: &M, profile: &UserProfile, plan: &[String]) -> String {
    let (system, user) = prompt::motivation_prompts(profile, plan);
    match model.generate_text(&system, &user).await {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => FALLBACK_MOTIVATION.to_string(),
        Err(e) => {
            warn!(error = %e, "motivation failed, using fallback");
            FALLBACK_MOTIVATION.to_string()
        }
    }
}
