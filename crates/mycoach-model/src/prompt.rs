//! Prompt construction for coaching turns, greetings, and motivation.

use mycoach_core::models::profile::UserProfile;

use crate::model::{ChatMessage, ChatRole};

/// Number of prior messages included with each turn.
pub const HISTORY_WINDOW: usize = 10;

/// Input used when the user sends only an image.
pub const IMAGE_ONLY_INPUT: &str = "Analyze this image.";

/// Persona name used when the profile has none.
pub const FALLBACK_COACH_NAME: &str = "CustomCoach";

const REPLY_FORMAT: &str = "\
Respond with a single JSON object and nothing else:
{\"chatResponse\": string, \"suggestedPlan\": [string], \"newHabits\": [string]}
'suggestedPlan' and 'newHabits' may be empty arrays.";

pub fn coach_name(profile: &UserProfile) -> &str {
    let name = profile.coach_name.trim();
    if name.is_empty() {
        FALLBACK_COACH_NAME
    } else {
        name
    }
}

/// System instructions for an ordinary coaching turn.
pub fn coach_system_prompt(profile: &UserProfile) -> String {
    format!(
        "You are {coach}, an expert personal trainer.
CLIENT: {name}, Goal: {goal}

CORE REQUIREMENTS:
1. TENTATIVE PLANNING: If the user hasn't confirmed their plan yet, propose or edit it in 'suggestedPlan'.
2. ASK PERMISSION: Always ask \"Anything to add or edit before we add it to your dashboard?\" when proposing a plan.
3. MISSIONS VS HABITS: Put daily tasks (like \"Sleep 8 hours\", \"Drink water\", \"Push workout\") in 'suggestedPlan'. Do NOT put these in 'newHabits' unless the user explicitly asks for a long-term habit tracker.
4. HIGH ENERGY: Be intense and motivational.

{REPLY_FORMAT}",
        coach = coach_name(profile),
        name = profile.name,
        goal = profile.goal,
    )
}

/// System instructions for the opening message of a new conversation.
pub fn greeting_system_prompt(profile: &UserProfile) -> String {
    format!(
        "You are {coach}. High-energy expert trainer.
CLIENT: {name}, GOAL: {goal}

INSTRUCTIONS:
1. Welcome the client with fire!
2. PROPOSE a Day 1 plan in 'suggestedPlan'.
3. CRITICAL: In 'chatResponse', ask: \"Here is the plan for the day, anything to add or edit before we add it to your dashboard?\"
4. List the tasks clearly in your 'chatResponse'.

{REPLY_FORMAT}",
        coach = coach_name(profile),
        name = profile.name,
        goal = profile.goal,
    )
}

pub const GREETING_INPUT: &str = "Start our first session.";

/// System and user prompt for a motivational burst.
pub fn motivation_prompts(profile: &UserProfile, plan: &[String]) -> (String, String) {
    let summary = if plan.is_empty() {
        "your mission".to_string()
    } else {
        plan.iter().take(2).cloned().collect::<Vec<_>>().join(", ")
    };

    let system = format!(
        "You are {coach}. Use structured markdown (### Headers, **Bold**).",
        coach = coach_name(profile),
    );
    let user = format!(
        "Hype me up! I need to finish: {summary}.\nGOAL: {goal}\nInclude one intense, high-performer fact.",
        goal = profile.goal,
    );
    (system, user)
}

/// Render prior turns as `Client:` / `Coach:` lines, oldest first.
pub fn format_transcript(history: &[ChatMessage]) -> String {
    history
        .iter()
        .map(|m| {
            let speaker = match m.role {
                ChatRole::User => "Client",
                ChatRole::Assistant => "Coach",
            };
            format!("{speaker}: {}", m.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The text of the single user message sent for a coaching turn.
pub fn turn_text(history: &[ChatMessage], input: &str) -> String {
    format!(
        "[CONVERSATION HISTORY]\n{}\n\nClient's New Input: {input}",
        format_transcript(history)
    )
}
