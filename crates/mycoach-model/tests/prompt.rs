use mycoach_core::models::profile::UserProfile;
use mycoach_model::model::{ChatMessage, ChatRole, InlineImage};
use mycoach_model::prompt::{
    coach_name, coach_system_prompt, format_transcript, motivation_prompts, turn_text,
    FALLBACK_COACH_NAME,
};

fn profile() -> UserProfile {
    UserProfile {
        name: "Ada".to_string(),
        goal: "Run a marathon".to_string(),
        coach_name: "Blaze".to_string(),
        ..UserProfile::default()
    }
}

#[test]
fn system_prompt_embeds_persona_and_client() {
    let prompt = coach_system_prompt(&profile());
    assert!(prompt.starts_with("You are Blaze"));
    assert!(prompt.contains("CLIENT: Ada, Goal: Run a marathon"));
    assert!(prompt.contains("chatResponse"));
}

#[test]
fn blank_coach_name_falls_back() {
    let p = UserProfile {
        coach_name: "  ".to_string(),
        ..profile()
    };
    assert_eq!(coach_name(&p), FALLBACK_COACH_NAME);
}

#[test]
fn transcript_is_role_tagged_oldest_first() {
    let history = vec![
        ChatMessage { role: ChatRole::User, content: "hi".to_string() },
        ChatMessage { role: ChatRole::Assistant, content: "let's go".to_string() },
    ];
    assert_eq!(format_transcript(&history), "Client: hi\nCoach: let's go");

    let text = turn_text(&history, "what now?");
    assert!(text.starts_with("[CONVERSATION HISTORY]\nClient: hi"));
    assert!(text.ends_with("Client's New Input: what now?"));
}

#[test]
fn motivation_summarizes_first_two_tasks() {
    let plan = vec!["Walk".to_string(), "Water".to_string(), "Sleep".to_string()];
    let (system, user) = motivation_prompts(&profile(), &plan);
    assert!(system.starts_with("You are Blaze"));
    assert!(user.contains("Walk, Water"));
    assert!(!user.contains("Sleep"));

    let (_, user) = motivation_prompts(&profile(), &[]);
    assert!(user.contains("your mission"));
}

#[test]
fn data_url_images_decode() {
    let image = InlineImage::from_payload("data:image/png;base64,aGVsbG8=").unwrap();
    assert_eq!(image.media_type, "image/png");
    assert_eq!(image.data, b"hello");
}

#[test]
fn bare_base64_is_assumed_jpeg() {
    let image = InlineImage::from_payload("aGVsbG8=").unwrap();
    assert_eq!(image.media_type, "image/jpeg");
}

#[test]
fn malformed_images_are_rejected() {
    assert!(InlineImage::from_payload("data:image/png;base64").is_err());
    assert!(InlineImage::from_payload("data:image/png,aGVsbG8=").is_err());
    assert!(InlineImage::from_payload("***").is_err());
}
