use jiff::civil::date;
use jiff::Timestamp;
use serde_json::json;

use mycoach_core::models::app_state::AppState;
use mycoach_storage::migrate::{Normalized, normalize};

fn now() -> Timestamp {
    "2026-10-16T12:00:00Z".parse().unwrap()
}

#[test]
fn current_documents_are_left_alone() {
    let state = AppState::initial(date(2026, 10, 16));
    let mut json = serde_json::to_value(&state).unwrap();
    assert_eq!(
        normalize(&mut json, date(2026, 10, 16), now()).unwrap(),
        Normalized::default()
    );
}

#[test]
fn non_object_documents_are_rejected() {
    let mut json = json!("hello");
    assert!(normalize(&mut json, date(2026, 10, 16), now()).is_err());
}

#[test]
fn null_collections_become_empty() {
    let mut json = json!({
        "profile": { "weightHistory": null },
        "messages": null,
        "logs": null,
        "currentPlan": null,
        "habits": null,
        "lastPlanUpdate": "2026-10-16"
    });
    assert!(normalize(&mut json, date(2026, 10, 16), now()).unwrap().changed);

    let state: AppState = serde_json::from_value(json).unwrap();
    assert!(state.messages.is_empty());
    assert!(state.profile.weight_history.is_empty());
}

#[test]
fn legacy_browser_document_is_upgraded() {
    let mut json = json!({
        "profile": {
            "name": "Ada",
            "age": 34,
            "gender": "female",
            "goal": "Lose 10 lbs",
            "coachName": "Blaze",
            "currentWeight": 160,
            "targetWeight": 150,
            "weightHistory": [
                { "date": "10/14/2026", "weight": 161 },
                { "date": "not a date", "weight": 1 }
            ],
            "onboardingCompleted": true
        },
        "messages": [
            { "id": "1760616000000", "text": "hi", "sender": "user", "timestamp": 1760616000000u64 }
        ],
        "logs": [
            { "date": "10/15/2026", "completedTasks": ["Walk"] },
            { "date": "2026-10-15", "completedTasks": ["Walk", "Water"] }
        ],
        "currentPlan": ["Walk", "Water"],
        "habits": [
            { "id": "1760616000000123", "title": "Stretch", "datesCompleted": ["10/15/2026", "10/15/2026"], "createdAt": 1760616000000u64 }
        ],
        "lastPlanUpdate": "10/15/2026"
    });

    let outcome = normalize(&mut json, date(2026, 10, 16), now()).unwrap();
    assert!(outcome.changed);
    assert_eq!(outcome.dropped, 1);
    let state: AppState = serde_json::from_value(json).unwrap();

    assert_eq!(state.profile.weight_history.len(), 1);
    assert_eq!(state.profile.weight_history[0].date, date(2026, 10, 14));

    assert_eq!(state.logs.len(), 1);
    assert_eq!(state.logs[0].completed_tasks, vec!["Walk".to_string(), "Water".to_string()]);

    assert_eq!(state.habits[0].dates_completed, vec![date(2026, 10, 15)]);
    assert_eq!(state.habits[0].created_at, Timestamp::from_millisecond(1760616000000).unwrap());

    assert_eq!(state.messages[0].timestamp, Timestamp::from_millisecond(1760616000000).unwrap());
    assert_eq!(state.last_plan_update, date(2026, 10, 15));
}

#[test]
fn unreadable_plan_stamp_falls_back_to_today() {
    let mut json = json!({ "profile": {}, "lastPlanUpdate": "someday" });
    normalize(&mut json, date(2026, 10, 16), now()).unwrap();
    assert_eq!(json["lastPlanUpdate"], "2026-10-16");
}

#[test]
fn null_profile_scalars_take_defaults() {
    let mut json = json!({
        "profile": {
            "name": "Ada",
            "age": null,
            "gender": null,
            "goal": 42,
            "coachName": null,
            "currentWeight": null,
            "targetWeight": "150",
            "onboardingCompleted": null
        },
        "messages": [],
        "currentPlan": ["Walk"],
        "lastPlanUpdate": "2026-10-16"
    });

    let outcome = normalize(&mut json, date(2026, 10, 16), now()).unwrap();
    assert_eq!(outcome.dropped, 0);

    let state: AppState = serde_json::from_value(json).unwrap();
    assert_eq!(state.profile.name, "Ada");
    assert_eq!(state.profile.age, 30);
    assert_eq!(state.profile.gender, "");
    assert_eq!(state.profile.goal, "");
    assert_eq!(state.profile.coach_name, "YourAICoach");
    assert_eq!(state.profile.current_weight, None);
    assert_eq!(state.profile.target_weight, Some(150.0));
    assert!(!state.profile.onboarding_completed);
    assert_eq!(state.current_plan, vec!["Walk".to_string()]);
}

#[test]
fn fractional_and_text_ages_are_read() {
    let mut json = json!({ "profile": { "age": 34.0 } });
    normalize(&mut json, date(2026, 10, 16), now()).unwrap();
    assert_eq!(json["profile"]["age"], 34);

    let mut json = json!({ "profile": { "age": " 41 " } });
    normalize(&mut json, date(2026, 10, 16), now()).unwrap();
    assert_eq!(json["profile"]["age"], 41);
}

#[test]
fn year_first_locale_keys_are_kept() {
    let mut json = json!({
        "profile": {
            "currentWeight": 80,
            "weightHistory": [{ "date": "2026/10/1", "weight": 81 }]
        },
        "logs": [{ "date": "2026/10/15", "completedTasks": ["Walk"] }],
        "habits": [
            { "id": "h1", "title": "Stretch", "datesCompleted": ["2026. 10. 15."], "createdAt": 1760616000000u64 }
        ],
        "lastPlanUpdate": "2026/10/15"
    });

    let outcome = normalize(&mut json, date(2026, 10, 16), now()).unwrap();
    assert_eq!(outcome.dropped, 0);

    let state: AppState = serde_json::from_value(json).unwrap();
    assert_eq!(state.logs.len(), 1);
    assert_eq!(state.logs[0].date, date(2026, 10, 15));
    assert_eq!(state.profile.weight_history.len(), 1);
    assert_eq!(state.profile.weight_history[0].date, date(2026, 10, 1));
    assert_eq!(state.profile.weight_history[0].weight, 81.0);
    assert_eq!(state.habits[0].dates_completed, vec![date(2026, 10, 15)]);
}

#[test]
fn weight_samples_on_the_same_date_are_merged() {
    let mut json = json!({
        "profile": {
            "weightHistory": [
                { "date": "10/16/2026", "weight": 81 },
                { "date": "10/15/2026", "weight": 82 },
                { "date": "16.10.2026", "weight": 80 }
            ]
        }
    });

    normalize(&mut json, date(2026, 10, 16), now()).unwrap();
    let state: AppState = serde_json::from_value(json).unwrap();

    let history: Vec<_> = state
        .profile
        .weight_history
        .iter()
        .map(|w| (w.date, w.weight))
        .collect();
    assert_eq!(history, vec![(date(2026, 10, 16), 80.0), (date(2026, 10, 15), 82.0)]);
}

#[test]
fn unreadable_entries_are_counted() {
    let mut json = json!({
        "profile": { "weightHistory": [{ "date": "2026-10-01", "weight": null }] },
        "logs": [{ "date": "someday", "completedTasks": [] }],
        "messages": [{ "id": "x", "text": "hi", "sender": "robot", "timestamp": 0 }],
        "habits": [{ "title": "Read", "datesCompleted": ["never"] }],
        "currentPlan": ["Walk", null]
    });

    let outcome = normalize(&mut json, date(2026, 10, 16), now()).unwrap();
    assert_eq!(outcome.dropped, 5);
    let state: AppState = serde_json::from_value(json).unwrap();
    assert_eq!(state.habits.len(), 1);
    assert!(state.messages.is_empty());
}
