//! Forward-compatible normalization of stored documents.
//!
//! The document carries no version field. Older shapes are brought up to
//! date by a pure transform on the raw JSON value before deserializing:
//!
//! - missing or `null` collections become empty arrays
//! - `null` or mistyped profile scalars fall back to their defaults
//! - locale-formatted date keys are rewritten as ISO dates; entries whose
//!   date cannot be read are dropped and counted
//! - logs and weight samples that land on the same date are merged
//! - epoch-millisecond timestamps become RFC 3339 strings
//! - identifiers that are not UUIDs are replaced with fresh ones
//! - a `currentWeight` with no weight history gets one backfilled sample
//!
//! Profile scalars are removed rather than rewritten when they cannot be
//! read, leaving the value to the serde defaults on `UserProfile`.

use jiff::Timestamp;
use jiff::civil::Date;
use serde_json::{Map, Value};
use tracing::warn;
use uuid::Uuid;

use mycoach_core::dates::parse_calendar_date;

use crate::error::StorageError;

/// What [`normalize`] did to a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Normalized {
    /// The document differs from what was read.
    pub changed: bool,
    /// Entries discarded because they could not be read.
    pub dropped: usize,
}

/// Normalize `json` in place.
pub fn normalize(
    json: &mut Value,
    today: Date,
    now: Timestamp,
) -> Result<Normalized, StorageError> {
    let before = json.clone();
    let mut dropped = 0;

    let root = json
        .as_object_mut()
        .ok_or_else(|| StorageError::Malformed("document is not a JSON object".to_string()))?;

    for key in ["messages", "logs", "currentPlan", "habits"] {
        ensure_array(root, key);
    }

    if !root.get("profile").is_some_and(Value::is_object) {
        root.insert("profile".to_string(), Value::Object(Map::new()));
    }
    if let Some(profile) = root.get_mut("profile").and_then(Value::as_object_mut) {
        normalize_profile(profile, today, &mut dropped);
    }

    if let Some(plan) = root.get_mut("currentPlan").and_then(Value::as_array_mut) {
        retain_counted(plan, &mut dropped, |task| task.is_string());
    }
    if let Some(logs) = root.get_mut("logs").and_then(Value::as_array_mut) {
        normalize_logs(logs, &mut dropped);
    }
    if let Some(habits) = root.get_mut("habits").and_then(Value::as_array_mut) {
        normalize_habits(habits, now, &mut dropped);
    }
    if let Some(messages) = root.get_mut("messages").and_then(Value::as_array_mut) {
        normalize_messages(messages, now, &mut dropped);
    }

    let stamp = root
        .get("lastPlanUpdate")
        .and_then(Value::as_str)
        .and_then(|s| parse_calendar_date(s).ok())
        .unwrap_or(today);
    root.insert("lastPlanUpdate".to_string(), date_value(stamp));

    Ok(Normalized {
        changed: *json != before,
        dropped,
    })
}

fn normalize_profile(profile: &mut Map<String, Value>, today: Date, dropped: &mut usize) {
    for key in ["name", "gender", "goal", "coachName"] {
        if profile.get(key).is_some_and(|v| !v.is_string()) {
            warn!(field = key, "profile field is not text, using default");
            profile.remove(key);
        }
    }

    if let Some(raw) = profile.get("age").cloned() {
        match age_value(&raw) {
            Some(age) => {
                profile.insert("age".to_string(), Value::from(age));
            }
            None => {
                warn!(value = %raw, "unreadable age, using default");
                profile.remove("age");
            }
        }
    }

    if profile.get("onboardingCompleted").is_some_and(|v| !v.is_boolean()) {
        profile.remove("onboardingCompleted");
    }

    for key in ["currentWeight", "targetWeight"] {
        let Some(raw) = profile.get(key).cloned() else {
            continue;
        };
        if raw.is_null() {
            continue;
        }
        match weight_value(&raw) {
            Some(weight) => {
                profile.insert(key.to_string(), Value::from(weight));
            }
            None => {
                warn!(field = key, value = %raw, "unreadable weight, clearing it");
                profile.remove(key);
            }
        }
    }

    ensure_array(profile, "weightHistory");
    if let Some(history) = profile.get_mut("weightHistory").and_then(Value::as_array_mut) {
        normalize_weight_history(history, dropped);
    }

    let current = profile.get("currentWeight").and_then(Value::as_f64);
    let history_empty = profile
        .get("weightHistory")
        .and_then(Value::as_array)
        .is_none_or(Vec::is_empty);

    if let (Some(weight), true) = (current, history_empty) {
        if let Some(history) = profile.get_mut("weightHistory").and_then(Value::as_array_mut) {
            history.push(serde_json::json!({ "date": date_value(today), "weight": weight }));
        }
        tracing::info!(weight, %today, "backfilled weight history from current weight");
    }
}

/// One sample per date. A later sample for a date overwrites the weight of
/// the first, keeping the first one's position.
fn normalize_weight_history(history: &mut Vec<Value>, dropped: &mut usize) {
    retain_counted(history, dropped, |entry| {
        let Some(weight) = entry.get("weight").and_then(weight_value) else {
            warn!(entry = %entry, "dropping weight sample without a readable weight");
            return false;
        };
        if let Some(obj) = entry.as_object_mut() {
            obj.insert("weight".to_string(), Value::from(weight));
        }
        rewrite_date(entry, "date")
    });

    let mut merged: Vec<Value> = Vec::with_capacity(history.len());
    for entry in history.drain(..) {
        match merged.iter_mut().find(|m| m.get("date") == entry.get("date")) {
            Some(target) => {
                if let (Some(obj), Some(weight)) = (target.as_object_mut(), entry.get("weight")) {
                    obj.insert("weight".to_string(), weight.clone());
                }
            }
            None => merged.push(entry),
        }
    }
    *history = merged;
}

fn normalize_logs(logs: &mut Vec<Value>, dropped: &mut usize) {
    retain_counted(logs, dropped, |log| {
        if let Some(obj) = log.as_object_mut() {
            ensure_array(obj, "completedTasks");
            if let Some(tasks) = obj.get_mut("completedTasks").and_then(Value::as_array_mut) {
                tasks.retain(Value::is_string);
            }
        }
        rewrite_date(log, "date")
    });

    // Legacy keys written in different locales can land on the same date.
    let mut merged: Vec<Value> = Vec::with_capacity(logs.len());
    for log in logs.drain(..) {
        let existing = merged.iter_mut().find(|m| m.get("date") == log.get("date"));
        match existing {
            Some(target) => {
                let incoming = log
                    .get("completedTasks")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default();
                if let Some(tasks) = target.get_mut("completedTasks").and_then(Value::as_array_mut) {
                    for task in incoming {
                        if !tasks.contains(&task) {
                            tasks.push(task);
                        }
                    }
                }
            }
            None => merged.push(log),
        }
    }
    *logs = merged;
}

fn normalize_habits(habits: &mut Vec<Value>, now: Timestamp, dropped: &mut usize) {
    retain_counted(habits, dropped, |habit| habit.get("title").is_some_and(Value::is_string));
    for habit in habits.iter_mut() {
        let Some(obj) = habit.as_object_mut() else {
            continue;
        };
        ensure_uuid(obj);
        ensure_timestamp(obj, "createdAt", now);
        ensure_array(obj, "datesCompleted");

        if let Some(dates) = obj.get_mut("datesCompleted").and_then(Value::as_array_mut) {
            retain_counted(dates, dropped, |d| {
                let Some(date) = d.as_str().and_then(|s| parse_calendar_date(s).ok()) else {
                    warn!(value = %d, "dropping unreadable habit check-in date");
                    return false;
                };
                *d = date_value(date);
                true
            });
            // Duplicates are the same check-in, not lost data.
            let mut unique = Vec::new();
            dates.retain(|d| {
                if unique.contains(d) {
                    false
                } else {
                    unique.push(d.clone());
                    true
                }
            });
        }
    }
}

fn normalize_messages(messages: &mut Vec<Value>, now: Timestamp, dropped: &mut usize) {
    retain_counted(messages, dropped, |message| {
        matches!(
            message.get("sender").and_then(Value::as_str),
            Some("user" | "bot")
        )
    });
    for message in messages.iter_mut() {
        let Some(obj) = message.as_object_mut() else {
            continue;
        };
        ensure_uuid(obj);
        ensure_timestamp(obj, "timestamp", now);
        if !obj.get("text").is_some_and(Value::is_string) {
            obj.insert("text".to_string(), Value::String(String::new()));
        }
        if obj.get("image").is_some_and(|v| !v.is_string()) {
            obj.remove("image");
        }
    }
}

/// `Vec::retain_mut` that counts what it removes.
fn retain_counted<F>(items: &mut Vec<Value>, dropped: &mut usize, mut keep: F)
where
    F: FnMut(&mut Value) -> bool,
{
    let before = items.len();
    items.retain_mut(|item| keep(item));
    *dropped += before - items.len();
}

/// Replace a missing or `null` field with an empty array.
fn ensure_array(obj: &mut Map<String, Value>, key: &str) {
    if !obj.get(key).is_some_and(Value::is_array) {
        obj.insert(key.to_string(), Value::Array(Vec::new()));
    }
}

fn ensure_uuid(obj: &mut Map<String, Value>) {
    let valid = obj
        .get("id")
        .and_then(Value::as_str)
        .is_some_and(|s| Uuid::parse_str(s).is_ok());
    if !valid {
        obj.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
    }
}

/// Accept RFC 3339 strings as-is; convert epoch milliseconds; default to `now`.
fn ensure_timestamp(obj: &mut Map<String, Value>, key: &str, now: Timestamp) {
    let ts = match obj.get(key) {
        Some(Value::String(s)) if s.parse::<Timestamp>().is_ok() => return,
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(|ms| Timestamp::from_millisecond(ms).ok())
            .unwrap_or(now),
        _ => now,
    };
    obj.insert(key.to_string(), Value::String(ts.to_string()));
}

/// Rewrite `entry[field]` as an ISO date. Returns `false` if it can't be read.
fn rewrite_date(entry: &mut Value, field: &str) -> bool {
    let parsed = entry
        .get(field)
        .and_then(Value::as_str)
        .map(parse_calendar_date);

    if let Some(Ok(date)) = parsed {
        if let Some(obj) = entry.as_object_mut() {
            obj.insert(field.to_string(), date_value(date));
            return true;
        }
    }

    warn!(entry = %entry, "dropping entry with unreadable date");
    false
}

/// Ages from numbers (whole or not) or numeric text.
fn age_value(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0)
                    .map(|f| f.round() as u64)
            })
            .and_then(|age| u32::try_from(age).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn weight_value(value: &Value) -> Option<f64> {
    let weight = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    weight.filter(|w| w.is_finite())
}

fn date_value(date: Date) -> Value {
    Value::String(date.to_string())
}
