//! Dashboard statistics derived from the stored document.

use std::collections::BTreeSet;

use jiff::civil::Date;

use crate::models::daily_log::DailyLog;
use crate::models::habit::Habit;
use crate::models::profile::{UserProfile, WeightEntry};

/// Length of the run of consecutive dates ending today, or ending
/// yesterday when today is not (yet) in the set. Dates after `today` are
/// ignored.
pub fn consecutive_days<I>(dates: I, today: Date) -> u32
where
    I: IntoIterator<Item = Date>,
{
    let dates: BTreeSet<Date> = dates.into_iter().collect();

    let mut cursor = if dates.contains(&today) {
        today
    } else {
        match today.yesterday() {
            Ok(yesterday) if dates.contains(&yesterday) => yesterday,
            _ => return 0,
        }
    };

    let mut streak = 0;
    while dates.contains(&cursor) {
        streak += 1;
        match cursor.yesterday() {
            Ok(prev) => cursor = prev,
            Err(_) => break,
        }
    }
    streak
}

/// Consecutive days with a daily log entry.
pub fn app_streak(logs: &[DailyLog], today: Date) -> u32 {
    consecutive_days(logs.iter().map(|l| l.date), today)
}

pub fn habit_streak(habit: &Habit, today: Date) -> u32 {
    consecutive_days(habit.dates_completed.iter().copied(), today)
}

/// Completed tasks summed over every log.
pub fn total_check_ins(logs: &[DailyLog]) -> usize {
    logs.iter().map(|l| l.completed_tasks.len()).sum()
}

pub fn completed_today<'a>(logs: &'a [DailyLog], today: Date) -> &'a [String] {
    logs.iter()
        .find(|l| l.date == today)
        .map(|l| l.completed_tasks.as_slice())
        .unwrap_or(&[])
}

pub fn last_weight_update(profile: &UserProfile) -> Option<&WeightEntry> {
    profile.latest_weight_entry()
}

/// Absolute distance between current and target weight, when both are set.
pub fn weight_to_target(profile: &UserProfile) -> Option<f64> {
    match (profile.current_weight, profile.target_weight) {
        (Some(current), Some(target)) => Some((target - current).abs()),
        _ => None,
    }
}
