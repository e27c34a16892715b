use std::fmt::Write;

use jiff::civil::Date;

use mycoach_core::models::app_state::AppState;
use mycoach_core::stats;

/// Today's plan with completion marks, numbered from 1.
pub fn render_plan(state: &AppState, today: Date) -> String {
    if state.current_plan.is_empty() {
        return "No plan yet. Ask your coach for one.".to_string();
    }

    let done = stats::completed_today(&state.logs, today);
    let mut out = format!("Plan (set {}):\n", state.last_plan_update);
    for (i, task) in state.current_plan.iter().enumerate() {
        let mark = if done.iter().any(|t| t == task) { "x" } else { " " };
        let _ = writeln!(out, "  {}. [{mark}] {task}", i + 1);
    }
    out.trim_end().to_string()
}

/// Streaks, check-ins, habits and weight.
pub fn render_summary(state: &AppState, today: Date) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Streak: {} day(s)", stats::app_streak(&state.logs, today));
    let _ = writeln!(out, "Check-ins: {}", stats::total_check_ins(&state.logs));
    let _ = writeln!(
        out,
        "Today: {}/{} tasks",
        stats::completed_today(&state.logs, today).len(),
        state.current_plan.len()
    );

    if let Some(entry) = stats::last_weight_update(&state.profile) {
        let _ = write!(out, "Weight: {} (logged {})", entry.weight, entry.date);
        if let Some(gap) = stats::weight_to_target(&state.profile) {
            let _ = write!(out, ", {gap:.1} to target");
        }
        out.push('\n');
    }

    if state.habits.is_empty() {
        out.push_str("Habits: none");
    } else {
        out.push_str("Habits:\n");
        for (i, habit) in state.habits.iter().enumerate() {
            let mark = if habit.is_done_on(today) { "x" } else { " " };
            let _ = writeln!(
                out,
                "  {}. [{mark}] {} ({} day streak)",
                i + 1,
                habit.title,
                stats::habit_streak(habit, today)
            );
        }
    }

    out.trim_end().to_string()
}
