use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::daily_log::DailyLog;
use super::habit::Habit;
use super::message::Message;
use super::profile::UserProfile;

/// The root document. Exactly one exists per installation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    #[serde(default)]
    pub profile: UserProfile,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub logs: Vec<DailyLog>,
    /// Ordered task descriptions; replaced wholesale, never merged.
    #[serde(default)]
    pub current_plan: Vec<String>,
    #[serde(default)]
    pub habits: Vec<Habit>,
    pub last_plan_update: Date,
}

impl AppState {
    /// The document a fresh installation starts with.
    pub fn initial(today: Date) -> Self {
        Self {
            profile: UserProfile::default(),
            messages: Vec::new(),
            logs: Vec::new(),
            current_plan: Vec::new(),
            habits: Vec::new(),
            last_plan_update: today,
        }
    }

    /// The log for `date`, appended if missing.
    pub fn log_for_mut(&mut self, date: Date) -> &mut DailyLog {
        let idx = match self.logs.iter().position(|l| l.date == date) {
            Some(idx) => idx,
            None => {
                self.logs.push(DailyLog::new(date));
                self.logs.len() - 1
            }
        };
        &mut self.logs[idx]
    }

    pub fn habit_mut(&mut self, id: Uuid) -> Option<&mut Habit> {
        self.habits.iter_mut().find(|h| h.id == id)
    }

    /// The last `n` messages, oldest first.
    pub fn recent_messages(&self, n: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }
}
