use jiff::civil::Date;
use serde::{Deserialize, Serialize};

/// Plan tasks completed on one calendar date.
///
/// Tasks are identified by their text. Renaming a plan item leaves its old
/// completions behind under the old text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLog {
    pub date: Date,
    #[serde(default)]
    pub completed_tasks: Vec<String>,
}

impl DailyLog {
    pub fn new(date: Date) -> Self {
        Self {
            date,
            completed_tasks: Vec::new(),
        }
    }

    pub fn is_completed(&self, task: &str) -> bool {
        self.completed_tasks.iter().any(|t| t == task)
    }

    /// Idempotent set insert (`completed`) or remove (`!completed`).
    pub fn mark(&mut self, task: &str, completed: bool) {
        if completed {
            if !self.is_completed(task) {
                self.completed_tasks.push(task.to_string());
            }
        } else {
            self.completed_tasks.retain(|t| t != task);
        }
    }
}
