use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A recurring commitment tracked independently of the daily plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: Uuid,
    pub title: String,
    /// Check-in dates. Set semantics; order is insertion order.
    #[serde(default)]
    pub dates_completed: Vec<Date>,
    pub created_at: jiff::Timestamp,
}

impl Habit {
    pub fn new(title: impl Into<String>, created_at: jiff::Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            dates_completed: Vec::new(),
            created_at,
        }
    }

    pub fn is_done_on(&self, date: Date) -> bool {
        self.dates_completed.contains(&date)
    }

    /// Check in on `date`, or undo the check-in if one exists.
    pub fn toggle(&mut self, date: Date) {
        if self.is_done_on(date) {
            self.dates_completed.retain(|d| *d != date);
        } else {
            self.dates_completed.push(date);
        }
    }
}
