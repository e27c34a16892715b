use jiff::civil::Date;
use serde::{Deserialize, Serialize};

pub const DEFAULT_COACH_NAME: &str = "YourAICoach";
pub const DEFAULT_AGE: u32 = 30;

/// Identity, goal, and body-weight tracking for the single user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub goal: String,
    pub coach_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_weight: Option<f64>,
    /// One sample per calendar date, in insertion order.
    pub weight_history: Vec<WeightEntry>,
    pub onboarding_completed: bool,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: String::new(),
            age: DEFAULT_AGE,
            gender: String::new(),
            goal: String::new(),
            coach_name: DEFAULT_COACH_NAME.to_string(),
            current_weight: None,
            target_weight: None,
            weight_history: Vec::new(),
            onboarding_completed: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub date: Date,
    pub weight: f64,
}

impl UserProfile {
    /// Upsert the sample for `date`: overwrite it if one exists, append
    /// otherwise.
    pub fn record_weight(&mut self, date: Date, weight: f64) {
        match self.weight_history.iter_mut().find(|w| w.date == date) {
            Some(entry) => entry.weight = weight,
            None => self.weight_history.push(WeightEntry { date, weight }),
        }
    }

    pub fn latest_weight_entry(&self) -> Option<&WeightEntry> {
        self.weight_history.last()
    }
}

/// A partial profile. `None` fields leave the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub goal: Option<String>,
    pub coach_name: Option<String>,
    pub current_weight: Option<f64>,
    pub target_weight: Option<f64>,
    pub onboarding_completed: Option<bool>,
}

impl ProfileUpdate {
    pub fn current_weight(weight: f64) -> Self {
        Self {
            current_weight: Some(weight),
            ..Self::default()
        }
    }

    /// Shallow field overwrite. Weight history is the caller's concern.
    pub fn apply_to(self, profile: &mut UserProfile) {
        if let Some(name) = self.name {
            profile.name = name;
        }
        if let Some(age) = self.age {
            profile.age = age;
        }
        if let Some(gender) = self.gender {
            profile.gender = gender;
        }
        if let Some(goal) = self.goal {
            profile.goal = goal;
        }
        if let Some(coach_name) = self.coach_name {
            profile.coach_name = coach_name;
        }
        if let Some(weight) = self.current_weight {
            profile.current_weight = Some(weight);
        }
        if let Some(weight) = self.target_weight {
            profile.target_weight = Some(weight);
        }
        if let Some(done) = self.onboarding_completed {
            profile.onboarding_completed = done;
        }
    }
}
