//! The plan the model proposed but the user has not confirmed.
//!
//! ```text
//! none ──stage──▶ staged(plan, origin) ──take──▶ none (committed by caller)
//!                        │
//!                        └──stage──▶ staged(new plan, new origin)
//! ```
//!
//! At most one plan is staged. A newer proposal replaces the older one
//! outright; plans are never merged.

use std::sync::Mutex;

use tracing::info;
use uuid::Uuid;

/// A suggested plan and the bot message that proposed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedPlan {
    pub message_id: Uuid,
    pub plan: Vec<String>,
}

#[derive(Debug, Default)]
pub struct PlanStaging {
    current: Mutex<Option<StagedPlan>>,
}

impl PlanStaging {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage `plan`, discarding whatever was staged before.
    pub fn stage(&self, plan: StagedPlan) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = current.as_ref() {
            info!(
                superseded = %previous.message_id,
                origin = %plan.message_id,
                "staged plan superseded"
            );
        } else {
            info!(origin = %plan.message_id, tasks = plan.plan.len(), "plan staged");
        }
        *current = Some(plan);
    }

    /// Remove and return the staged plan.
    pub fn take(&self) -> Option<StagedPlan> {
        self.current.lock().unwrap_or_else(|e| e.into_inner()).take()
    }

    pub fn peek(&self) -> Option<StagedPlan> {
        self.current.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Whether the plan proposed by `message_id` is the one staged.
    pub fn is_staged_for(&self, message_id: Uuid) -> bool {
        self.current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|s| s.message_id == message_id)
    }

    /// Put a plan back if nothing newer has been staged meanwhile.
    pub(crate) fn restore(&self, plan: StagedPlan) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if current.is_none() {
            *current = Some(plan);
        }
    }
}
