use std::sync::Arc;

use jiff::civil::Date;
use tracing::{debug, info, warn};
use uuid::Uuid;

use mycoach_core::clock::Clock;
use mycoach_core::models::app_state::AppState;
use mycoach_core::models::habit::Habit;
use mycoach_core::models::message::Message;
use mycoach_core::models::profile::ProfileUpdate;
use mycoach_core::storage_keys;

use crate::backend::StateBackend;
use crate::error::StorageError;
use crate::migrate;

/// Sole owner of the persisted `AppState` document.
///
/// Every mutation loads the full document, applies one change, writes the
/// full document back, and returns it. There is no locking: the store
/// assumes a single writer. Two processes sharing a slot lose updates
/// last-write-wins.
pub struct StateStore<B> {
    backend: B,
    clock: Arc<dyn Clock>,
}

impl<B: StateBackend> StateStore<B> {
    pub fn new(backend: B, clock: Arc<dyn Clock>) -> Self {
        Self { backend, clock }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Load the document, or a fresh one if the slot is empty or unreadable.
    ///
    /// Corrupt contents are logged and treated as absent, and so are
    /// entries that cannot be read. Either way the raw bytes are first
    /// copied to [`storage_keys::APP_STATE_BACKUP`]. Only a backend that
    /// cannot be read at all produces an error.
    pub fn load(&self) -> Result<AppState, StorageError> {
        let today = self.clock.today();

        let Some(body) = self.backend.read(storage_keys::APP_STATE)? else {
            debug!("no stored state, starting fresh");
            return Ok(AppState::initial(today));
        };

        let mut json: serde_json::Value = match serde_json::from_slice(&body) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "stored state is not valid JSON, starting fresh");
                self.preserve(&body);
                return Ok(AppState::initial(today));
            }
        };

        let normalized = match migrate::normalize(&mut json, today, self.clock.now()) {
            Ok(normalized) => normalized,
            Err(e) => {
                warn!(error = %e, "stored state could not be normalized, starting fresh");
                self.preserve(&body);
                return Ok(AppState::initial(today));
            }
        };

        let state: AppState = match serde_json::from_value(json) {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "stored state does not match the document shape, starting fresh");
                self.preserve(&body);
                return Ok(AppState::initial(today));
            }
        };

        if normalized.dropped > 0 {
            warn!(dropped = normalized.dropped, "unreadable entries discarded from stored state");
            self.preserve(&body);
        }
        if normalized.changed {
            info!("stored state normalized to the current shape");
            self.persist(&state);
        }

        debug!(
            messages = state.messages.len(),
            logs = state.logs.len(),
            habits = state.habits.len(),
            "state loaded"
        );
        Ok(state)
    }

    /// Persist `state` and hand it back.
    ///
    /// A failed write is logged and swallowed. The returned document may
    /// then be ahead of what is stored until the next successful save.
    pub fn save(&self, state: AppState) -> AppState {
        self.persist(&state);
        state
    }

    /// Remove the stored document. The next `load` starts fresh.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.backend.remove(storage_keys::APP_STATE)?;
        info!("stored state cleared");
        Ok(())
    }

    /// Overwrite the given profile fields. A changed `current_weight` also
    /// upserts today's weight sample.
    pub fn update_profile(&self, update: ProfileUpdate) -> Result<AppState, StorageError> {
        self.mutate(|state, today| {
            let new_weight = update
                .current_weight
                .filter(|w| state.profile.current_weight != Some(*w));

            update.apply_to(&mut state.profile);

            if let Some(weight) = new_weight {
                state.profile.record_weight(today, weight);
                info!(weight, %today, "weight recorded");
            }
        })
    }

    /// Append a message. Callers keep the log in chronological order.
    pub fn add_message(&self, message: Message) -> Result<AppState, StorageError> {
        self.mutate(|state, _| state.messages.push(message))
    }

    /// Replace the current plan and stamp `last_plan_update` with today.
    ///
    /// Completions already logged under old task text are left as they are.
    pub fn update_current_plan(&self, plan: Vec<String>) -> Result<AppState, StorageError> {
        self.mutate(|state, today| {
            info!(tasks = plan.len(), "current plan replaced");
            state.current_plan = plan;
            state.last_plan_update = today;
        })
    }

    /// Mark `task` complete or incomplete in today's log.
    pub fn toggle_task_completion(
        &self,
        task: &str,
        completed: bool,
    ) -> Result<AppState, StorageError> {
        self.mutate(|state, today| state.log_for_mut(today).mark(task, completed))
    }

    pub fn add_habit(&self, title: &str) -> Result<AppState, StorageError> {
        let created_at = self.clock.now();
        self.mutate(|state, _| {
            let habit = Habit::new(title, created_at);
            info!(habit_id = %habit.id, title, "habit added");
            state.habits.push(habit);
        })
    }

    /// Remove a habit. Unknown ids are ignored.
    pub fn delete_habit(&self, id: Uuid) -> Result<AppState, StorageError> {
        self.mutate(|state, _| {
            state.habits.retain(|h| h.id != id);
        })
    }

    /// Check in on today for the habit, or undo today's check-in.
    pub fn toggle_habit_check_in(&self, id: Uuid) -> Result<AppState, StorageError> {
        self.mutate(|state, today| match state.habit_mut(id) {
            Some(habit) => habit.toggle(today),
            None => warn!(habit_id = %id, "check-in for unknown habit ignored"),
        })
    }

    fn mutate<F>(&self, apply: F) -> Result<AppState, StorageError>
    where
        F: FnOnce(&mut AppState, Date),
    {
        let mut state = self.load()?;
        apply(&mut state, self.clock.today());
        Ok(self.save(state))
    }

    /// Copy the raw stored bytes aside before any of them are discarded.
    fn preserve(&self, body: &[u8]) {
        match self.backend.write(storage_keys::APP_STATE_BACKUP, body) {
            Ok(()) => info!(key = storage_keys::APP_STATE_BACKUP, "raw stored state preserved"),
            Err(e) => warn!(error = %e, "failed to preserve raw stored state"),
        }
    }

    fn persist(&self, state: &AppState) {
        let body = match serde_json::to_vec(state) {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "failed to serialize state");
                return;
            }
        };

        match self.backend.write(storage_keys::APP_STATE, &body) {
            Ok(()) => debug!(bytes = body.len(), "state saved"),
            Err(e) => warn!(error = %e, "failed to save state; in-memory copy is ahead of storage"),
        }
    }
}
