use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

use mycoach_core::models::app_state::AppState;
use mycoach_core::models::message::Message;
use mycoach_model::coach;
use mycoach_model::model::CoachModel;
use mycoach_model::reply::CoachReply;
use mycoach_storage::backend::StateBackend;
use mycoach_storage::store::StateStore;

use crate::error::SessionError;
use crate::staging::{PlanStaging, StagedPlan};

/// Bot message written when a model call fails.
pub const INTERRUPTION_MESSAGE: &str =
    "Momentum interruption. Re-sending signal. Give it another shot, I'm still locked in.";

/// What a turn changed.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// The document after every mutation of the turn.
    pub state: AppState,
    /// The bot message appended for this turn.
    pub reply: Message,
    /// The plan staged by this turn, if it proposed one.
    pub staged: Option<StagedPlan>,
    /// Habit titles created by this turn.
    pub habits_added: Vec<String>,
    /// The model call failed and `reply` is the interruption notice.
    pub interrupted: bool,
}

/// One user's coaching conversation.
///
/// Holds no document state of its own: every read and write goes through
/// the store. While a model call is outstanding the session is busy and
/// further sends are refused.
pub struct CoachSession<B, M> {
    store: Arc<StateStore<B>>,
    model: M,
    staging: PlanStaging,
    busy: AtomicBool,
}

impl<B: StateBackend, M: CoachModel> CoachSession<B, M> {
    pub fn new(store: Arc<StateStore<B>>, model: M) -> Self {
        Self {
            store,
            model,
            staging: PlanStaging::new(),
            busy: AtomicBool::new(false),
        }
    }

    pub fn store(&self) -> &StateStore<B> {
        &self.store
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn staged_plan(&self) -> Option<StagedPlan> {
        self.staging.peek()
    }

    /// Send one user turn.
    ///
    /// The user message is stored before the model is called. A model
    /// failure is not an error here: it yields an interruption message and
    /// the user can simply send again.
    pub async fn send(&self, text: &str, image: Option<String>) -> Result<TurnOutcome, SessionError> {
        if text.trim().is_empty() && image.is_none() {
            return Err(SessionError::EmptyInput);
        }
        let _busy = BusyGuard::acquire(&self.busy).ok_or(SessionError::Busy)?;

        let clock = self.store.clock();
        let before = self.store.load()?;

        let user_message = Message::user(text, image.clone(), clock.now());
        self.store.add_message(user_message)?;

        info!(history = before.messages.len(), has_image = image.is_some(), "sending turn");

        let result = coach::coach_reply(
            &self.model,
            &before.profile,
            &before.messages,
            text,
            image.as_deref(),
        )
        .await;

        match result {
            Ok(reply) => self.apply_reply(reply, true),
            Err(e) => {
                warn!(error = %e, "coach reply failed");
                let notice = Message::bot(INTERRUPTION_MESSAGE, self.store.clock().now());
                let state = self.store.add_message(notice.clone())?;
                Ok(TurnOutcome {
                    state,
                    reply: notice,
                    staged: None,
                    habits_added: Vec::new(),
                    interrupted: true,
                })
            }
        }
    }

    /// Open an empty conversation with a greeting and a Day 1 plan.
    ///
    /// Returns `None` when the conversation already has messages.
    pub async fn greet(&self) -> Result<Option<TurnOutcome>, SessionError> {
        let _busy = BusyGuard::acquire(&self.busy).ok_or(SessionError::Busy)?;

        let state = self.store.load()?;
        if !state.messages.is_empty() {
            return Ok(None);
        }

        let reply = coach::greeting(&self.model, &state.profile).await;
        self.apply_reply(reply, false).map(Some)
    }

    /// A motivational message about the current plan. Not stored.
    pub async fn motivate(&self) -> Result<String, SessionError> {
        let state = self.store.load()?;
        Ok(coach::motivation(&self.model, &state.profile, &state.current_plan).await)
    }

    /// Commit the staged plan as the current plan.
    ///
    /// Returns `None` when nothing is staged.
    pub fn confirm_plan(&self) -> Result<Option<AppState>, SessionError> {
        let Some(staged) = self.staging.take() else {
            return Ok(None);
        };

        match self.store.update_current_plan(staged.plan.clone()) {
            Ok(state) => {
                info!(origin = %staged.message_id, "staged plan confirmed");
                Ok(Some(state))
            }
            Err(e) => {
                self.staging.restore(staged);
                Err(e.into())
            }
        }
    }

    fn apply_reply(&self, reply: CoachReply, apply_habits: bool) -> Result<TurnOutcome, SessionError> {
        let bot_message = Message::bot(reply.chat_response, self.store.clock().now());
        let mut state = self.store.add_message(bot_message.clone())?;

        let staged = if reply.suggested_plan.is_empty() {
            None
        } else {
            let staged = StagedPlan {
                message_id: bot_message.id,
                plan: reply.suggested_plan,
            };
            self.staging.stage(staged.clone());
            Some(staged)
        };

        let mut habits_added = Vec::new();
        if apply_habits {
            for title in reply.new_habits {
                state = self.store.add_habit(&title)?;
                habits_added.push(title);
            }
        }

        Ok(TurnOutcome {
            state,
            reply: bot_message,
            staged,
            habits_added,
            interrupted: false,
        })
    }
}

/// Holds the busy flag for the lifetime of a call.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
