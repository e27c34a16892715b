use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use jiff::civil::date;
use tokio::sync::Notify;

use mycoach_core::clock::FixedClock;
use mycoach_core::models::message::Sender;
use mycoach_model::error::ModelError;
use mycoach_model::model::{CoachModel, CoachRequest};
use mycoach_session::error::SessionError;
use mycoach_session::session::{CoachSession, INTERRUPTION_MESSAGE};
use mycoach_storage::backend::{MemoryBackend, StateBackend};
use mycoach_storage::error::StorageError;
use mycoach_storage::store::StateStore;

/// Replays canned results and records every request.
#[derive(Default)]
struct Scripted {
    replies: Mutex<VecDeque<Result<String, ModelError>>>,
    requests: Mutex<Vec<CoachRequest>>,
}

impl Scripted {
    fn with<I: IntoIterator<Item = Result<String, ModelError>>>(replies: I) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::default(),
        }
    }

    fn next(&self) -> Result<String, ModelError> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ModelError::Invocation("script exhausted".to_string())))
    }
}

impl CoachModel for Scripted {
    async fn converse(&self, request: &CoachRequest) -> Result<String, ModelError> {
        self.requests.lock().unwrap().push(request.clone());
        self.next()
    }

    async fn generate_text(&self, _system_prompt: &str, _prompt: &str) -> Result<String, ModelError> {
        self.next()
    }
}

/// Blocks every call until released.
#[derive(Default)]
struct Gated {
    release: Notify,
}

impl CoachModel for Gated {
    async fn converse(&self, _request: &CoachRequest) -> Result<String, ModelError> {
        self.release.notified().await;
        Ok(r#"{"chatResponse":"done"}"#.to_string())
    }

    async fn generate_text(&self, _system_prompt: &str, _prompt: &str) -> Result<String, ModelError> {
        self.release.notified().await;
        Ok("done".to_string())
    }
}

fn store() -> Arc<StateStore<MemoryBackend>> {
    let clock = Arc::new(FixedClock::on(date(2026, 10, 16)).unwrap());
    Arc::new(StateStore::new(MemoryBackend::new(), clock))
}

/// Memory slots whose reads fail while `offline` is set.
#[derive(Default)]
struct Flaky {
    inner: MemoryBackend,
    offline: AtomicBool,
}

impl StateBackend for Flaky {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StorageError::Read {
                key: key.to_string(),
                source: std::io::Error::other("offline"),
            });
        }
        self.inner.read(key)
    }

    fn write(&self, key: &str, body: &[u8]) -> Result<(), StorageError> {
        self.inner.write(key, body)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key)
    }
}

fn ok(json: &str) -> Result<String, ModelError> {
    Ok(json.to_string())
}

#[tokio::test]
async fn send_stores_both_sides_of_the_turn() {
    let session = CoachSession::new(store(), Scripted::with([ok(r#"{"chatResponse":"Let's work"}"#)]));

    let outcome = session.send("I'm ready", None).await.unwrap();
    assert!(!outcome.interrupted);
    assert_eq!(outcome.reply.text, "Let's work");
    assert!(outcome.staged.is_none());

    let messages = &outcome.state.messages;
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].sender, Sender::User);
    assert_eq!(messages[0].text, "I'm ready");
    assert_eq!(messages[1].sender, Sender::Bot);
    assert!(!session.is_busy());
}

#[tokio::test]
async fn history_excludes_the_new_input() {
    let session = CoachSession::new(
        store(),
        Scripted::with([ok(r#"{"chatResponse":"one"}"#), ok(r#"{"chatResponse":"two"}"#)]),
    );

    session.send("first", None).await.unwrap();
    session.send("second", None).await.unwrap();

    let requests = session.model().requests.lock().unwrap();
    assert!(requests[0].history.is_empty());
    assert_eq!(requests[1].history.len(), 2);
    assert_eq!(requests[1].history[0].content, "first");
    assert_eq!(requests[1].history[1].content, "one");
    assert_eq!(requests[1].input, "second");
}

#[tokio::test]
async fn empty_input_is_rejected() {
    let session = CoachSession::new(store(), Scripted::default());
    let err = session.send("   ", None).await.unwrap_err();
    assert!(matches!(err, SessionError::EmptyInput));
    assert!(session.store().load().unwrap().messages.is_empty());
}

#[tokio::test]
async fn image_only_send_is_accepted() {
    let session = CoachSession::new(store(), Scripted::with([ok("Solid squat depth.")]));
    let outcome = session
        .send("", Some("data:image/jpeg;base64,aGVsbG8=".to_string()))
        .await
        .unwrap();

    assert_eq!(outcome.reply.text, "Solid squat depth.");
    assert!(outcome.state.messages[0].image.is_some());
}

#[tokio::test]
async fn model_failure_appends_one_interruption_message() {
    let session = CoachSession::new(
        store(),
        Scripted::with([Err(ModelError::Invocation("quota".to_string()))]),
    );

    let outcome = session.send("hello?", None).await.unwrap();
    assert!(outcome.interrupted);
    assert_eq!(outcome.reply.text, INTERRUPTION_MESSAGE);
    assert_eq!(outcome.state.messages.len(), 2);
    assert_eq!(session.model().requests.lock().unwrap().len(), 1);
    assert!(!session.is_busy());
}

#[tokio::test]
async fn suggested_plan_is_staged_not_applied() {
    let session = CoachSession::new(
        store(),
        Scripted::with([ok(
            r#"{"chatResponse":"Plan: Walk 10k steps. Add it?","suggestedPlan":["Walk 10k steps"]}"#,
        )]),
    );

    let outcome = session.send("plan my day", None).await.unwrap();
    let staged = outcome.staged.unwrap();
    assert_eq!(staged.message_id, outcome.reply.id);
    assert_eq!(staged.plan, vec!["Walk 10k steps".to_string()]);
    assert!(outcome.state.current_plan.is_empty());

    let state = session.confirm_plan().unwrap().unwrap();
    assert_eq!(state.current_plan, vec!["Walk 10k steps".to_string()]);
    assert!(session.staged_plan().is_none());
    assert!(session.confirm_plan().unwrap().is_none());
}

#[tokio::test]
async fn newer_staged_plan_supersedes_older() {
    let session = CoachSession::new(
        store(),
        Scripted::with([
            ok(r#"{"chatResponse":"Walk today","suggestedPlan":["Walk"]}"#),
            ok(r#"{"chatResponse":"Swim today","suggestedPlan":["Swim"]}"#),
        ]),
    );

    let m1 = session.send("plan", None).await.unwrap();
    let m2 = session.send("actually, swim", None).await.unwrap();
    assert_ne!(m1.reply.id, m2.reply.id);
    assert_eq!(session.staged_plan().unwrap().message_id, m2.reply.id);

    let state = session.confirm_plan().unwrap().unwrap();
    assert_eq!(state.current_plan, vec!["Swim".to_string()]);
}

#[tokio::test]
async fn reply_without_plan_keeps_the_staged_one() {
    let session = CoachSession::new(
        store(),
        Scripted::with([
            ok(r#"{"chatResponse":"Walk today","suggestedPlan":["Walk"]}"#),
            ok(r#"{"chatResponse":"Any questions?"}"#),
        ]),
    );

    let m1 = session.send("plan", None).await.unwrap();
    session.send("hmm", None).await.unwrap();
    assert_eq!(session.staged_plan().unwrap().message_id, m1.reply.id);
}

#[tokio::test]
async fn new_habits_are_applied_immediately() {
    let session = CoachSession::new(
        store(),
        Scripted::with([ok(
            r#"{"chatResponse":"Tracking it.","newHabits":["Meditate","Journal"]}"#,
        )]),
    );

    let outcome = session.send("track meditation and journaling", None).await.unwrap();
    assert_eq!(outcome.habits_added, vec!["Meditate".to_string(), "Journal".to_string()]);

    let titles: Vec<_> = outcome.state.habits.iter().map(|h| h.title.as_str()).collect();
    assert_eq!(titles, ["Meditate", "Journal"]);
    assert_eq!(session.store().load().unwrap().habits.len(), 2);
}

#[tokio::test]
async fn greeting_only_opens_an_empty_conversation() {
    let session = CoachSession::new(store(), Scripted::with([Err(ModelError::EmptyResponse)]));

    let outcome = session.greet().await.unwrap().unwrap();
    assert_eq!(outcome.state.messages.len(), 1);
    assert_eq!(outcome.reply.sender, Sender::Bot);
    assert!(outcome.staged.is_some());

    assert!(session.greet().await.unwrap().is_none());
}

#[tokio::test]
async fn motivation_is_not_stored() {
    let session = CoachSession::new(store(), Scripted::with([ok("### You got this")]));
    assert_eq!(session.motivate().await.unwrap(), "### You got this");
    assert!(session.store().load().unwrap().messages.is_empty());
}

#[tokio::test]
async fn sends_are_refused_while_a_reply_is_outstanding() {
    let session = CoachSession::new(store(), Gated::default());

    let first = session.send("one", None);
    tokio::pin!(first);

    // Drive the first send until it parks on the model call.
    tokio::select! {
        biased;
        _ = &mut first => panic!("first send finished before the model was released"),
        _ = tokio::task::yield_now() => {}
    }
    assert!(session.is_busy());

    let err = session.send("two", None).await.unwrap_err();
    assert!(matches!(err, SessionError::Busy));

    session.model().release.notify_one();
    let outcome = first.await.unwrap();
    assert_eq!(outcome.reply.text, "done");
    assert!(!session.is_busy());

    // Only the first turn reached the log.
    assert_eq!(outcome.state.messages.len(), 2);
}

#[tokio::test]
async fn failed_confirm_keeps_the_plan_staged() {
    let clock = Arc::new(FixedClock::on(date(2026, 10, 16)).unwrap());
    let store = Arc::new(StateStore::new(Flaky::default(), clock));
    let session = CoachSession::new(
        Arc::clone(&store),
        Scripted::with([ok(r#"{"chatResponse":"Try this","suggestedPlan":["Walk","Stretch"]}"#)]),
    );

    let outcome = session.send("plan my day", None).await.unwrap();
    let origin = outcome.reply.id;

    store.backend().offline.store(true, Ordering::SeqCst);
    let err = session.confirm_plan().unwrap_err();
    assert!(matches!(err, SessionError::Storage(StorageError::Read { .. })));

    let staged = session.staged_plan().unwrap();
    assert_eq!(staged.message_id, origin);
    assert_eq!(staged.plan, vec!["Walk".to_string(), "Stretch".to_string()]);

    store.backend().offline.store(false, Ordering::SeqCst);
    let state = session.confirm_plan().unwrap().unwrap();
    assert_eq!(state.current_plan, vec!["Walk".to_string(), "Stretch".to_string()]);
    assert!(session.staged_plan().is_none());
}
