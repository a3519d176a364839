//! End-to-end offline scenarios for famlink-engine
//!
//! These drive the public API only: answer state over a shared store,
//! the submission queue, and a sync pass against a scripted gateway.

use async_trait::async_trait;
use famlink_engine::{
    sync_offline_queue, AnswerMap, AnswerState, AnswerValue, Filter, FormType, LocalStore,
    MemoryStore, NoticeKind, Notifier, RemoteGateway, Select, SubmissionPayload, SubmissionQueue,
};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

const QUEUE_KEY: &str = "offlineSubmissions";

/// Gateway whose inserts can be switched between failing and accepting.
#[derive(Default)]
struct FlakyGateway {
    offline: AtomicBool,
    next_id: AtomicI64,
    inserted: Mutex<Vec<(String, Value)>>,
}

impl FlakyGateway {
    fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn inserted_into(&self, table: &str) -> Vec<Value> {
        self.inserted
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, _)| t == table)
            .map(|(_, row)| row.clone())
            .collect()
    }
}

#[async_trait]
impl RemoteGateway for FlakyGateway {
    async fn select(
        &self,
        _table: &str,
        _query: Select,
    ) -> famlink_engine::error::Result<Vec<Value>> {
        Ok(Vec::new())
    }

    async fn insert(
        &self,
        table: &str,
        rows: Vec<Value>,
    ) -> famlink_engine::error::Result<Vec<Value>> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(famlink_engine::Error::gateway(table, "network unreachable"));
        }

        let mut stored = self.inserted.lock().unwrap();
        let echoed: Vec<Value> = rows
            .into_iter()
            .map(|mut row| {
                if table.ends_with("_answers") {
                    let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
                    if let Some(object) = row.as_object_mut() {
                        object.insert("answer_id".into(), Value::from(id));
                    }
                }
                stored.push((table.to_string(), row.clone()));
                row
            })
            .collect();
        Ok(echoed)
    }

    async fn update(
        &self,
        _table: &str,
        _patch: Value,
        _filter: Filter,
    ) -> famlink_engine::error::Result<Vec<Value>> {
        Ok(Vec::new())
    }

    async fn delete(&self, _table: &str, _filter: Filter) -> famlink_engine::error::Result<()> {
        Ok(())
    }
}

fn fpr_payload() -> SubmissionPayload {
    let mut answers = AnswerMap::new();
    answers.insert("q1".into(), AnswerValue::Text("yes".into()));
    SubmissionPayload {
        form_id: "F1".into(),
        form_type: FormType::Fpr,
        subject_name: None,
        answers,
        filled_out_by: "worker-7".into(),
        subject_id: "family-3".into(),
    }
}

#[tokio::test]
async fn queued_submission_survives_failure_then_syncs() {
    let store = Arc::new(MemoryStore::new());
    let queue = SubmissionQueue::new(store.clone());
    let gateway = FlakyGateway::default();
    let notifier = Notifier::new();

    queue.enqueue(fpr_payload());

    // First pass while the remote is unreachable.
    gateway.set_offline(true);
    let outcome = sync_offline_queue(&queue, &gateway, &notifier).await;
    assert_eq!(outcome.failed, 1);

    let retained = queue.entries();
    assert_eq!(retained.len(), 1);
    assert_eq!(retained[0].payload, fpr_payload());
    assert!(!retained[0].timestamp.is_empty());

    // Connectivity returns; the retry drains the queue.
    gateway.set_offline(false);
    let outcome = sync_offline_queue(&queue, &gateway, &notifier).await;
    assert_eq!(outcome.synced, 1);
    assert_eq!(store.load(QUEUE_KEY), None);

    let parents = gateway.inserted_into("fpr_answers");
    assert_eq!(parents.len(), 1);
    assert_eq!(parents[0]["form_id"], "F1");

    let list = gateway.inserted_into("fpr_answers_list");
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["question_id"], "q1");
    assert_eq!(list[0]["answer"], "yes");
    assert_eq!(list[0]["answer_id"], 1);

    let kinds: Vec<NoticeKind> = notifier.active().iter().map(|n| n.kind).collect();
    assert_eq!(kinds, vec![NoticeKind::Error, NoticeKind::Success]);
}

#[tokio::test]
async fn full_offline_session() {
    let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
    let gateway = FlakyGateway::default();
    let notifier = Notifier::new();

    // Fill out a form while offline.
    let mut state = AnswerState::new(store.clone());
    state.load_offline_answers();
    state.insert("q1", "yes".into());
    state.insert(
        "q2",
        AnswerValue::Multi(vec!["school".into(), "clinic".into()]),
    );

    // Simulate a reload mid-session: answers come back from storage.
    let mut state = AnswerState::new(store.clone());
    state.load_offline_answers();
    assert_eq!(state.answers().len(), 2);

    // Submit: the completed form goes to the queue, answers reset.
    let payload = SubmissionPayload {
        form_id: "F1".into(),
        form_type: FormType::Fpr,
        subject_name: None,
        answers: state.answers().clone(),
        filled_out_by: "worker-7".into(),
        subject_id: "family-3".into(),
    };
    let queue = SubmissionQueue::new(store.clone());
    queue.enqueue(payload);
    state.clear_answers();
    state.clear_answers(); // idempotent
    assert!(state.is_empty());
    assert_eq!(store.load("offlineAnswers"), None);

    // Going online drains the queue.
    let outcome = sync_offline_queue(&queue, &gateway, &notifier).await;
    assert_eq!(outcome.synced, 1);
    assert!(queue.is_empty());
    assert_eq!(gateway.inserted_into("fpr_answers_list").len(), 2);
}

#[tokio::test]
async fn queue_only_shrinks_during_a_pass() {
    let store = Arc::new(MemoryStore::new());
    let queue = SubmissionQueue::new(store);
    let gateway = FlakyGateway::default();
    let notifier = Notifier::new();

    for _ in 0..3 {
        queue.enqueue(fpr_payload());
    }

    gateway.set_offline(true);
    sync_offline_queue(&queue, &gateway, &notifier).await;
    assert_eq!(queue.len(), 3);

    gateway.set_offline(false);
    sync_offline_queue(&queue, &gateway, &notifier).await;
    assert_eq!(queue.len(), 0);
}
