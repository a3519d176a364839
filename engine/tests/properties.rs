//! Property tests for the engine's retry and durability invariants.
//!
//! The example-based tests pin single scenarios; these quantify over
//! arbitrary failure patterns and answer contents: the queue and the
//! delta tracker retain exactly the failures in order, and answer
//! snapshots survive a reload losslessly.

use async_trait::async_trait;
use famlink_engine::{
    sync_offline_queue, AnswerMap, AnswerState, AnswerValue, ChangeKind, DeltaTracker, FieldPatch,
    Filter, FormType, LocalStore, MemoryStore, Notifier, RemoteGateway, Select, SubmissionPayload,
    SubmissionQueue,
};
use proptest::prelude::*;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime")
}

/// Gateway that fails scripted form ids on insert and scripted target
/// ids on update/delete.
struct ScriptedGateway {
    fail_forms: HashSet<String>,
    fail_targets: HashSet<String>,
    next_id: Mutex<i64>,
}

impl ScriptedGateway {
    fn new(fail_forms: HashSet<String>, fail_targets: HashSet<String>) -> Self {
        Self {
            fail_forms,
            fail_targets,
            next_id: Mutex::new(0),
        }
    }

    fn target_of(filter: &Filter) -> Option<&str> {
        filter.0.first().and_then(|(_, value)| value.as_str())
    }
}

#[async_trait]
impl RemoteGateway for ScriptedGateway {
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
        for row in &rows {
            if let Some(form_id) = row.get("form_id").and_then(Value::as_str) {
                if self.fail_forms.contains(form_id) {
                    return Err(famlink_engine::Error::gateway(table, "scripted failure"));
                }
            }
        }
        Ok(rows
            .into_iter()
            .map(|mut row| {
                if table.ends_with("_answers") {
                    let mut next = self.next_id.lock().unwrap();
                    *next += 1;
                    if let Some(object) = row.as_object_mut() {
                        object.insert("answer_id".into(), Value::from(*next));
                    }
                }
                row
            })
            .collect())
    }

    async fn update(
        &self,
        table: &str,
        _patch: Value,
        filter: Filter,
    ) -> famlink_engine::error::Result<Vec<Value>> {
        match Self::target_of(&filter) {
            Some(id) if self.fail_targets.contains(id) => {
                Err(famlink_engine::Error::gateway(table, "scripted failure"))
            }
            _ => Ok(Vec::new()),
        }
    }

    async fn delete(&self, table: &str, filter: Filter) -> famlink_engine::error::Result<()> {
        match Self::target_of(&filter) {
            Some(id) if self.fail_targets.contains(id) => {
                Err(famlink_engine::Error::gateway(table, "scripted failure"))
            }
            _ => Ok(()),
        }
    }
}

fn payload(form_id: &str) -> SubmissionPayload {
    let mut answers = AnswerMap::new();
    answers.insert("q1".into(), AnswerValue::Text("yes".into()));
    SubmissionPayload {
        form_id: form_id.into(),
        form_type: FormType::Fpr,
        subject_name: None,
        answers,
        filled_out_by: "worker-7".into(),
        subject_id: "family-3".into(),
    }
}

fn answer_value() -> impl Strategy<Value = AnswerValue> {
    prop_oneof![
        "[ -~]{0,16}".prop_map(AnswerValue::Text),
        proptest::collection::vec("[ -~]{0,8}", 0..4).prop_map(AnswerValue::Multi),
        Just(AnswerValue::Empty),
    ]
}

proptest! {
    /// For any failure pattern over n queued entries, a sync pass
    /// leaves exactly the failed entries, in their original relative
    /// order; an all-success pass removes the queue key.
    #[test]
    fn sync_retains_exactly_the_failures_in_order(
        fails in proptest::collection::vec(any::<bool>(), 0..8),
    ) {
        runtime().block_on(async {
            let store = Arc::new(MemoryStore::new());
            let queue = SubmissionQueue::new(store.clone());

            let mut fail_forms = HashSet::new();
            let mut expected = Vec::new();
            for (i, fail) in fails.iter().enumerate() {
                let form_id = format!("F{i}");
                if *fail {
                    fail_forms.insert(form_id.clone());
                    expected.push(form_id.clone());
                }
                queue.enqueue(payload(&form_id));
            }

            let gateway = ScriptedGateway::new(fail_forms, HashSet::new());
            let notifier = Notifier::new();
            let outcome = sync_offline_queue(&queue, &gateway, &notifier).await;

            prop_assert_eq!(outcome.attempted, fails.len());
            prop_assert_eq!(outcome.failed, expected.len());
            prop_assert_eq!(outcome.synced, fails.len() - expected.len());

            let remaining: Vec<String> = queue
                .entries()
                .into_iter()
                .map(|e| e.payload.form_id)
                .collect();
            prop_assert_eq!(remaining, expected.clone());

            if expected.is_empty() {
                prop_assert!(store.load("offlineSubmissions").is_none());
            }
            Ok(())
        })?;
    }

    /// Any answer snapshot written through the state survives a
    /// simulated reload unchanged.
    #[test]
    fn answer_snapshots_roundtrip_across_reload(
        answers in proptest::collection::btree_map("[a-z0-9]{1,8}", answer_value(), 0..8),
    ) {
        let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());

        let mut first = AnswerState::new(store.clone());
        first.load_offline_answers();
        first.set(answers.clone());
        drop(first);

        let mut second = AnswerState::new(store);
        second.load_offline_answers();
        prop_assert_eq!(second.answers(), &answers);
    }

    /// For any failure pattern over recorded field deltas, confirm
    /// retains exactly the failed deltas in order, and a healthy retry
    /// drains them.
    #[test]
    fn confirm_retains_exactly_the_failed_deltas(
        fails in proptest::collection::vec(any::<bool>(), 0..8),
    ) {
        runtime().block_on(async {
            let mut tracker = DeltaTracker::new();
            let mut fail_targets = HashSet::new();
            let mut expected = Vec::new();
            for (i, fail) in fails.iter().enumerate() {
                let field_id = format!("f{i}");
                if *fail {
                    fail_targets.insert(field_id.clone());
                    expected.push(field_id.clone());
                }
                tracker.record_field_change(
                    ChangeKind::Update,
                    field_id,
                    FieldPatch {
                        label: Some(format!("Label {i}")),
                        ..Default::default()
                    },
                );
            }

            let gateway = ScriptedGateway::new(HashSet::new(), fail_targets);
            let ok = tracker.confirm_edits(&gateway).await;
            prop_assert_eq!(ok, expected.is_empty());

            let retained: Vec<String> = tracker
                .fields()
                .iter()
                .map(|d| d.field_id.clone())
                .collect();
            prop_assert_eq!(retained, expected);

            let healthy = ScriptedGateway::new(HashSet::new(), HashSet::new());
            prop_assert!(tracker.confirm_edits(&healthy).await);
            prop_assert!(tracker.is_empty());
            Ok(())
        })?;
    }
}
