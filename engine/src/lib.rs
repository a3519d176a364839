//! # Famlink Engine
//!
//! Offline-first submission and form-editing logic for the Famlink
//! family-form application (Family Introduction Sheets and Family
//! Progress Reports).
//!
//! The engine owns the parts of the application that have to survive
//! connectivity loss:
//!
//! - **Local persistence** ([`LocalStore`]) - a synchronous string-keyed
//!   JSON store, with a no-op implementation for execution contexts that
//!   have no durable medium.
//! - **Reactive answer state** ([`AnswerState`]) - an observable map from
//!   question id to answer value, persisted on every change once the
//!   initial load has completed.
//! - **Delta tracker** ([`DeltaTracker`]) - append-only lists of pending
//!   add/update/delete edits to form sections and fields, replayed
//!   against the remote store when the editor confirms.
//! - **Submission queue** ([`SubmissionQueue`]) - a FIFO of completed
//!   form submissions waiting for connectivity, drained by
//!   [`sync_offline_queue`].
//! - **Remote gateway** ([`RemoteGateway`]) - the table-scoped CRUD
//!   contract of the hosted database service. The engine never talks to
//!   the network itself; callers supply an implementation.
//!
//! ## Durability contract
//!
//! Answer state and the submission queue are fully re-derivable from the
//! [`LocalStore`] alone: no in-memory state is load-bearing across a
//! process restart. A sync pass never loses a queue entry - entries that
//! fail remote submission reappear in the persisted queue in their
//! original relative order, while successes are compacted out.
//!
//! ## Concurrency model
//!
//! Single writer. All gateway calls are awaited one at a time, so replay
//! order is deterministic and matches list order. Multi-tab or
//! multi-admin mutation is explicitly out of scope.

pub mod answers;
pub mod clock;
pub mod delta;
pub mod error;
pub mod gateway;
pub mod notify;
pub mod online;
pub mod queue;
pub mod storage;
pub mod structure;
pub mod sync;
pub mod value;

#[cfg(test)]
pub(crate) mod test_support;

pub use answers::AnswerState;
pub use clock::{Clock, SystemClock};
pub use delta::{
    ChangeKind, DeltaTracker, FieldDelta, FieldOption, FieldPatch, SectionDelta, SectionPatch,
};
pub use error::Error;
pub use gateway::{
    Filter, OrderBy, RemoteGateway, Select, FIS_ANSWERS_LIST_TABLE, FIS_ANSWERS_TABLE, FORMS_TABLE,
    FORM_FIELDS_TABLE, FORM_SECTIONS_TABLE, FPR_ANSWERS_LIST_TABLE, FPR_ANSWERS_TABLE,
};
pub use notify::{Notice, NoticeKind, Notifier};
pub use online::OnlineStatus;
pub use queue::{FormType, OfflineSubmission, SubmissionPayload, SubmissionQueue};
pub use storage::{LocalStore, MemoryStore, NoopStore};
pub use structure::{FormCache, FormField, FormSection, FormStructure};
pub use sync::{submit_entry, sync_offline_queue, SyncOutcome};
pub use value::{AnswerMap, AnswerValue};

/// Type aliases for clarity
pub type QuestionId = String;
pub type FormId = String;
pub type SectionId = String;
pub type FieldId = String;
