//! The checkpoint hook (`spec.md` §4.4: "study/job state changes should be
//! checkpointed through an injected persistence interface, not hand-rolled
//! at each call site").
//!
//! Kept synchronous, matching `visibility_core::EventListener::on_event` —
//! checkpointing is driven from the same single-threaded orchestrator
//! mutation path as the rest of a study's state transitions, so there's
//! no async boundary to cross here.

use crate::job::Job;
use crate::study::Study;

/// Where a [`crate::orchestrator::StudyOrchestrator`] checkpoints study and
/// job state after every mutation.
pub trait Persistence: Send + Sync {
    /// Called after a study's top-level status or manifest changes.
    fn save_study(&self, study: &Study);

    /// Called after a single job's status or result changes.
    fn save_job(&self, job: &Job);
}

/// The default no-op persistence used when a caller doesn't need
/// durability (e.g. tests, or a study run entirely in-process).
#[derive(Debug, Default)]
pub struct InMemoryPersistence;

impl Persistence for InMemoryPersistence {
    fn save_study(&self, _study: &Study) {}

    fn save_job(&self, _job: &Job) {}
}
