//! Orchestrator-emitted events: the single tagged-variant channel a caller
//! drains instead of polling study state (`spec.md` §9 redesign flag:
//! "replace ad-hoc listener arrays with one tagged event type and a single
//! drain channel").

use std::time::Instant;
use visibility_core::{JobId, StudyId};

use crate::study::StudyStatus;

/// Events emitted by a [`crate::orchestrator::StudyOrchestrator`] as
/// studies and jobs move through their lifecycles.
#[derive(Debug, Clone)]
pub enum OrchestratorEvent {
    StudyCreated {
        study_id: StudyId,
        cell_count: usize,
        timestamp: Instant,
    },
    StudyStatusChanged {
        study_id: StudyId,
        from: StudyStatus,
        to: StudyStatus,
        timestamp: Instant,
    },
    JobStarted {
        study_id: StudyId,
        job_id: JobId,
        timestamp: Instant,
    },
    JobCompleted {
        study_id: StudyId,
        job_id: JobId,
        timestamp: Instant,
    },
    JobRetryScheduled {
        study_id: StudyId,
        job_id: JobId,
        attempt: u32,
        timestamp: Instant,
    },
    JobFailed {
        study_id: StudyId,
        job_id: JobId,
        timestamp: Instant,
    },
}

impl visibility_core::CoreEvent for OrchestratorEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrchestratorEvent::StudyCreated { .. } => "study_created",
            OrchestratorEvent::StudyStatusChanged { .. } => "study_status_changed",
            OrchestratorEvent::JobStarted { .. } => "job_started",
            OrchestratorEvent::JobCompleted { .. } => "job_completed",
            OrchestratorEvent::JobRetryScheduled { .. } => "job_retry_scheduled",
            OrchestratorEvent::JobFailed { .. } => "job_failed",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            OrchestratorEvent::StudyCreated { timestamp, .. }
            | OrchestratorEvent::StudyStatusChanged { timestamp, .. }
            | OrchestratorEvent::JobStarted { timestamp, .. }
            | OrchestratorEvent::JobCompleted { timestamp, .. }
            | OrchestratorEvent::JobRetryScheduled { timestamp, .. }
            | OrchestratorEvent::JobFailed { timestamp, .. } => *timestamp,
        }
    }

    fn source(&self) -> &str {
        "orchestrator"
    }
}
