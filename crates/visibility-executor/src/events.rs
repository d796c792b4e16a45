//! Executor-emitted events (`spec.md` §4.3: "worker_started,
//! worker_stopped, job_started, job_completed, job_failed, job_retrying,
//! queue_empty").

use crate::request::JobExecutionResult;
use std::time::Instant;
use visibility_core::{JobId, StudyId};

/// Events emitted by a [`crate::pool::JobExecutor`] over its lifetime.
///
/// `JobCompleted`/`JobFailed` carry the full [`JobExecutionResult`] —
/// this is the "listener channel" the Study Orchestrator registers on to
/// dispatch completion or retry bookkeeping for its job graph.
#[derive(Debug, Clone)]
pub enum ExecutorEvent {
    WorkerStarted {
        worker_id: usize,
        timestamp: Instant,
    },
    WorkerStopped {
        worker_id: usize,
        timestamp: Instant,
    },
    JobStarted {
        job_id: JobId,
        study_id: StudyId,
        worker_id: usize,
        timestamp: Instant,
    },
    JobCompleted {
        result: JobExecutionResult,
        timestamp: Instant,
    },
    JobFailed {
        result: JobExecutionResult,
        timestamp: Instant,
    },
    JobRetrying {
        job_id: JobId,
        study_id: StudyId,
        attempt: u32,
        delay_ms: u64,
        timestamp: Instant,
    },
    QueueEmpty {
        timestamp: Instant,
    },
}

impl visibility_core::CoreEvent for ExecutorEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ExecutorEvent::WorkerStarted { .. } => "worker_started",
            ExecutorEvent::WorkerStopped { .. } => "worker_stopped",
            ExecutorEvent::JobStarted { .. } => "job_started",
            ExecutorEvent::JobCompleted { .. } => "job_completed",
            ExecutorEvent::JobFailed { .. } => "job_failed",
            ExecutorEvent::JobRetrying { .. } => "job_retrying",
            ExecutorEvent::QueueEmpty { .. } => "queue_empty",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            ExecutorEvent::WorkerStarted { timestamp, .. }
            | ExecutorEvent::WorkerStopped { timestamp, .. }
            | ExecutorEvent::JobStarted { timestamp, .. }
            | ExecutorEvent::JobCompleted { timestamp, .. }
            | ExecutorEvent::JobFailed { timestamp, .. }
            | ExecutorEvent::JobRetrying { timestamp, .. }
            | ExecutorEvent::QueueEmpty { timestamp } => *timestamp,
        }
    }

    fn source(&self) -> &str {
        "executor"
    }
}
