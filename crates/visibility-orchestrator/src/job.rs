//! A single execution cell and its lifecycle (`spec.md` §3, §4.4).

use visibility_core::{JobId, LocationId, QueryIndex, StudyId, SurfaceId};
use visibility_validator::JobValidationReport;

/// Where one cell sits in its own lifecycle (`spec.md` §4.4 job state
/// machine: `pending -> executing -> {complete, failed, pending}`, plus
/// `cancelled` when the owning study is cancelled out from under it).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Executing,
    Complete,
    Failed,
    Cancelled,
}

/// A result recorded against a completed or failed cell.
#[derive(Debug, Clone)]
pub struct JobResult {
    pub response_text: Option<String>,
    pub validation: JobValidationReport,
    pub latency_ms: u64,
}

/// One execution cell: a single (query, surface, location) triple plus its
/// accumulated attempt history (`spec.md` §3 `JobGraph` entry).
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub study_id: StudyId,
    pub query_index: QueryIndex,
    pub surface_id: SurfaceId,
    pub location_id: LocationId,
    pub status: JobStatus,
    /// Attempts already made against this cell. Starts at 0; incremented
    /// each time `startJob` claims the cell, including the first attempt.
    pub attempts: u32,
    pub max_attempts: u32,
    pub result: Option<JobResult>,
}

impl Job {
    pub fn new(
        study_id: StudyId,
        query_index: QueryIndex,
        surface_id: SurfaceId,
        location_id: LocationId,
        max_attempts: u32,
    ) -> Self {
        Self {
            id: JobId::new(),
            study_id,
            query_index,
            surface_id,
            location_id,
            status: JobStatus::Pending,
            attempts: 0,
            max_attempts,
            result: None,
        }
    }

    /// Whether another attempt is allowed after the current one fails
    /// (`spec.md` §4.4: "attempts < maxRetriesPerCell").
    pub fn can_retry(&self) -> bool {
        self.attempts < self.max_attempts
    }
}
