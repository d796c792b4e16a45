//! The job graph: every cell a manifest expands to, plus the read-only
//! progress queries the orchestrator and validator need (`spec.md` §3, §8
//! invariant "sum over surfaces of per-surface counts equals total jobs").

use crate::job::{Job, JobStatus};
use std::collections::HashMap;
use visibility_core::{JobId, LocationId, QueryIndex, StudyId, SurfaceId};
use visibility_validator::SurfaceCounts;

/// Every execution cell belonging to one study.
///
/// Progress counts are computed on demand by scanning `jobs` rather than
/// tracked as separately mutated counters, so "sum over surfaces equals
/// total" holds by construction instead of needing to be kept in sync by
/// every mutation site.
#[derive(Debug, Clone, Default)]
pub struct JobGraph {
    jobs: HashMap<JobId, Job>,
}

impl JobGraph {
    pub fn new() -> Self {
        Self { jobs: HashMap::new() }
    }

    /// Builds the full cross-product of cells for a study
    /// (`spec.md` §3: `JobGraph` is the cross-product of
    /// queries x surfaces x locations).
    pub fn build(
        study_id: StudyId,
        query_count: usize,
        surfaces: &[SurfaceId],
        locations: &[LocationId],
        max_retries_per_cell: u32,
    ) -> Self {
        let mut jobs = HashMap::with_capacity(query_count * surfaces.len() * locations.len());
        for query_index in 0..query_count {
            for surface_id in surfaces {
                for location_id in locations {
                    let job = Job::new(
                        study_id,
                        QueryIndex(query_index),
                        surface_id.clone(),
                        location_id.clone(),
                        max_retries_per_cell,
                    );
                    jobs.insert(job.id, job);
                }
            }
        }
        Self { jobs }
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn get(&self, job_id: &JobId) -> Option<&Job> {
        self.jobs.get(job_id)
    }

    pub fn get_mut(&mut self, job_id: &JobId) -> Option<&mut Job> {
        self.jobs.get_mut(job_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Job> {
        self.jobs.values_mut()
    }

    /// Every cell still in `Pending`, in a stable order (by job id) so
    /// dispatch order is deterministic across repeated calls against the
    /// same snapshot.
    pub fn pending(&self) -> Vec<&Job> {
        let mut pending: Vec<&Job> = self.jobs.values().filter(|j| j.status == JobStatus::Pending).collect();
        pending.sort_by_key(|j| j.id);
        pending
    }

    /// `true` once every cell has reached a terminal status
    /// (`Complete`/`Failed`/`Cancelled`).
    pub fn all_terminal(&self) -> bool {
        self.jobs
            .values()
            .all(|j| matches!(j.status, JobStatus::Complete | JobStatus::Failed | JobStatus::Cancelled))
    }

    /// `true` if no cell is `Pending` or `Executing` — the precondition
    /// for a study to leave `Executing` (`spec.md` §8: "zero pending AND
    /// zero executing jobs on any terminal status").
    pub fn none_outstanding(&self) -> bool {
        self.jobs
            .values()
            .all(|j| matches!(j.status, JobStatus::Complete | JobStatus::Failed | JobStatus::Cancelled))
    }

    /// Per-surface completed/failed/cancelled/total tallies, for the
    /// Validator's completion-criteria evaluation (`spec.md` §8 invariant
    /// 5: "sum over surfaces of completed+failed+pending+executing+
    /// cancelled equals total jobs").
    pub fn surface_counts(&self) -> HashMap<SurfaceId, SurfaceCounts> {
        let mut counts: HashMap<SurfaceId, SurfaceCounts> = HashMap::new();
        for job in self.jobs.values() {
            let entry = counts.entry(job.surface_id.clone()).or_default();
            entry.total += 1;
            match job.status {
                JobStatus::Complete => entry.completed += 1,
                JobStatus::Failed => entry.failed += 1,
                JobStatus::Cancelled => entry.cancelled += 1,
                JobStatus::Pending | JobStatus::Executing => {}
            }
        }
        counts
    }
}
