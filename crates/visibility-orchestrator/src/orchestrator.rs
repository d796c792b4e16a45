//! The Study Orchestrator: owns study and job-graph truth, and is the
//! sole authority on retry decisions (`spec.md` §4.4).
//!
//! Dispatch mechanics (worker concurrency, timeouts, the executor's own
//! exponential backoff) live in `visibility-executor` instead. An
//! orchestrator-driven submission always carries `attempt_number: 0,
//! max_attempts: 0`, which forces the executor's default
//! `RetryStrategy::should_retry` (`attempt >= max_attempts`) to evaluate
//! true on the first failure — so the executor always reports a single
//! terminal `JobCompleted`/`JobFailed` per dispatch and never resubmits on
//! its own. All retry truth for orchestrator-driven work then lives here,
//! in `get_next_jobs` / `start_job` / `fail_job`'s pending-vs-failed
//! re-draw cycle, matching the "separates graph-truth from execution
//! concurrency" split called out in `visibility-executor`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use visibility_core::{CoreError, EventListener, EventListeners, JobId, StudyId, TenantId};
use visibility_executor::{JobExecutionRequest, Priority};
use visibility_validator::{best_case_can_complete, evaluate_study};

use crate::events::OrchestratorEvent;
use crate::graph::JobGraph;
use crate::job::{Job, JobResult, JobStatus};
use crate::manifest::Manifest;
use crate::persistence::Persistence;
use crate::study::{Study, StudyStatus};

/// Owns every study's state and job graph, and arbitrates retries.
pub struct StudyOrchestrator {
    studies: Mutex<HashMap<StudyId, Study>>,
    persistence: Arc<dyn Persistence>,
    events: Mutex<EventListeners<OrchestratorEvent>>,
    /// Job-count cadence at which `save_job` is actually consulted
    /// (`spec.md` §6 `checkpointInterval`); `1` checkpoints every job
    /// transition.
    checkpoint_interval: u32,
    job_transition_count: AtomicU32,
}

impl StudyOrchestrator {
    pub fn new(persistence: Arc<dyn Persistence>) -> Self {
        Self::with_checkpoint_interval(persistence, 1)
    }

    pub fn with_checkpoint_interval(persistence: Arc<dyn Persistence>, checkpoint_interval: u32) -> Self {
        Self {
            studies: Mutex::new(HashMap::new()),
            persistence,
            events: Mutex::new(EventListeners::new()),
            checkpoint_interval: checkpoint_interval.max(1),
            job_transition_count: AtomicU32::new(0),
        }
    }

    /// Whether this job transition lands on the checkpoint cadence.
    fn should_checkpoint_job(&self) -> bool {
        let count = self.job_transition_count.fetch_add(1, Ordering::SeqCst) + 1;
        count % self.checkpoint_interval == 0
    }

    /// Registers an event listener.
    pub fn on_event<L>(&self, listener: L)
    where
        L: EventListener<OrchestratorEvent> + 'static,
    {
        self.events.lock().expect("event listeners poisoned").add(listener);
    }

    /// Validates and ingests a manifest, building its job graph.
    ///
    /// A manifest with zero cells (`spec.md` §8: "empty query list") is
    /// taken straight to `Complete`, skipping `queued`/`executing`
    /// entirely — there's no cell for which `coverageThreshold` could ever
    /// fail to be met. A non-empty manifest is taken straight through
    /// `validating` to `queued`; this orchestrator doesn't have a
    /// separate injected manifest-validation step, so those two
    /// intermediate states collapse to the same synchronous call.
    pub fn create_study(&self, tenant_id: TenantId, manifest: Manifest) -> StudyId {
        let study_id = StudyId::new();
        let cell_count = manifest.cell_count();
        let graph = JobGraph::build(
            study_id,
            manifest.queries.len(),
            &manifest.surfaces,
            &manifest.locations,
            manifest.completion_criteria.max_retries_per_cell,
        );

        let status = if cell_count == 0 {
            StudyStatus::Complete
        } else {
            StudyStatus::Queued
        };

        let study = Study {
            id: study_id,
            tenant_id,
            manifest,
            status,
            graph,
        };
        self.persistence.save_study(&study);
        self.studies.lock().expect("studies poisoned").insert(study_id, study);

        self.emit(OrchestratorEvent::StudyCreated {
            study_id,
            cell_count,
            timestamp: Instant::now(),
        });
        if status == StudyStatus::Complete {
            self.emit(OrchestratorEvent::StudyStatusChanged {
                study_id,
                from: StudyStatus::ManifestReceived,
                to: StudyStatus::Complete,
                timestamp: Instant::now(),
            });
        }
        study_id
    }

    /// Moves a queued study into execution.
    pub fn start_study(&self, study_id: StudyId) -> Result<(), CoreError> {
        self.transition(study_id, StudyStatus::Queued, StudyStatus::Executing, "startStudy")
    }

    /// Pauses an executing study; outstanding jobs already dispatched are
    /// unaffected, but `get_next_jobs` stops handing out new work.
    pub fn pause_study(&self, study_id: StudyId) -> Result<(), CoreError> {
        self.transition(study_id, StudyStatus::Executing, StudyStatus::Paused, "pauseStudy")
    }

    /// Resumes a paused study.
    pub fn resume_study(&self, study_id: StudyId) -> Result<(), CoreError> {
        self.transition(study_id, StudyStatus::Paused, StudyStatus::Executing, "resumeStudy")
    }

    /// Cancels a study from any non-terminal state. Clears every
    /// not-yet-terminal cell (`Pending` or `Executing`) to `Cancelled` —
    /// pending cells are removed from the queue outright, and an
    /// in-flight cell's eventual result is discarded by
    /// [`Self::complete_job`]/[`Self::fail_job`] once it arrives, since
    /// by then the study is no longer `Executing` (`spec.md` §5, §8
    /// scenario 5).
    pub fn cancel_study(&self, study_id: StudyId) -> Result<(), CoreError> {
        let mut studies = self.studies.lock().expect("studies poisoned");
        let study = studies.get_mut(&study_id).ok_or(CoreError::StudyNotFound(study_id))?;
        study.require_one_of(
            &[
                StudyStatus::ManifestReceived,
                StudyStatus::Validating,
                StudyStatus::Queued,
                StudyStatus::Executing,
                StudyStatus::Paused,
            ],
            "cancelStudy",
        )?;
        let from = study.status;
        study.status = StudyStatus::Cancelled;
        for job in study.graph.iter_mut() {
            if matches!(job.status, JobStatus::Pending | JobStatus::Executing) {
                job.status = JobStatus::Cancelled;
            }
        }
        self.persistence.save_study(study);
        drop(studies);
        self.emit(OrchestratorEvent::StudyStatusChanged {
            study_id,
            from,
            to: StudyStatus::Cancelled,
            timestamp: Instant::now(),
        });
        Ok(())
    }

    /// A read-only snapshot of the study's pending cells, in stable order.
    /// Does not mutate any job's status — call [`Self::start_job`] to
    /// actually claim one (`spec.md` §4.4: "separates graph-truth from
    /// execution concurrency").
    pub fn get_next_jobs(&self, study_id: StudyId, limit: usize) -> Result<Vec<Job>, CoreError> {
        let studies = self.studies.lock().expect("studies poisoned");
        let study = studies.get(&study_id).ok_or(CoreError::StudyNotFound(study_id))?;
        if study.status != StudyStatus::Executing {
            return Ok(Vec::new());
        }
        Ok(study.graph.pending().into_iter().take(limit).cloned().collect())
    }

    /// Claims a pending cell, transitioning it to `executing`.
    pub fn start_job(&self, study_id: StudyId, job_id: JobId) -> Result<Job, CoreError> {
        let mut studies = self.studies.lock().expect("studies poisoned");
        let study = studies.get_mut(&study_id).ok_or(CoreError::StudyNotFound(study_id))?;
        study.require_status(StudyStatus::Executing, "startJob")?;
        let job = study
            .graph
            .get_mut(&job_id)
            .ok_or(CoreError::JobNotFound { study: study_id, job: job_id })?;
        job.status = JobStatus::Executing;
        job.attempts += 1;
        let snapshot = job.clone();
        if self.should_checkpoint_job() {
            self.persistence.save_job(&snapshot);
        }
        drop(studies);
        self.emit(OrchestratorEvent::JobStarted {
            study_id,
            job_id,
            timestamp: Instant::now(),
        });
        Ok(snapshot)
    }

    /// Records a successful result and checks whether the study can now
    /// complete. A result that arrives for a study that is no longer
    /// `Executing` (cancelled mid-flight, or already terminal) is
    /// discarded rather than applied (`spec.md` §5 "in-flight jobs
    /// complete but their results are discarded"; §8 scenario 5).
    pub fn complete_job(&self, study_id: StudyId, job_id: JobId, result: JobResult) -> Result<(), CoreError> {
        let mut studies = self.studies.lock().expect("studies poisoned");
        let study = studies.get_mut(&study_id).ok_or(CoreError::StudyNotFound(study_id))?;
        if study.status != StudyStatus::Executing {
            return Ok(());
        }
        let job = study
            .graph
            .get_mut(&job_id)
            .ok_or(CoreError::JobNotFound { study: study_id, job: job_id })?;
        job.status = JobStatus::Complete;
        job.result = Some(result);
        let snapshot = job.clone();
        if self.should_checkpoint_job() {
            self.persistence.save_job(&snapshot);
        }
        self.check_study_completion(study);
        drop(studies);
        self.emit(OrchestratorEvent::JobCompleted {
            study_id,
            job_id,
            timestamp: Instant::now(),
        });
        Ok(())
    }

    /// Records a failed attempt. If the cell still has retries left and
    /// the failure is retryable, it's returned to `pending` for a future
    /// `get_next_jobs` draw; otherwise it's permanently `failed`. Either
    /// way, the study's completion criteria are re-checked — a cell that
    /// permanently fails can make the study's best-case completion rate
    /// drop below threshold before every cell has finished
    /// (`spec.md` §4.4: "if criteria cannot be met even by completing all
    /// still-pending jobs, study -> failed").
    /// A failure that arrives for a study that is no longer `Executing`
    /// is discarded the same way [`Self::complete_job`] discards a late
    /// success (`spec.md` §8 scenario 5).
    pub fn fail_job(
        &self,
        study_id: StudyId,
        job_id: JobId,
        result: Option<JobResult>,
        retryable: bool,
    ) -> Result<(), CoreError> {
        let mut studies = self.studies.lock().expect("studies poisoned");
        let study = studies.get_mut(&study_id).ok_or(CoreError::StudyNotFound(study_id))?;
        if study.status != StudyStatus::Executing {
            return Ok(());
        }
        let job = study
            .graph
            .get_mut(&job_id)
            .ok_or(CoreError::JobNotFound { study: study_id, job: job_id })?;

        let retry_scheduled = retryable && job.can_retry();
        if retry_scheduled {
            job.status = JobStatus::Pending;
        } else {
            job.status = JobStatus::Failed;
            job.result = result;
        }
        let snapshot = job.clone();
        if self.should_checkpoint_job() {
            self.persistence.save_job(&snapshot);
        }
        self.check_study_completion(study);
        drop(studies);

        if retry_scheduled {
            self.emit(OrchestratorEvent::JobRetryScheduled {
                study_id,
                job_id,
                attempt: snapshot.attempts,
                timestamp: Instant::now(),
            });
        } else {
            self.emit(OrchestratorEvent::JobFailed {
                study_id,
                job_id,
                timestamp: Instant::now(),
            });
        }
        Ok(())
    }

    /// A cloned snapshot of a study's current state.
    pub fn get_study(&self, study_id: StudyId) -> Result<Study, CoreError> {
        self.studies
            .lock()
            .expect("studies poisoned")
            .get(&study_id)
            .cloned()
            .ok_or(CoreError::StudyNotFound(study_id))
    }

    /// Every cell's recorded outcome, for a caller that only wants job
    /// results rather than the full study snapshot (`spec.md` §6 lists
    /// `getStudyResults` as an operation distinct from `getStudy`).
    pub fn get_study_results(&self, study_id: StudyId) -> Result<Vec<Job>, CoreError> {
        let studies = self.studies.lock().expect("studies poisoned");
        let study = studies.get(&study_id).ok_or(CoreError::StudyNotFound(study_id))?;
        Ok(study.graph.iter().cloned().collect())
    }

    /// Builds the executor-facing request for a claimed job. Always sets
    /// `attempt_number: 0, max_attempts: 0` — see the module doc comment
    /// for why this is what hands retry ownership to this orchestrator.
    pub fn build_execution_request(&self, study_id: StudyId, job: &Job) -> Result<JobExecutionRequest, CoreError> {
        let studies = self.studies.lock().expect("studies poisoned");
        let study = studies.get(&study_id).ok_or(CoreError::StudyNotFound(study_id))?;
        let query_text = study
            .manifest
            .queries
            .get(job.query_index.0)
            .map(|q| q.text.clone())
            .ok_or(CoreError::JobNotFound { study: study_id, job: job.id })?;

        Ok(JobExecutionRequest {
            job_id: job.id,
            study_id,
            tenant_id: study.tenant_id,
            query_text,
            surface_id: job.surface_id.clone(),
            location_id: job.location_id.clone(),
            attempt_number: 0,
            max_attempts: 0,
            priority: Priority::Normal,
            evidence_level: study.manifest.evidence_level,
            quality_gates: study.manifest.quality_gates.clone(),
            session_isolation: study.manifest.session_isolation,
        })
    }

    fn transition(
        &self,
        study_id: StudyId,
        from_expected: StudyStatus,
        to: StudyStatus,
        operation: &'static str,
    ) -> Result<(), CoreError> {
        let mut studies = self.studies.lock().expect("studies poisoned");
        let study = studies.get_mut(&study_id).ok_or(CoreError::StudyNotFound(study_id))?;
        study.require_status(from_expected, operation)?;
        study.status = to;
        self.persistence.save_study(study);
        drop(studies);
        self.emit(OrchestratorEvent::StudyStatusChanged {
            study_id,
            from: from_expected,
            to,
            timestamp: Instant::now(),
        });
        Ok(())
    }

    /// Re-evaluates a study's completion criteria after a job transition.
    /// Only applies to studies still `Executing` — a paused or already
    /// terminal study doesn't get auto-completed by a stray late result.
    fn check_study_completion(&self, study: &mut Study) {
        if study.status != StudyStatus::Executing {
            return;
        }
        let counts = study.graph.surface_counts();
        if study.graph.none_outstanding() {
            let report = evaluate_study(&counts, &study.manifest.completion_criteria);
            let to = if report.can_complete { StudyStatus::Complete } else { StudyStatus::Failed };
            let from = study.status;
            study.status = to;
            self.persistence.save_study(study);
            self.emit(OrchestratorEvent::StudyStatusChanged {
                study_id: study.id,
                from,
                to,
                timestamp: Instant::now(),
            });
        } else if !best_case_can_complete(&counts, &study.manifest.completion_criteria) {
            let from = study.status;
            study.status = StudyStatus::Failed;
            self.persistence.save_study(study);
            self.emit(OrchestratorEvent::StudyStatusChanged {
                study_id: study.id,
                from,
                to: StudyStatus::Failed,
                timestamp: Instant::now(),
            });
        }
    }

    fn emit(&self, event: OrchestratorEvent) {
        self.events.lock().expect("event listeners poisoned").emit(&event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{Location, ProxyType, Query};
    use crate::persistence::InMemoryPersistence;
    use visibility_core::{LocationId, SurfaceId};
    use visibility_executor::{EvidenceLevel, QualityGates, SessionIsolation};
    use visibility_validator::{CompletionCriteria, JobValidationReport, JobValidationStatus};

    fn manifest(queries: usize, surfaces: &[&str], coverage_threshold: f64, max_retries: u32) -> Manifest {
        Manifest {
            queries: (0..queries).map(|i| Query::new(format!("q{i}"))).collect(),
            surfaces: surfaces.iter().map(|s| SurfaceId::new(*s)).collect(),
            locations: vec![Location::new("us-nyc", "US", ProxyType::Datacenter)],
            quality_gates: QualityGates::default(),
            completion_criteria: CompletionCriteria {
                required_surfaces: surfaces.iter().map(|s| SurfaceId::new(*s)).collect(),
                coverage_threshold,
                optional_surfaces: Vec::new(),
                max_retries_per_cell: max_retries,
            },
            evidence_level: EvidenceLevel::None,
            legal_hold: false,
            deadline_epoch_ms: None,
            session_isolation: SessionIsolation::Shared,
        }
    }

    fn orchestrator() -> StudyOrchestrator {
        StudyOrchestrator::new(Arc::new(InMemoryPersistence))
    }

    fn passing_result() -> JobResult {
        JobResult {
            response_text: Some("a fine answer".to_string()),
            validation: JobValidationReport {
                status: JobValidationStatus::Passed,
                checks: Vec::new(),
            },
            latency_ms: 10,
        }
    }

    #[test]
    fn empty_query_list_completes_the_study_immediately() {
        let orch = orchestrator();
        let study_id = orch.create_study(TenantId::new(), manifest(0, &["openai-api"], 1.0, 3));
        let study = orch.get_study(study_id).unwrap();
        assert_eq!(study.status, StudyStatus::Complete);
        assert_eq!(study.graph.len(), 0);
    }

    #[test]
    fn two_query_happy_path_completes_once_every_job_succeeds() {
        let orch = orchestrator();
        let study_id = orch.create_study(TenantId::new(), manifest(2, &["openai-api"], 1.0, 3));
        orch.start_study(study_id).unwrap();

        let jobs = orch.get_next_jobs(study_id, 10).unwrap();
        assert_eq!(jobs.len(), 2);
        for job in &jobs {
            let started = orch.start_job(study_id, job.id).unwrap();
            orch.complete_job(study_id, started.id, passing_result()).unwrap();
        }

        let study = orch.get_study(study_id).unwrap();
        assert_eq!(study.status, StudyStatus::Complete);
        assert!(study.graph.none_outstanding());
    }

    #[test]
    fn retryable_failure_returns_the_cell_to_pending_with_incremented_attempts() {
        let orch = orchestrator();
        let study_id = orch.create_study(TenantId::new(), manifest(1, &["openai-api"], 1.0, 3));
        orch.start_study(study_id).unwrap();

        let job = orch.get_next_jobs(study_id, 1).unwrap().remove(0);
        let started = orch.start_job(study_id, job.id).unwrap();
        orch.fail_job(study_id, started.id, None, true).unwrap();

        let study = orch.get_study(study_id).unwrap();
        let retried = study.graph.get(&job.id).unwrap();
        assert_eq!(retried.status, JobStatus::Pending);
        assert_eq!(retried.attempts, 1);
        assert_eq!(study.status, StudyStatus::Executing);
    }

    #[test]
    fn non_retryable_failure_permanently_fails_the_cell_and_the_study() {
        let orch = orchestrator();
        let study_id = orch.create_study(TenantId::new(), manifest(1, &["openai-api"], 1.0, 3));
        orch.start_study(study_id).unwrap();

        let job = orch.get_next_jobs(study_id, 1).unwrap().remove(0);
        let started = orch.start_job(study_id, job.id).unwrap();
        orch.fail_job(study_id, started.id, None, false).unwrap();

        let study = orch.get_study(study_id).unwrap();
        assert_eq!(study.graph.get(&job.id).unwrap().status, JobStatus::Failed);
        assert_eq!(study.status, StudyStatus::Failed);
    }

    #[test]
    fn get_study_results_reflects_recorded_job_outcomes() {
        let orch = orchestrator();
        let study_id = orch.create_study(TenantId::new(), manifest(1, &["openai-api"], 1.0, 3));
        orch.start_study(study_id).unwrap();

        let job = orch.get_next_jobs(study_id, 1).unwrap().remove(0);
        let started = orch.start_job(study_id, job.id).unwrap();
        orch.complete_job(study_id, started.id, passing_result()).unwrap();

        let results = orch.get_study_results(study_id).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, JobStatus::Complete);
        assert_eq!(results[0].result.as_ref().unwrap().response_text.as_deref(), Some("a fine answer"));
    }

    #[test]
    fn max_retries_exhausted_permanently_fails_even_on_a_retryable_error() {
        let orch = orchestrator();
        let study_id = orch.create_study(TenantId::new(), manifest(1, &["openai-api"], 1.0, 2));
        orch.start_study(study_id).unwrap();

        let job = orch.get_next_jobs(study_id, 1).unwrap().remove(0);
        let started = orch.start_job(study_id, job.id).unwrap();
        orch.fail_job(study_id, started.id, None, true).unwrap();
        let retried = orch.get_next_jobs(study_id, 1).unwrap().remove(0);
        let started_again = orch.start_job(study_id, retried.id).unwrap();
        orch.fail_job(study_id, started_again.id, None, true).unwrap();

        let study = orch.get_study(study_id).unwrap();
        assert_eq!(study.graph.get(&job.id).unwrap().status, JobStatus::Failed);
        assert_eq!(study.status, StudyStatus::Failed);
    }

    #[test]
    fn threshold_exactly_met_completes_the_study() {
        let orch = orchestrator();
        // coverage_threshold 0.8 over 5 cells: 4/5 completing exactly meets it.
        let study_id = orch.create_study(TenantId::new(), manifest(5, &["openai-api"], 0.8, 0));
        orch.start_study(study_id).unwrap();

        let jobs = orch.get_next_jobs(study_id, 10).unwrap();
        assert_eq!(jobs.len(), 5);
        for (i, job) in jobs.iter().enumerate() {
            let started = orch.start_job(study_id, job.id).unwrap();
            if i == 0 {
                orch.fail_job(study_id, started.id, None, false).unwrap();
            } else {
                orch.complete_job(study_id, started.id, passing_result()).unwrap();
            }
        }

        let study = orch.get_study(study_id).unwrap();
        assert_eq!(study.status, StudyStatus::Complete);
    }

    #[test]
    fn early_failure_fires_before_every_cell_is_terminal_once_best_case_is_impossible() {
        let orch = orchestrator();
        // coverage_threshold 0.8 over 5 cells needs 4 successes; failing 2
        // up front makes the best possible outcome 3/5 = 0.6.
        let study_id = orch.create_study(TenantId::new(), manifest(5, &["openai-api"], 0.8, 0));
        orch.start_study(study_id).unwrap();

        let jobs = orch.get_next_jobs(study_id, 10).unwrap();
        let started_0 = orch.start_job(study_id, jobs[0].id).unwrap();
        orch.fail_job(study_id, started_0.id, None, false).unwrap();
        let started_1 = orch.start_job(study_id, jobs[1].id).unwrap();
        orch.fail_job(study_id, started_1.id, None, false).unwrap();

        let study = orch.get_study(study_id).unwrap();
        assert_eq!(study.status, StudyStatus::Failed);
        // The remaining three cells never got a chance to run.
        assert_eq!(study.graph.pending().len(), 3);
    }

    #[test]
    fn cancel_mid_flight_stops_further_dispatch() {
        let orch = orchestrator();
        let study_id = orch.create_study(TenantId::new(), manifest(3, &["openai-api"], 1.0, 3));
        orch.start_study(study_id).unwrap();
        orch.cancel_study(study_id).unwrap();

        let jobs = orch.get_next_jobs(study_id, 10).unwrap();
        assert!(jobs.is_empty());
        let study = orch.get_study(study_id).unwrap();
        assert_eq!(study.status, StudyStatus::Cancelled);
    }

    #[test]
    fn cancelling_discards_a_late_result_for_an_in_flight_job_and_clears_the_queue() {
        let orch = orchestrator();
        let study_id = orch.create_study(TenantId::new(), manifest(4, &["openai-api"], 1.0, 3));
        orch.start_study(study_id).unwrap();

        let jobs = orch.get_next_jobs(study_id, 4).unwrap();
        let job_1 = orch.start_job(study_id, jobs[0].id).unwrap();
        orch.complete_job(study_id, job_1.id, passing_result()).unwrap();
        let job_2 = orch.start_job(study_id, jobs[1].id).unwrap();

        orch.cancel_study(study_id).unwrap();

        // Jobs 3-4 were still pending and are pulled out of the queue;
        // job 2 was mid-flight and is marked cancelled too.
        let study = orch.get_study(study_id).unwrap();
        assert_eq!(study.graph.get(&jobs[2].id).unwrap().status, JobStatus::Cancelled);
        assert_eq!(study.graph.get(&jobs[3].id).unwrap().status, JobStatus::Cancelled);
        assert_eq!(study.graph.get(&job_2.id).unwrap().status, JobStatus::Cancelled);

        // Job 2's success arrives after the cancel handler ran; it must
        // not resurrect the cell as complete.
        orch.complete_job(study_id, job_2.id, passing_result()).unwrap();
        let study = orch.get_study(study_id).unwrap();
        assert_eq!(study.graph.get(&job_2.id).unwrap().status, JobStatus::Cancelled);
        assert!(study.graph.get(&job_2.id).unwrap().result.is_none());
        assert_eq!(study.status, StudyStatus::Cancelled);

        // Job 1's already-recorded completion is untouched.
        assert_eq!(study.graph.get(&job_1.id).unwrap().status, JobStatus::Complete);
    }

    #[test]
    fn pause_then_resume_round_trips_back_to_executing() {
        let orch = orchestrator();
        let study_id = orch.create_study(TenantId::new(), manifest(1, &["openai-api"], 1.0, 3));
        orch.start_study(study_id).unwrap();
        orch.pause_study(study_id).unwrap();
        assert!(orch.get_next_jobs(study_id, 10).unwrap().is_empty());
        orch.resume_study(study_id).unwrap();
        assert_eq!(orch.get_next_jobs(study_id, 10).unwrap().len(), 1);
    }

    #[test]
    fn operations_against_an_unknown_study_return_study_not_found() {
        let orch = orchestrator();
        let bogus = StudyId::new();
        assert!(matches!(orch.start_study(bogus), Err(CoreError::StudyNotFound(_))));
        assert!(matches!(orch.get_study(bogus), Err(CoreError::StudyNotFound(_))));
    }

    #[test]
    fn resuming_a_study_that_is_not_paused_is_an_invalid_transition() {
        let orch = orchestrator();
        let study_id = orch.create_study(TenantId::new(), manifest(1, &["openai-api"], 1.0, 3));
        orch.start_study(study_id).unwrap();
        assert!(matches!(orch.resume_study(study_id), Err(CoreError::InvalidTransition { .. })));
    }

    #[test]
    fn build_execution_request_carries_zeroed_retry_fields() {
        let orch = orchestrator();
        let study_id = orch.create_study(TenantId::new(), manifest(1, &["openai-api"], 1.0, 3));
        orch.start_study(study_id).unwrap();
        let job = orch.get_next_jobs(study_id, 1).unwrap().remove(0);
        let request = orch.build_execution_request(study_id, &job).unwrap();
        assert_eq!(request.attempt_number, 0);
        assert_eq!(request.max_attempts, 0);
        assert_eq!(request.query_text, "q0");
    }
}
