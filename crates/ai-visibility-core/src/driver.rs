//! Wires the Surface Adapter Layer, Job Executor, Study Orchestrator and
//! Validator into one execution core, and runs the external driver loop
//! from `spec.md` §4.4: "`getNextJobs` -> `startJob` -> submit to the
//! executor; executor completion events -> `completeJob`/`failJob`".

use std::sync::Arc;
use std::time::Duration;

use visibility_core::{hash_content, Config, CoreError, EventListener, StudyId, SurfaceId, TenantId};
use visibility_executor::{
    ExecutorConfig, ExecutorEvent, ExponentialBackoff, JobExecutionResult, JobExecutor, QueryableAdapter,
};
use visibility_orchestrator::{
    ExecutorBridge, Job, JobResult as OrchestratorJobResult, Manifest, OrchestratorEvent, Persistence, Study,
    StudyOrchestrator, StudyStatus,
};
use visibility_validator::{validate_job, JobEvidence, JobValidationInput};

/// The assembled execution core: one orchestrator, one executor, bridged
/// together.
///
/// Construction takes care of registering the [`ExecutorBridge`] that
/// turns executor completion events into orchestrator calls; callers
/// still need to [`Self::register_adapter`] at least one surface and
/// [`Self::start`] the executor's worker pool before submitting a
/// manifest.
pub struct ExecutionCore {
    orchestrator: Arc<StudyOrchestrator>,
    executor: Arc<JobExecutor>,
}

impl ExecutionCore {
    pub fn new(config: &Config, persistence: Arc<dyn Persistence>) -> Self {
        let orchestrator = Arc::new(StudyOrchestrator::with_checkpoint_interval(
            persistence,
            config.checkpoint_interval,
        ));
        let executor = Arc::new(JobExecutor::new(
            ExecutorConfig {
                worker_count: config.worker_count,
                max_concurrent_jobs_per_worker: config.max_concurrent_jobs_per_worker,
                job_timeout: config.job_timeout(),
            },
            Arc::new(ExponentialBackoff {
                base_delay: config.base_retry_delay(),
                max_delay: config.max_retry_delay(),
            }),
        ));

        let strict_mode = config.strict_mode;
        let validating_orchestrator = Arc::clone(&orchestrator);
        executor.on_event(ExecutorBridge::new(Arc::clone(&orchestrator), move |result| {
            build_job_result(&validating_orchestrator, result, strict_mode)
        }));

        Self { orchestrator, executor }
    }

    /// Registers a surface's adapter with the executor.
    pub fn register_adapter(&self, surface_id: SurfaceId, adapter: Arc<dyn QueryableAdapter>) {
        self.executor.register_adapter(surface_id, adapter);
    }

    /// Registers a listener for orchestrator-level lifecycle events.
    pub fn on_orchestrator_event<L>(&self, listener: L)
    where
        L: EventListener<OrchestratorEvent> + 'static,
    {
        self.orchestrator.on_event(listener);
    }

    /// Registers a listener for executor-level dispatch events.
    pub fn on_executor_event<L>(&self, listener: L)
    where
        L: EventListener<ExecutorEvent> + 'static,
    {
        self.executor.on_event(listener);
    }

    /// Starts the executor's worker pool.
    pub fn start<E: visibility_executor::Executor>(&self, runtime: &E) {
        self.executor.start(runtime);
    }

    /// Signals the executor's workers to drain and wait up to `grace`.
    pub async fn stop(&self, grace: Duration) {
        self.executor.stop(grace).await;
    }

    /// Ingests a manifest and starts the resulting study, returning its
    /// id. A manifest with zero cells is already `complete` by the time
    /// this returns (`spec.md` §8 boundary behavior); `start_study` is a
    /// no-op in that case since the study never reaches `queued`.
    pub fn submit_manifest(&self, tenant_id: TenantId, manifest: Manifest) -> StudyId {
        let study_id = self.orchestrator.create_study(tenant_id, manifest);
        let _ = self.orchestrator.start_study(study_id);
        study_id
    }

    pub fn get_study(&self, study_id: StudyId) -> Result<Study, CoreError> {
        self.orchestrator.get_study(study_id)
    }

    /// Every cell's recorded outcome for a study, independent of the
    /// study's own lifecycle status (`spec.md` §6: `getStudyResults`).
    pub fn get_study_results(&self, study_id: StudyId) -> Result<Vec<Job>, CoreError> {
        self.orchestrator.get_study_results(study_id)
    }

    pub fn pause_study(&self, study_id: StudyId) -> Result<(), CoreError> {
        self.orchestrator.pause_study(study_id)
    }

    pub fn resume_study(&self, study_id: StudyId) -> Result<(), CoreError> {
        self.orchestrator.resume_study(study_id)
    }

    pub fn cancel_study(&self, study_id: StudyId) -> Result<(), CoreError> {
        self.orchestrator.cancel_study(study_id)
    }

    /// Draws up to `limit` pending cells and submits them to the
    /// executor, claiming each via `start_job` first so a concurrent call
    /// (or a second driver instance) can't double-dispatch the same cell.
    /// Returns how many jobs were actually dispatched.
    pub fn dispatch_ready_jobs(&self, study_id: StudyId, limit: usize) -> Result<usize, CoreError> {
        let jobs: Vec<Job> = self.orchestrator.get_next_jobs(study_id, limit)?;
        let mut dispatched = 0;
        for job in jobs {
            let started = self.orchestrator.start_job(study_id, job.id)?;
            let request = self.orchestrator.build_execution_request(study_id, &started)?;
            self.executor.submit_job(request);
            dispatched += 1;
        }
        Ok(dispatched)
    }

    /// Repeatedly draws and dispatches ready jobs on `poll_interval` until
    /// the study reaches a terminal status, then returns its final
    /// snapshot. This is the "external driver" loop `spec.md` §4.4
    /// describes; a caller with its own event loop can instead call
    /// [`Self::dispatch_ready_jobs`] directly from whatever triggers it
    /// (an `OrchestratorEvent::JobCompleted`, a timer, ...).
    pub async fn run_study_to_completion(
        &self,
        study_id: StudyId,
        poll_interval: Duration,
        batch_size: usize,
    ) -> Result<Study, CoreError> {
        loop {
            let study = self.orchestrator.get_study(study_id)?;
            if study.status.is_terminal() {
                return Ok(study);
            }
            if study.status == StudyStatus::Executing {
                self.dispatch_ready_jobs(study_id, batch_size)?;
            }
            tokio::time::sleep(poll_interval).await;
        }
    }
}

fn build_job_result(orchestrator: &StudyOrchestrator, result: &JobExecutionResult, strict_mode: bool) -> OrchestratorJobResult {
    let study = orchestrator.get_study(result.study_id).ok();
    let (quality_gates, evidence_level) = match &study {
        Some(study) => (study.manifest.quality_gates.clone(), study.manifest.evidence_level),
        None => (Default::default(), visibility_executor::EvidenceLevel::None),
    };

    // This execution core doesn't capture browser screenshots itself
    // (out of scope, `spec.md` §1); evidence beyond a content hash of the
    // response text is left to a collaborator that wraps this core.
    let evidence = JobEvidence {
        content_hash: result.response_text.as_ref().map(|text| hash_content(text.as_bytes())),
        has_screenshot: false,
    };

    let input = JobValidationInput {
        response_text: result.response_text.as_deref(),
        quality_gates: &quality_gates,
        evidence_level,
        evidence: &evidence,
        strict_mode,
    };
    let validation = validate_job(&input);

    OrchestratorJobResult {
        response_text: result.response_text.clone(),
        validation,
        latency_ms: result.metrics.latency_ms,
    }
}
