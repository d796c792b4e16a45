//! Bridges executor-emitted completion events back into orchestrator
//! calls, so a driver loop only has to wire the two together once
//! (`spec.md` §4.4: the orchestrator and executor communicate purely
//! through `JobExecutionResult` events, never by direct coupling).

use std::sync::Arc;

use visibility_core::EventListener;
use visibility_executor::ExecutorEvent;

use crate::job::JobResult as OrchestratorJobResult;
use crate::orchestrator::StudyOrchestrator;

/// An [`EventListener`] that turns [`ExecutorEvent::JobCompleted`] and
/// [`ExecutorEvent::JobFailed`] into [`StudyOrchestrator::complete_job`] /
/// [`StudyOrchestrator::fail_job`] calls.
///
/// Registered on a [`visibility_executor::JobExecutor`] via `on_event`
/// alongside whatever orchestrator the driver is running against.
pub struct ExecutorBridge {
    orchestrator: Arc<StudyOrchestrator>,
    /// Validates a completed response against the job's quality gates and
    /// produces the `JobResult` the orchestrator should record. Supplied
    /// by the caller (typically the facade crate) so this bridge stays
    /// free of a direct dependency on `visibility-validator`'s
    /// evidence-capture details.
    validate: Box<dyn Fn(&visibility_executor::JobExecutionResult) -> OrchestratorJobResult + Send + Sync>,
}

impl ExecutorBridge {
    pub fn new(
        orchestrator: Arc<StudyOrchestrator>,
        validate: impl Fn(&visibility_executor::JobExecutionResult) -> OrchestratorJobResult + Send + Sync + 'static,
    ) -> Self {
        Self {
            orchestrator,
            validate: Box::new(validate),
        }
    }
}

impl EventListener<ExecutorEvent> for ExecutorBridge {
    fn on_event(&self, event: &ExecutorEvent) {
        match event {
            ExecutorEvent::JobCompleted { result, .. } => {
                let job_result = (self.validate)(result);
                let retryable_failure = job_result.validation.status == visibility_validator::JobValidationStatus::Failed;
                if retryable_failure {
                    // A response that arrived but failed quality gates is
                    // still a failed attempt from the study's perspective
                    // (`spec.md` §4.5: a failed validation does not count
                    // as a completed cell). Quality-gate failures aren't
                    // classified adapter errors, so they're treated as
                    // retryable up to the cell's own attempt budget.
                    let _ = self.orchestrator.fail_job(result.study_id, result.job_id, Some(job_result), true);
                } else {
                    let _ = self.orchestrator.complete_job(result.study_id, result.job_id, job_result);
                }
            }
            ExecutorEvent::JobFailed { result, .. } => {
                let retryable = result.error.as_ref().map(|e| e.retryable).unwrap_or(false);
                let job_result = result.response_text.as_ref().map(|_| (self.validate)(result));
                let _ = self.orchestrator.fail_job(result.study_id, result.job_id, job_result, retryable);
            }
            _ => {}
        }
    }
}
