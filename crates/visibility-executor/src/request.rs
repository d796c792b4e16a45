//! The unit of work the executor dispatches (`spec.md` §4.3).

use visibility_adapter::{AdapterError, TokenUsage};
use visibility_core::{JobId, LocationId, StudyId, SurfaceId, TenantId};

/// Relative scheduling priority. Ordered low-to-high so the derived `Ord`
/// on [`Priority as u8`][Priority::weight] matches the queue's weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Low,
    Normal,
    High,
    Critical,
}

impl Priority {
    /// Queue weight: `{critical=3, high=2, normal=1, low=0}` (`spec.md`
    /// §4.3).
    pub fn weight(self) -> u8 {
        match self {
            Priority::Low => 0,
            Priority::Normal => 1,
            Priority::High => 2,
            Priority::Critical => 3,
        }
    }
}

/// How thoroughly a job must capture corroborating evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvidenceLevel {
    None,
    Basic,
    Full,
}

/// Whether the job must run behind an isolated browser session (web
/// chatbot leaves with captured sessions).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionIsolation {
    Shared,
    Isolated,
}

/// Default substrings the Validator's `error_pattern` check rejects a
/// response for containing (`spec.md` §4.5: "defaults include '404',
/// 'rate limit', 'internal server error', 'service unavailable'").
pub fn default_error_patterns() -> Vec<String> {
    vec![
        "404".to_string(),
        "rate limit".to_string(),
        "internal server error".to_string(),
        "service unavailable".to_string(),
    ]
}

/// Quality gates the Validator applies to this job's result (`spec.md`
/// §4.5), carried alongside the job so the executor doesn't need to look
/// them up from the study separately.
#[derive(Debug, Clone)]
pub struct QualityGates {
    pub require_actual_content: bool,
    pub min_response_length: Option<usize>,
    pub required_keywords: Vec<String>,
    pub forbidden_keywords: Vec<String>,
    /// Substrings that mark a response as a disguised error page rather
    /// than real content (`spec.md` §4.5 check 4, `error_pattern`).
    pub error_patterns: Vec<String>,
}

impl Default for QualityGates {
    fn default() -> Self {
        Self {
            require_actual_content: false,
            min_response_length: None,
            required_keywords: Vec::new(),
            forbidden_keywords: Vec::new(),
            error_patterns: default_error_patterns(),
        }
    }
}

/// One unit of dispatchable work (`spec.md` §4.3: "JobExecutionRequest
/// fields").
#[derive(Debug, Clone)]
pub struct JobExecutionRequest {
    pub job_id: JobId,
    pub study_id: StudyId,
    pub tenant_id: TenantId,
    pub query_text: String,
    pub surface_id: SurfaceId,
    pub location_id: LocationId,
    pub attempt_number: u32,
    pub max_attempts: u32,
    pub priority: Priority,
    pub evidence_level: EvidenceLevel,
    pub quality_gates: QualityGates,
    pub session_isolation: SessionIsolation,
}

/// Per-job execution metrics, separate from the adapter's own running
/// stats.
#[derive(Debug, Clone, Copy, Default)]
pub struct JobMetrics {
    pub latency_ms: u64,
    pub token_usage: Option<TokenUsage>,
}

/// The outcome of dispatching one [`JobExecutionRequest`] (`spec.md`
/// §4.3 step 4: "JobExecutionResult carrying {jobId, studyId, success,
/// result?, metrics, attemptNumber, workerId}").
#[derive(Debug, Clone)]
pub struct JobExecutionResult {
    pub job_id: JobId,
    pub study_id: StudyId,
    pub success: bool,
    pub response_text: Option<String>,
    pub error: Option<AdapterError>,
    pub metrics: JobMetrics,
    pub attempt_number: u32,
    pub worker_id: usize,
}
