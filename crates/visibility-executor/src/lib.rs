//! Job Executor: priority queue, worker pool, dispatch and retry
//! scheduling for AI-surface queries (`spec.md` §4.3).

mod events;
mod executor;
mod pool;
mod queue;
mod registry;
mod request;
mod retry;
mod stats;

pub use events::ExecutorEvent;
pub use executor::{CurrentRuntime, Executor};
pub use pool::{ExecutorConfig, JobExecutor};
pub use queue::JobQueue;
pub use registry::QueryableAdapter;
pub use request::{
    default_error_patterns, EvidenceLevel, JobExecutionRequest, JobExecutionResult, JobMetrics, Priority,
    QualityGates, SessionIsolation,
};
pub use retry::{ExponentialBackoff, RetryStrategy};
pub use stats::ExecutorStats;
