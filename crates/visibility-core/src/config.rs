//! The execution core's configuration surface (`spec.md` §6 config
//! table).
//!
//! `Config` only carries parsed values — there's no hidden global state
//! and no built-in loader; a collaborator deserializes this from TOML,
//! env vars, or wherever it likes via `serde`, then passes the parsed
//! struct into the executor/orchestrator constructors.

use std::time::Duration;

fn default_worker_count() -> usize {
    4
}

fn default_max_concurrent_jobs_per_worker() -> usize {
    4
}

fn default_job_timeout_ms() -> u64 {
    120_000
}

fn default_base_retry_delay_ms() -> u64 {
    500
}

fn default_max_retry_delay_ms() -> u64 {
    30_000
}

fn default_checkpoint_interval() -> u32 {
    1
}

/// Parsed configuration for one execution core instance (`spec.md` §6:
/// "workerCount, maxConcurrentJobsPerWorker, jobTimeout,
/// baseRetryDelayMs, maxRetryDelayMs, enableAutoScale,
/// checkpointInterval, strictMode").
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
    #[serde(default = "default_max_concurrent_jobs_per_worker")]
    pub max_concurrent_jobs_per_worker: usize,
    #[serde(default = "default_job_timeout_ms")]
    pub job_timeout_ms: u64,
    #[serde(default = "default_base_retry_delay_ms")]
    pub base_retry_delay_ms: u64,
    #[serde(default = "default_max_retry_delay_ms")]
    pub max_retry_delay_ms: u64,
    /// Reserved for a future elastic worker pool; read but not yet acted
    /// on by `visibility-executor` (`spec.md` §6 lists it as a config
    /// field without specifying the scaling policy).
    #[serde(default)]
    pub enable_auto_scale: bool,
    /// Job-count cadence at which the orchestrator's injected
    /// `Persistence` is consulted, not a timer (`spec.md` §4.4 ambient
    /// checkpoint hook). `1` checkpoints every job transition.
    #[serde(default = "default_checkpoint_interval")]
    pub checkpoint_interval: u32,
    /// Promotes every Validator `Warning`-severity check to `Error`
    /// (`spec.md` §4.5).
    #[serde(default)]
    pub strict_mode: bool,
}

impl Config {
    pub fn job_timeout(&self) -> Duration {
        Duration::from_millis(self.job_timeout_ms)
    }

    pub fn base_retry_delay(&self) -> Duration {
        Duration::from_millis(self.base_retry_delay_ms)
    }

    pub fn max_retry_delay(&self) -> Duration {
        Duration::from_millis(self.max_retry_delay_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            worker_count: default_worker_count(),
            max_concurrent_jobs_per_worker: default_max_concurrent_jobs_per_worker(),
            job_timeout_ms: default_job_timeout_ms(),
            base_retry_delay_ms: default_base_retry_delay_ms(),
            max_retry_delay_ms: default_max_retry_delay_ms(),
            enable_auto_scale: false,
            checkpoint_interval: default_checkpoint_interval(),
            strict_mode: false,
        }
    }
}
