//! `ai-visibility-core`: the assembled AI-surface visibility execution
//! core.
//!
//! A study enters as a [`visibility_orchestrator::Manifest`] — a
//! cross-product of queries, surfaces and locations plus the policy
//! blocks that govern how it runs. This crate wires the four components
//! that carry it to completion:
//!
//! - [`visibility_adapter`] normalizes each AI surface behind one
//!   interface and applies per-surface retry, rate-limiting and circuit
//!   breaking.
//! - [`visibility_executor`] dispatches queued cells against registered
//!   adapters with bounded worker concurrency.
//! - [`visibility_orchestrator`] owns job-graph truth: which cells are
//!   pending, executing, complete or failed, and the study's own
//!   lifecycle.
//! - [`visibility_validator`] scores each job's result against quality
//!   gates and rolls per-surface coverage up into a study-level verdict.
//!
//! [`ExecutionCore`] assembles all four and bridges the executor's
//! completion events back into orchestrator calls so a caller only has
//! to register adapters, submit a manifest, and drive the
//! `dispatch_ready_jobs` loop (or call
//! [`ExecutionCore::run_study_to_completion`] to have this crate drive
//! it for you).

mod driver;
mod tracing_init;

pub use driver::ExecutionCore;
pub use tracing_init::init_tracing;

pub use visibility_core::Config;
pub use visibility_executor::Executor;
