//! Study Orchestrator: owns study and job-graph state, job-graph
//! construction, and retry-decision authority for AI-surface visibility
//! studies (`spec.md` §4.4).

mod events;
mod graph;
mod job;
mod listener;
mod manifest;
mod orchestrator;
mod persistence;
mod study;

pub use events::OrchestratorEvent;
pub use graph::JobGraph;
pub use job::{Job, JobResult, JobStatus};
pub use listener::ExecutorBridge;
pub use manifest::{Location, Manifest, ProxyType, Query};
pub use orchestrator::StudyOrchestrator;
pub use persistence::{InMemoryPersistence, Persistence};
pub use study::{Study, StudyStatus};
