//! Property tests for the study orchestrator's job-graph invariants.
//!
//! Invariants tested (`spec.md` §8):
//! 1. `|jobs| = |queries| x |surfaces| x |locations|` from creation onward.
//! 4. A terminal study has zero pending or executing jobs.
//! 5. Sum over surfaces of per-status counts equals total jobs.
//! - `startJob` increments `attempts` by exactly 1 on every claim; a
//!   `failJob` with retryable=true and `attempts < max` returns the job to
//!   `pending` for a future claim.

use proptest::prelude::*;
use std::sync::Arc;
use tokio::runtime::Runtime;
use visibility_core::TenantId;
use visibility_executor::{EvidenceLevel, SessionIsolation};
use visibility_orchestrator::{InMemoryPersistence, JobStatus, Location, Manifest, ProxyType, Query, StudyOrchestrator, StudyStatus};
use visibility_validator::{CompletionCriteria, JobValidationReport, JobValidationStatus};

#[derive(Debug, Clone, Copy)]
enum Outcome {
    Success,
    FailRetryable,
    FailPermanent,
}

fn outcome_strategy() -> impl Strategy<Value = Outcome> {
    prop_oneof![Just(Outcome::Success), Just(Outcome::FailRetryable), Just(Outcome::FailPermanent)]
}

fn passed_result() -> visibility_orchestrator::JobResult {
    visibility_orchestrator::JobResult {
        response_text: Some("ok".to_string()),
        validation: JobValidationReport { status: JobValidationStatus::Passed, checks: Vec::new() },
        latency_ms: 1,
    }
}

fn manifest(query_count: usize, surface_count: usize, location_count: usize, coverage_threshold: f64) -> Manifest {
    let surfaces: Vec<_> = (0..surface_count).map(|i| visibility_core::SurfaceId::new(format!("surface-{i}"))).collect();
    Manifest {
        queries: (0..query_count).map(|i| Query::new(format!("q{i}"))).collect(),
        surfaces: surfaces.clone(),
        locations: (0..location_count).map(|i| Location::new(format!("loc-{i}"), "US", ProxyType::Datacenter)).collect(),
        quality_gates: Default::default(),
        completion_criteria: CompletionCriteria {
            required_surfaces: surfaces,
            coverage_threshold,
            optional_surfaces: Vec::new(),
            max_retries_per_cell: 2,
        },
        evidence_level: EvidenceLevel::None,
        legal_hold: false,
        deadline_epoch_ms: None,
        session_isolation: SessionIsolation::Shared,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(40))]

    /// Invariant 1: the job graph is always the cross-product of its three
    /// axes, and that count never changes across the study's lifetime.
    #[test]
    fn job_count_is_the_cross_product_at_every_observation_point(
        query_count in 1usize..=4,
        surface_count in 1usize..=3,
        location_count in 1usize..=2,
        coverage_threshold in 0.0f64..=1.0,
        outcomes in proptest::collection::vec(outcome_strategy(), 1..=24),
    ) {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let expected = query_count * surface_count * location_count;
            let orchestrator = StudyOrchestrator::new(Arc::new(InMemoryPersistence));
            let study_id = orchestrator.create_study(
                TenantId::new(),
                manifest(query_count, surface_count, location_count, coverage_threshold),
            );

            let study = orchestrator.get_study(study_id).unwrap();
            prop_assert_eq!(study.graph.len(), expected);

            let mut outcome_idx = 0usize;
            let mut rounds = 0usize;
            loop {
                rounds += 1;
                prop_assert!(rounds <= expected * 3 + 5, "draining did not terminate");

                let jobs = orchestrator.get_next_jobs(study_id, expected).unwrap();
                if jobs.is_empty() {
                    break;
                }
                for job in jobs {
                    let attempts_before = job.attempts;
                    let started = orchestrator.start_job(study_id, job.id).unwrap();
                    // Invariant 2: attempts never exceed max_attempts.
                    prop_assert!(started.attempts <= started.max_attempts);
                    // startJob increments attempts by exactly 1 on every claim.
                    prop_assert_eq!(started.attempts, attempts_before + 1);

                    let is_retry = attempts_before > 0;
                    let outcome = if is_retry {
                        Outcome::Success
                    } else {
                        let o = outcomes[outcome_idx % outcomes.len()];
                        outcome_idx += 1;
                        o
                    };

                    match outcome {
                        Outcome::Success => {
                            orchestrator.complete_job(study_id, job.id, passed_result()).unwrap();
                        }
                        Outcome::FailRetryable => {
                            orchestrator.fail_job(study_id, job.id, None, true).unwrap();
                        }
                        Outcome::FailPermanent => {
                            orchestrator.fail_job(study_id, job.id, None, false).unwrap();
                        }
                    }
                }

                // Invariant 5, checked at every observation point.
                let study = orchestrator.get_study(study_id).unwrap();
                let counts = study.graph.surface_counts();
                let total: usize = counts.values().map(|c| c.total as usize).sum();
                prop_assert_eq!(total, expected);
                prop_assert_eq!(study.graph.len(), expected);
            }

            // Invariant 4: a terminal study has nothing outstanding.
            let study = orchestrator.get_study(study_id).unwrap();
            if study.status.is_terminal() {
                let outstanding = study
                    .graph
                    .iter()
                    .filter(|job| matches!(job.status, JobStatus::Pending | JobStatus::Executing))
                    .count();
                prop_assert_eq!(outstanding, 0);
            }

            Ok(())
        })?;
    }
}

/// Boundary behavior: an empty query list completes immediately with zero
/// jobs, regardless of how many surfaces or locations are named.
#[test]
fn empty_query_list_completes_immediately_with_zero_jobs() {
    let orchestrator = StudyOrchestrator::new(Arc::new(InMemoryPersistence));
    let study_id = orchestrator.create_study(TenantId::new(), manifest(0, 2, 2, 0.8));
    let study = orchestrator.get_study(study_id).unwrap();
    assert_eq!(study.status, StudyStatus::Complete);
    assert_eq!(study.graph.len(), 0);
}

/// Boundary behavior: `maxRetriesPerCell = 0` terminates a single failure
/// as `failed` with no retry, even when the failure is marked retryable.
#[test]
fn zero_max_retries_fails_a_cell_on_the_first_attempt() {
    let orchestrator = StudyOrchestrator::new(Arc::new(InMemoryPersistence));
    let mut m = manifest(1, 1, 1, 0.0);
    m.completion_criteria.max_retries_per_cell = 0;
    let study_id = orchestrator.create_study(TenantId::new(), m);

    let job = orchestrator.get_next_jobs(study_id, 1).unwrap().into_iter().next().unwrap();
    orchestrator.start_job(study_id, job.id).unwrap();
    orchestrator.fail_job(study_id, job.id, None, true).unwrap();

    let study = orchestrator.get_study(study_id).unwrap();
    let job = study.graph.get(&job.id).unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.attempts, 1);
}
