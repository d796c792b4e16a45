//! Study-level completion-criteria evaluation (`spec.md` §4.5, §8).
//!
//! `CompletionCriteria` is the manifest's `completionCriteria` block
//! (`spec.md` §3); it lives here rather than in the orchestrator crate
//! because evaluating it is the Validator's job, and the orchestrator
//! only carries it through as opaque manifest data.

use std::collections::HashMap;
use visibility_core::SurfaceId;

/// Completed/failed/total counts for one surface, as tallied by the
/// orchestrator's job graph.
#[derive(Debug, Clone, Copy, Default)]
pub struct SurfaceCounts {
    pub total: u64,
    pub completed: u64,
    pub failed: u64,
    pub cancelled: u64,
}

impl SurfaceCounts {
    /// `completed / max(total, 1)` (`spec.md` §4.5: avoids a division by
    /// zero when a surface has no cells at all).
    pub fn completion_rate(&self) -> f64 {
        self.completed as f64 / self.total.max(1) as f64
    }
}

/// The manifest's `completionCriteria` block (`spec.md` §3).
#[derive(Debug, Clone)]
pub struct CompletionCriteria {
    /// Surfaces that must meet `coverage_threshold` for the study to
    /// complete successfully.
    pub required_surfaces: Vec<SurfaceId>,
    /// Minimum fraction of a required surface's cells that must complete,
    /// in `[0, 1]`.
    pub coverage_threshold: f64,
    /// Surfaces tracked for visibility but whose shortfall doesn't block
    /// completion; only warned about below a fixed 0.5 bar.
    pub optional_surfaces: Vec<SurfaceId>,
    /// Attempts allotted to a single cell before it's permanently failed.
    pub max_retries_per_cell: u32,
}

/// The fixed bar below which an optional surface's completion earns a
/// warning (`spec.md` §4.5: "e.g. < 0.5").
const OPTIONAL_SURFACE_WARNING_THRESHOLD: f64 = 0.5;

/// The outcome of evaluating a study's completion criteria against its
/// current per-surface counts.
#[derive(Debug, Clone)]
pub struct StudyValidationReport {
    /// `true` iff every required surface meets `coverage_threshold`.
    pub can_complete: bool,
    /// Required surfaces that do not (yet, or ever) meet threshold.
    pub shortfalls: Vec<SurfaceId>,
    /// Non-blocking notices about optional surfaces.
    pub warnings: Vec<String>,
}

/// Evaluates a study's completion criteria given its current per-surface
/// counts (`spec.md` §4.5 "Study-level check").
pub fn evaluate_study(
    counts: &HashMap<SurfaceId, SurfaceCounts>,
    criteria: &CompletionCriteria,
) -> StudyValidationReport {
    let mut shortfalls = Vec::new();
    for surface_id in &criteria.required_surfaces {
        let rate = counts.get(surface_id).copied().unwrap_or_default().completion_rate();
        if rate < criteria.coverage_threshold {
            shortfalls.push(surface_id.clone());
        }
    }

    let mut warnings = Vec::new();
    for surface_id in &criteria.optional_surfaces {
        let rate = counts.get(surface_id).copied().unwrap_or_default().completion_rate();
        if rate < OPTIONAL_SURFACE_WARNING_THRESHOLD {
            warnings.push(format!(
                "optional surface {surface_id} is below the {OPTIONAL_SURFACE_WARNING_THRESHOLD:.1} completion bar (at {rate:.2})"
            ));
        }
    }

    StudyValidationReport {
        can_complete: shortfalls.is_empty(),
        shortfalls,
        warnings,
    }
}

/// Whether completion criteria can *still* be met if every remaining
/// pending/executing cell for a required surface eventually succeeds
/// (`spec.md` §4.4: "if criteria cannot be met even by completing all
/// still-pending jobs ... study -> failed").
///
/// `counts` here should include not-yet-terminal cells in `total` (the
/// orchestrator passes `total - failed` as the best-case numerator).
pub fn best_case_can_complete(
    counts: &HashMap<SurfaceId, SurfaceCounts>,
    criteria: &CompletionCriteria,
) -> bool {
    criteria.required_surfaces.iter().all(|surface_id| {
        let c = counts.get(surface_id).copied().unwrap_or_default();
        let best_case_completed = c.total.saturating_sub(c.failed).saturating_sub(c.cancelled);
        let best_case_rate = best_case_completed as f64 / c.total.max(1) as f64;
        best_case_rate >= criteria.coverage_threshold
    })
}
