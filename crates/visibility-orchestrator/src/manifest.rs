//! The manifest: a study's validated, immutable input (`spec.md` §3).

use visibility_core::{LocationId, SurfaceId};
use visibility_executor::{EvidenceLevel, QualityGates, SessionIsolation};
use visibility_validator::CompletionCriteria;

/// Where a request should appear to originate from (`spec.md` §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyType {
    Datacenter,
    Residential,
    Mobile,
    Isp,
}

/// A named request-origin context.
#[derive(Debug, Clone)]
pub struct Location {
    pub id: LocationId,
    pub country: String,
    pub region: Option<String>,
    pub city: Option<String>,
    pub proxy_type: ProxyType,
}

impl Location {
    /// Builds a location with only the required fields set.
    pub fn new(id: impl Into<LocationId>, country: impl Into<String>, proxy_type: ProxyType) -> Self {
        Self {
            id: id.into(),
            country: country.into(),
            region: None,
            city: None,
            proxy_type,
        }
    }
}

/// Request text plus an optional category tag (`spec.md` §3).
#[derive(Debug, Clone)]
pub struct Query {
    pub text: String,
    pub category: Option<String>,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: None,
        }
    }

    pub fn with_category(text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: Some(category.into()),
        }
    }
}

/// The unit of client submission: a cross-product of {queries × surfaces ×
/// locations} plus the policy blocks that govern how it runs
/// (`spec.md` §3).
///
/// Surfaces are referenced by id only — the Surface *entity* (category,
/// capabilities, rate limit, cost coefficients) is owned by whatever
/// adapter is registered under that id in `visibility-executor`'s
/// registry, not duplicated here.
#[derive(Debug, Clone)]
pub struct Manifest {
    pub queries: Vec<Query>,
    pub surfaces: Vec<SurfaceId>,
    pub locations: Vec<Location>,
    pub quality_gates: QualityGates,
    pub completion_criteria: CompletionCriteria,
    pub evidence_level: EvidenceLevel,
    pub legal_hold: bool,
    /// Deadline as milliseconds since the Unix epoch; kept as a plain
    /// integer rather than `SystemTime` so the core stays free of
    /// wall-clock reads outside what the caller provides.
    pub deadline_epoch_ms: Option<u64>,
    pub session_isolation: SessionIsolation,
}

impl Manifest {
    /// The number of execution cells this manifest expands to:
    /// `|queries| x |surfaces| x |locations|` (`spec.md` §3 `JobGraph`
    /// invariant).
    pub fn cell_count(&self) -> usize {
        self.queries.len() * self.surfaces.len() * self.locations.len()
    }
}
