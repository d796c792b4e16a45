//! A study: one executing instance of a manifest, and its top-level state
//! machine (`spec.md` §4.4: "manifest_received -> validating -> queued ->
//! executing -> {complete, failed, cancelled}; executing <-> paused").

use crate::graph::JobGraph;
use crate::manifest::Manifest;
use visibility_core::{CoreError, StudyId, TenantId};

/// A study's top-level lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudyStatus {
    ManifestReceived,
    Validating,
    Queued,
    Executing,
    Paused,
    Complete,
    Failed,
    Cancelled,
}

impl StudyStatus {
    fn name(self) -> &'static str {
        match self {
            StudyStatus::ManifestReceived => "manifest_received",
            StudyStatus::Validating => "validating",
            StudyStatus::Queued => "queued",
            StudyStatus::Executing => "executing",
            StudyStatus::Paused => "paused",
            StudyStatus::Complete => "complete",
            StudyStatus::Failed => "failed",
            StudyStatus::Cancelled => "cancelled",
        }
    }

    /// Whether no further state transition is possible
    /// (`spec.md` §4.4: complete/failed/cancelled are terminal).
    pub fn is_terminal(self) -> bool {
        matches!(self, StudyStatus::Complete | StudyStatus::Failed | StudyStatus::Cancelled)
    }
}

/// One executing instance of a [`Manifest`].
#[derive(Debug, Clone)]
pub struct Study {
    pub id: StudyId,
    pub tenant_id: TenantId,
    pub manifest: Manifest,
    pub status: StudyStatus,
    pub graph: JobGraph,
}

impl Study {
    /// Asserts the study is in `expected` state, or returns the
    /// `spec.md` §7 `InvalidTransition` error naming `operation`.
    pub fn require_status(&self, expected: StudyStatus, operation: &'static str) -> Result<(), CoreError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(CoreError::InvalidTransition {
                study: self.id,
                current_state: self.status.name(),
                operation,
            })
        }
    }

    /// Asserts the study is in any of `allowed`, or returns the
    /// `spec.md` §7 `InvalidTransition` error naming `operation`.
    pub fn require_one_of(&self, allowed: &[StudyStatus], operation: &'static str) -> Result<(), CoreError> {
        if allowed.contains(&self.status) {
            Ok(())
        } else {
            Err(CoreError::InvalidTransition {
                study: self.id,
                current_state: self.status.name(),
                operation,
            })
        }
    }
}
