//! Orchestrator-level error taxonomy.
//!
//! `spec.md` §7 adds two kinds on top of the adapter classification
//! (`spec.md` §4.1): a study lookup failure and an operation incompatible
//! with a study's current state. Both are returned synchronously to the
//! caller, never retried.

use crate::ids::StudyId;
use thiserror::Error;

/// Errors surfaced by [`visibility-orchestrator`](https://docs.rs) operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// No study exists with the given id.
    #[error("study {0} not found")]
    StudyNotFound(StudyId),

    /// The requested operation is not valid from the study's current state.
    #[error("cannot {operation} while study {study} is {current_state}")]
    InvalidTransition {
        /// The study the operation targeted.
        study: StudyId,
        /// The state the study was in when the operation was attempted.
        current_state: &'static str,
        /// The operation that was rejected (e.g. `"resumeStudy"`).
        operation: &'static str,
    },

    /// No job exists with the given id within the given study.
    #[error("job {job} not found in study {study}")]
    JobNotFound {
        /// The study that was searched.
        study: StudyId,
        /// The job id that was not found.
        job: crate::ids::JobId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_transition_message_names_the_operation() {
        let study = StudyId::new();
        let err = CoreError::InvalidTransition {
            study,
            current_state: "complete",
            operation: "resumeStudy",
        };
        assert!(err.to_string().contains("resumeStudy"));
        assert!(err.to_string().contains("complete"));
    }
}
