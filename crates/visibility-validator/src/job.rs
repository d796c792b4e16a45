//! Job-level quality checks (`spec.md` §4.5).
//!
//! Checks run in the fixed order of `spec.md` §4.5: `result_present`,
//! `content_present`, `min_length`, `error_pattern`,
//! `required_keywords`/`forbidden_keywords`, `evidence_present`/
//! `evidence_screenshot`. Each produces a named, severity-tagged result;
//! [`validate_job`] folds them into one [`JobValidationReport`].

use visibility_core::ContentHash;
use visibility_executor::{EvidenceLevel, QualityGates};

/// How serious a failed check is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fails the job outright.
    Error,
    /// Downgrades the job to `warning` unless `strictMode` is set.
    Warning,
}

/// The outcome of one named check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: &'static str,
    pub passed: bool,
    pub message: String,
    pub severity: Severity,
}

impl CheckResult {
    fn pass(name: &'static str, severity: Severity) -> Self {
        Self {
            name,
            passed: true,
            message: String::new(),
            severity,
        }
    }

    fn fail(name: &'static str, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            name,
            passed: false,
            message: message.into(),
            severity,
        }
    }
}

/// Overall verdict for one job, after folding every check
/// (`spec.md` §4.5: "failed if any severity-error check fails; warning if
/// only warning-severity checks fail; passed otherwise").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobValidationStatus {
    Passed,
    Warning,
    Failed,
}

/// The full report for one job's result.
#[derive(Debug, Clone)]
pub struct JobValidationReport {
    pub status: JobValidationStatus,
    pub checks: Vec<CheckResult>,
}

impl JobValidationReport {
    /// Every failed check's name, for diagnostics.
    pub fn failed_check_names(&self) -> Vec<&'static str> {
        self.checks.iter().filter(|c| !c.passed).map(|c| c.name).collect()
    }
}

/// Evidence captured alongside a job's result, when `evidenceLevel`
/// requires it.
#[derive(Debug, Clone, Default)]
pub struct JobEvidence {
    pub content_hash: Option<ContentHash>,
    pub has_screenshot: bool,
}

/// The inputs [`validate_job`] needs: the result text (if any), the
/// manifest's quality gates, the evidence level this job was run at, and
/// whatever evidence was captured.
pub struct JobValidationInput<'a> {
    pub response_text: Option<&'a str>,
    pub quality_gates: &'a QualityGates,
    pub evidence_level: EvidenceLevel,
    pub evidence: &'a JobEvidence,
    /// Promotes every `Warning` severity to `Error` (`spec.md` §6
    /// `strictMode`).
    pub strict_mode: bool,
}

/// Runs every job-level check in spec order and folds them into a report.
pub fn validate_job(input: &JobValidationInput<'_>) -> JobValidationReport {
    let mut checks = Vec::with_capacity(6);

    let result_present = input.response_text.is_some();
    checks.push(if result_present {
        CheckResult::pass("result_present", Severity::Error)
    } else {
        CheckResult::fail("result_present", Severity::Error, "no result was recorded for this job")
    });

    // The remaining checks all need a response to inspect; without one
    // they simply can't pass, but we don't pile on redundant failures.
    let text = input.response_text.unwrap_or("");

    if input.quality_gates.require_actual_content {
        let has_content = !text.trim().is_empty();
        checks.push(if has_content {
            CheckResult::pass("content_present", Severity::Error)
        } else {
            CheckResult::fail("content_present", Severity::Error, "response text is empty")
        });
    }

    if let Some(min_length) = input.quality_gates.min_response_length {
        checks.push(if text.len() >= min_length {
            CheckResult::pass("min_length", Severity::Error)
        } else {
            CheckResult::fail(
                "min_length",
                Severity::Error,
                format!("response length {} is below the minimum {min_length}", text.len()),
            )
        });
    }

    let lower = text.to_lowercase();
    let matched_error_pattern = input
        .quality_gates
        .error_patterns
        .iter()
        .find(|pattern| lower.contains(pattern.to_lowercase().as_str()));
    checks.push(match matched_error_pattern {
        None => CheckResult::pass("error_pattern", Severity::Error),
        Some(pattern) => CheckResult::fail(
            "error_pattern",
            Severity::Error,
            format!("response matched error pattern \"{pattern}\""),
        ),
    });

    if !input.quality_gates.required_keywords.is_empty() {
        let missing: Vec<&str> = input
            .quality_gates
            .required_keywords
            .iter()
            .filter(|kw| !lower.contains(kw.to_lowercase().as_str()))
            .map(|s| s.as_str())
            .collect();
        checks.push(if missing.is_empty() {
            CheckResult::pass("required_keywords", Severity::Warning)
        } else {
            CheckResult::fail(
                "required_keywords",
                Severity::Warning,
                format!("missing required keywords: {}", missing.join(", ")),
            )
        });
    }

    if !input.quality_gates.forbidden_keywords.is_empty() {
        let present: Vec<&str> = input
            .quality_gates
            .forbidden_keywords
            .iter()
            .filter(|kw| lower.contains(kw.to_lowercase().as_str()))
            .map(|s| s.as_str())
            .collect();
        checks.push(if present.is_empty() {
            CheckResult::pass("forbidden_keywords", Severity::Warning)
        } else {
            CheckResult::fail(
                "forbidden_keywords",
                Severity::Warning,
                format!("contains forbidden keywords: {}", present.join(", ")),
            )
        });
    }

    if input.evidence_level == EvidenceLevel::Full {
        checks.push(if input.evidence.content_hash.is_some() {
            CheckResult::pass("evidence_present", Severity::Error)
        } else {
            CheckResult::fail(
                "evidence_present",
                Severity::Error,
                "evidenceLevel=full requires archived evidence content",
            )
        });
        checks.push(if input.evidence.has_screenshot {
            CheckResult::pass("evidence_screenshot", Severity::Error)
        } else {
            CheckResult::fail(
                "evidence_screenshot",
                Severity::Error,
                "evidenceLevel=full requires a captured screenshot",
            )
        });
    }

    let status = overall_status(&checks, input.strict_mode);
    JobValidationReport { status, checks }
}

fn overall_status(checks: &[CheckResult], strict_mode: bool) -> JobValidationStatus {
    let mut any_error_failed = false;
    let mut any_warning_failed = false;

    for check in checks {
        if check.passed {
            continue;
        }
        match check.severity {
            Severity::Error => any_error_failed = true,
            Severity::Warning => any_warning_failed = true,
        }
    }

    if any_error_failed || (strict_mode && any_warning_failed) {
        JobValidationStatus::Failed
    } else if any_warning_failed {
        JobValidationStatus::Warning
    } else {
        JobValidationStatus::Passed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gates() -> QualityGates {
        QualityGates::default()
    }

    fn evidence() -> JobEvidence {
        JobEvidence::default()
    }

    #[test]
    fn missing_result_fails_outright() {
        let input = JobValidationInput {
            response_text: None,
            quality_gates: &gates(),
            evidence_level: EvidenceLevel::None,
            evidence: &evidence(),
            strict_mode: false,
        };
        let report = validate_job(&input);
        assert_eq!(report.status, JobValidationStatus::Failed);
        assert_eq!(report.failed_check_names(), vec!["result_present"]);
    }

    #[test]
    fn plain_response_with_default_gates_passes() {
        let input = JobValidationInput {
            response_text: Some("a perfectly ordinary answer"),
            quality_gates: &gates(),
            evidence_level: EvidenceLevel::None,
            evidence: &evidence(),
            strict_mode: false,
        };
        let report = validate_job(&input);
        assert_eq!(report.status, JobValidationStatus::Passed);
    }

    #[test]
    fn response_too_short_fails_min_length() {
        let mut qg = gates();
        qg.min_response_length = Some(100);
        let input = JobValidationInput {
            response_text: Some("short"),
            quality_gates: &qg,
            evidence_level: EvidenceLevel::None,
            evidence: &evidence(),
            strict_mode: false,
        };
        let report = validate_job(&input);
        assert_eq!(report.status, JobValidationStatus::Failed);
        assert!(report.failed_check_names().contains(&"min_length"));
    }

    #[test]
    fn default_error_patterns_catch_disguised_error_pages() {
        let input = JobValidationInput {
            response_text: Some("Error: Service Unavailable, please try again later"),
            quality_gates: &gates(),
            evidence_level: EvidenceLevel::None,
            evidence: &evidence(),
            strict_mode: false,
        };
        let report = validate_job(&input);
        assert_eq!(report.status, JobValidationStatus::Failed);
        assert!(report.failed_check_names().contains(&"error_pattern"));
    }

    #[test]
    fn missing_required_keyword_warns_but_does_not_fail() {
        let mut qg = gates();
        qg.required_keywords = vec!["widget".to_string()];
        let input = JobValidationInput {
            response_text: Some("no matching term here"),
            quality_gates: &qg,
            evidence_level: EvidenceLevel::None,
            evidence: &evidence(),
            strict_mode: false,
        };
        let report = validate_job(&input);
        assert_eq!(report.status, JobValidationStatus::Warning);
    }

    #[test]
    fn strict_mode_promotes_warnings_to_failures() {
        let mut qg = gates();
        qg.required_keywords = vec!["widget".to_string()];
        let input = JobValidationInput {
            response_text: Some("no matching term here"),
            quality_gates: &qg,
            evidence_level: EvidenceLevel::None,
            evidence: &evidence(),
            strict_mode: true,
        };
        let report = validate_job(&input);
        assert_eq!(report.status, JobValidationStatus::Failed);
    }

    #[test]
    fn full_evidence_level_requires_hash_and_screenshot() {
        let input = JobValidationInput {
            response_text: Some("a fine answer"),
            quality_gates: &gates(),
            evidence_level: EvidenceLevel::Full,
            evidence: &evidence(),
            strict_mode: false,
        };
        let report = validate_job(&input);
        assert_eq!(report.status, JobValidationStatus::Failed);
        assert!(report.failed_check_names().contains(&"evidence_present"));
        assert!(report.failed_check_names().contains(&"evidence_screenshot"));
    }

    #[test]
    fn full_evidence_level_passes_once_captured() {
        let evidence = JobEvidence {
            content_hash: Some(visibility_core::hash_content(b"a fine answer")),
            has_screenshot: true,
        };
        let input = JobValidationInput {
            response_text: Some("a fine answer"),
            quality_gates: &gates(),
            evidence_level: EvidenceLevel::Full,
            evidence: &evidence,
            strict_mode: false,
        };
        let report = validate_job(&input);
        assert_eq!(report.status, JobValidationStatus::Passed);
    }
}
