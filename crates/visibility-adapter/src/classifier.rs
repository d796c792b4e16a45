//! Error classification as a pure data table (`spec.md` §4.1, §9): an
//! ordered list of `{patterns, classification}` records, classified by a
//! linear scan returning the first match. Substring-based rather than
//! typed, since upstream surfaces hand back free-text error messages,
//! not typed errors.

use std::time::Duration;

/// Canonical error codes, in classification priority order. Variant order
/// matters: [`classify`] returns the first matching row, and
/// [`CLASSIFICATION_TABLE`] is declared in this same order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    RateLimited,
    AuthFailed,
    Timeout,
    NetworkError,
    ServiceUnavailable,
    ContentBlocked,
    QuotaExceeded,
    SessionExpired,
    CaptchaRequired,
    InvalidResponse,
    UnknownError,
    /// Synthesized by the Job Executor when a job names a `surfaceId` with
    /// no registered adapter (`spec.md` §4.3 step 1); never produced by
    /// [`classify`] itself since no upstream message maps to it.
    AdapterMissing,
}

impl ErrorCode {
    /// Short string form, used in logs and metrics labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::RateLimited => "RATE_LIMITED",
            ErrorCode::AuthFailed => "AUTH_FAILED",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::NetworkError => "NETWORK_ERROR",
            ErrorCode::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            ErrorCode::ContentBlocked => "CONTENT_BLOCKED",
            ErrorCode::QuotaExceeded => "QUOTA_EXCEEDED",
            ErrorCode::SessionExpired => "SESSION_EXPIRED",
            ErrorCode::CaptchaRequired => "CAPTCHA_REQUIRED",
            ErrorCode::InvalidResponse => "INVALID_RESPONSE",
            ErrorCode::UnknownError => "UNKNOWN_ERROR",
            ErrorCode::AdapterMissing => "ADAPTER_MISSING",
        }
    }
}

/// What a caller (the adapter runtime, then the Job Executor) should do
/// with an error of this class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestedAction {
    Retry,
    RefreshSession,
    RotateProxy,
    AlertHuman,
}

/// The policy attached to one [`ErrorCode`].
#[derive(Debug, Clone, Copy)]
pub struct Classification {
    pub code: ErrorCode,
    pub retryable: bool,
    /// Base retry delay; the retry wrapper multiplies this by `2^attempt`.
    pub retry_delay: Duration,
    /// Whether this failure should count toward the adapter's
    /// consecutive-failure circuit-breaker tally, or is scoped to this one
    /// call (e.g. a malformed single response).
    pub surface_wide: bool,
    pub suggested_action: SuggestedAction,
}

struct Rule {
    patterns: &'static [&'static str],
    classification: Classification,
}

const BASE: Duration = Duration::from_secs(1);

/// The ordered classification table from `spec.md` §4.1. First matching
/// row wins; `UNKNOWN_ERROR` is the catch-all last row.
static CLASSIFICATION_TABLE: &[Rule] = &[
    Rule {
        patterns: &["rate limit", "429", "too many requests"],
        classification: Classification {
            code: ErrorCode::RateLimited,
            retryable: true,
            retry_delay: Duration::from_secs(60),
            surface_wide: true,
            suggested_action: SuggestedAction::Retry,
        },
    },
    Rule {
        patterns: &["401", "403", "unauthorized", "forbidden"],
        classification: Classification {
            code: ErrorCode::AuthFailed,
            retryable: false,
            retry_delay: Duration::ZERO,
            surface_wide: true,
            suggested_action: SuggestedAction::RefreshSession,
        },
    },
    Rule {
        patterns: &["timeout", "etimedout"],
        classification: Classification {
            code: ErrorCode::Timeout,
            retryable: true,
            retry_delay: BASE,
            surface_wide: false,
            suggested_action: SuggestedAction::Retry,
        },
    },
    Rule {
        patterns: &["econnrefused", "econnreset", "enotfound", "network"],
        classification: Classification {
            code: ErrorCode::NetworkError,
            retryable: true,
            retry_delay: Duration::from_secs(2),
            surface_wide: false,
            suggested_action: SuggestedAction::RotateProxy,
        },
    },
    Rule {
        patterns: &["502", "503", "bad gateway", "service unavailable"],
        classification: Classification {
            code: ErrorCode::ServiceUnavailable,
            retryable: true,
            retry_delay: Duration::from_secs(3),
            surface_wide: true,
            suggested_action: SuggestedAction::Retry,
        },
    },
    Rule {
        patterns: &["blocked", "content policy", "violation"],
        classification: Classification {
            code: ErrorCode::ContentBlocked,
            retryable: false,
            retry_delay: Duration::ZERO,
            surface_wide: false,
            suggested_action: SuggestedAction::AlertHuman,
        },
    },
    Rule {
        patterns: &["quota", "billing", "limit exceeded"],
        classification: Classification {
            code: ErrorCode::QuotaExceeded,
            retryable: false,
            retry_delay: Duration::ZERO,
            surface_wide: true,
            suggested_action: SuggestedAction::AlertHuman,
        },
    },
    Rule {
        patterns: &["session", "expired", "login required"],
        classification: Classification {
            code: ErrorCode::SessionExpired,
            retryable: false,
            retry_delay: Duration::ZERO,
            surface_wide: true,
            suggested_action: SuggestedAction::RefreshSession,
        },
    },
    Rule {
        patterns: &["captcha", "verification", "robot"],
        classification: Classification {
            code: ErrorCode::CaptchaRequired,
            retryable: false,
            retry_delay: Duration::ZERO,
            surface_wide: true,
            suggested_action: SuggestedAction::AlertHuman,
        },
    },
    Rule {
        patterns: &["invalid", "parse", "json"],
        classification: Classification {
            code: ErrorCode::InvalidResponse,
            retryable: true,
            retry_delay: BASE,
            surface_wide: false,
            suggested_action: SuggestedAction::Retry,
        },
    },
];

const UNKNOWN: Classification = Classification {
    code: ErrorCode::UnknownError,
    retryable: true,
    retry_delay: BASE,
    surface_wide: false,
    suggested_action: SuggestedAction::Retry,
};

/// Classifies a raw upstream error message using the ordered table above.
/// Matching is case-insensitive substring search; the first row with a
/// matching pattern wins, falling back to `UNKNOWN_ERROR`.
pub fn classify(message: &str) -> Classification {
    let lower = message.to_lowercase();
    for rule in CLASSIFICATION_TABLE {
        if rule.patterns.iter().any(|p| lower.contains(p)) {
            return rule.classification;
        }
    }
    UNKNOWN
}
