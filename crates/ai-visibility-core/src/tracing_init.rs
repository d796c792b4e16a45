//! Structured logging setup (`spec.md` §6 ambient addition: "ai-visibility-core
//! exposes `init_tracing()` wiring `tracing-subscriber`'s `EnvFilter` +
//! `fmt` layer").

/// Initializes a global `tracing` subscriber reading its filter directives
/// from `RUST_LOG` (defaulting to `info` when unset), with JSON-formatted
/// output — the shape expected by a log aggregator in a non-interactive
/// deployment, matching how the surrounding example pack's services run.
///
/// Returns an error if a global subscriber is already set; callers that
/// only want to try are free to ignore it.
pub fn init_tracing() -> Result<(), tracing_subscriber::util::TryInitError> {
    use tracing_subscriber::prelude::*;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json())
        .try_init()
}
