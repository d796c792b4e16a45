//! Shared infrastructure for the AI-visibility execution core.
//!
//! This crate holds the pieces every other `visibility-*` crate needs and
//! that don't belong to any single component: stable identifiers, the
//! event-listener plumbing used by the adapter and executor layers, the
//! orchestrator-level error taxonomy, and evidence-content hashing.

pub mod config;
pub mod error;
pub mod events;
pub mod hash;
pub mod ids;

pub use config::Config;
pub use error::CoreError;
pub use events::{CoreEvent, EventListener, EventListeners, FnListener};
pub use hash::{hash_content, verify_hash, ContentHash};
pub use ids::{JobId, LocationId, QueryIndex, StudyId, SurfaceId, TenantId};
