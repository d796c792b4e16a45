//! Surface Adapter Layer: the uniform `query()` contract, shared
//! retry/rate-limit/circuit runtime, and the built-in surface leaves
//! (`spec.md` §4.1, §4.2).

pub mod classifier;
pub mod events;
pub mod health;
pub mod leaf;
pub mod leaves;
pub mod ratelimit;
pub mod request;
pub mod runtime;
pub mod stats;

pub use classifier::{classify, Classification, ErrorCode, SuggestedAction};
pub use events::AdapterEvent;
pub use health::{CircuitState, HealthState, CONSECUTIVE_FAILURE_THRESHOLD};
pub use leaf::{AuthRequirement, Capabilities, SurfaceAdapterLeaf, SurfaceCategory, SurfaceMetadata};
pub use ratelimit::RateLimitState;
pub use request::{AdapterError, AdapterRequest, AdapterResponse, ConversationTurn, TokenUsage, Timing};
pub use runtime::{AdapterRuntime, RuntimeConfig};
pub use stats::AdapterStats;
