//! Observability hooks for upstream attempts, retries and stream decoding.
//!
//! ```rust
//! use lobserve::{MetricsObservabilityHooks, SafeUpstreamHooks, TracingObservabilityHooks};
//!
//! let _upstream_hooks = SafeUpstreamHooks::new(TracingObservabilityHooks);
//! let _metrics = MetricsObservabilityHooks;
//! ```

mod metrics_hooks;
mod safe_hooks;
mod tracing_hooks;

pub use metrics_hooks::MetricsObservabilityHooks;
pub use safe_hooks::SafeUpstreamHooks;
pub use tracing_hooks::TracingObservabilityHooks;

pub mod prelude {
    pub use crate::{MetricsObservabilityHooks, SafeUpstreamHooks, TracingObservabilityHooks};
}
