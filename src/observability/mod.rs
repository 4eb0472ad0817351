//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! HttpClient::invoke
//!     → correlation.rs (ambient id, copied into the correlation header)
//!     → logging.rs     (structured events through `tracing`)
//!     → metrics.rs     (call counters and latency through `metrics`)
//! ```
//!
//! # Design Decisions
//! - The library only emits; installing a subscriber or a metrics recorder is
//!   left to the binary or the embedding application
//! - The correlation id is per-thread, matching the blocking call model

pub mod correlation;
pub mod logging;
pub mod metrics;
