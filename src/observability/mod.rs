//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! manager / watcher / CLI produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape, binary only)
//! ```

pub mod logging;
pub mod metrics;
