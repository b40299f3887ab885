//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Session, monitor, gateway produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → stderr (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, `watch` only)
//! ```

pub mod logging;
pub mod metrics;
