//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Bootstrap and HTTP layer produce:
//!     → logging.rs (structured log events, one per route directory)
//!     → metrics.rs (mount gauges, request counters and histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, plain or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Structured logging for machine parsing
//! - Request ID flows through every response
//! - Metrics are cheap and no-ops when the exporter is off

pub mod logging;
pub mod metrics;
