//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! handler, stream service, server:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every log line via the trace span
//! - Metrics are cheap and no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
