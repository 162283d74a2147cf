//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! tree.rs, controller.rs, navigator.rs produce:
//!     → tracing events (structured fields, one `navigation` span per
//!       request carrying its request id)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout)
//!     → Prometheus scrape endpoint (optional)
//! ```

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
pub use metrics::init_metrics;
