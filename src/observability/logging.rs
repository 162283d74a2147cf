//! Structured logging.
//!
//! # Design Decisions
//! - Uses the tracing crate everywhere; this module only installs the
//!   subscriber
//! - `RUST_LOG` wins over the configured level
//! - A second initialization is ignored, so tests and embedding hosts can call
//!   it freely

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Filter directive built from the configured level.
pub fn default_directive(config: &ObservabilityConfig) -> String {
    format!("flow_router={}", config.log_level)
}

/// Install the global subscriber. Returns `false` if one was already set.
pub fn init_logging(config: &ObservabilityConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}
