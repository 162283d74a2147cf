//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → NavigatorConfig (validated, immutable)
//!     → FlowCatalog, RoutingTable, Navigator defaults, demo presenter
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → apply_table_updates swaps the SharedTable
//! ```
//!
//! # Design Decisions
//! - All fields have defaults; an empty file runs the demo application
//! - Validation separates syntactic (serde) from semantic checks
//! - Only the routing table reloads at runtime; flows are fixed at startup

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    FlowConfig, NavigationConfig, NavigatorConfig, ObservabilityConfig, PathConfig,
    PresentationConfig, StrategyKind, TableConfig, TableEntryConfig,
};
pub use validation::{validate_config, ValidationError};
pub use watcher::{apply_table_updates, ConfigWatcher};
