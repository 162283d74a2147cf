//! Navigation subsystem: destinations, strategies, the routing table, and
//! the navigator that executes requests.
//!
//! # Data Flow
//! ```text
//! route_to_named("inbox") / route_to(path) / enter(entry)
//!     → table.rs (keys → Path, only for table-driven requests)
//!     → navigator.rs (queue; one request in flight)
//!         → strategy.rs (active chain + Path → Plan)
//!         → leave steps, innermost first, each awaited
//!         → enter steps from the anchor, outermost first, each awaited
//!         → did_enter_with_info on the last entered routable
//!     → NavigationOutcome
//! ```
//!
//! # Design Decisions
//! - Requests are serialized through a channel instead of a lock, so a slow
//!   presentation never blocks callers, only later requests
//! - A fatal tree violation halts the navigator for good

pub mod navigator;
pub mod path;
pub mod strategy;
pub mod table;

pub use navigator::{Info, NavigationOutcome, Navigator, PendingNavigation, RouteOptions};
pub use path::Path;
pub use strategy::{CommonAncestor, Plan, Rebuild, RoutingStrategy};
pub use table::{Resolver, RoutingTable, SharedTable};
