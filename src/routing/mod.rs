//! Routing data model.
//!
//! # Data Flow
//! ```text
//! FlowController::start / leave
//!     → tree.rs (add_routable / remove_routable under the shared lock)
//!     → registry + node graph updated together
//!
//! Navigator
//!     → tree.rs (active_path, get_routable_with)
//!     → entry.rs (RoutingEntry handed to Routable::enter / leave)
//! ```
//!
//! # Design Decisions
//! - Identifiers are unique within the active hierarchy (lookup is global)
//! - Context is opaque: only the entered node reads it
//! - Entries reference routables weakly; the registry holds the strong handle

pub mod entry;
pub mod identifier;
pub mod tree;

pub use entry::{ManagedEntries, RoutingEntry};
pub use identifier::{RoutingContext, RoutingIdentifier};
pub use tree::{Node, RoutingTree, SharedTree};
