//! Hierarchical navigation coordinator.
//!
//! Models an application's screen hierarchy as a routing tree, diffs the
//! active chain against requested destinations, and drives the resulting
//! leave/enter steps through an asynchronous presenter, one request at a
//! time.

pub mod config;
pub mod demo;
pub mod error;
pub mod flow;
pub mod navigation;
pub mod observability;
pub mod routing;

pub use config::NavigatorConfig;
pub use error::{NavigationError, NavigationResult, TableError, TreeError};
pub use flow::{FlowController, Presenter, Routable};
pub use navigation::{Navigator, Path, RoutingTable};
pub use routing::{RoutingEntry, RoutingIdentifier, RoutingTree};
