//! The capability of occupying a routing tree node.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::NavigationResult;
use crate::routing::{RoutingEntry, RoutingIdentifier};

/// Anything that can occupy a node of the routing tree.
///
/// The futures returned by `enter` and `leave` resolve only once the
/// presentation side effect has settled; sequencing code relies on that.
#[async_trait]
pub trait Routable: Send + Sync {
    fn identifier(&self) -> &RoutingIdentifier;

    /// Current entry of this routable, referencing it weakly.
    fn entry(&self) -> RoutingEntry;

    /// Enter the child described by `entry`.
    ///
    /// Resolves with the routable that now owns the entered node, after its
    /// presentation completed. `Ok(None)` means this routable has no case for
    /// the identifier; nothing was changed.
    async fn enter(
        &self,
        entry: &RoutingEntry,
        animated: bool,
    ) -> NavigationResult<Option<Arc<dyn Routable>>>;

    /// Dismiss this routable, then remove it from the tree and from its
    /// parent. Resolves after all of that happened.
    async fn leave(&self, entry: &RoutingEntry, animated: bool) -> NavigationResult<()>;

    /// Deliver caller-supplied payload to a freshly entered node. Absent or
    /// unexpected payloads are ignored.
    fn did_enter_with_info(&self, info: Option<&(dyn Any + Send + Sync)>);

    fn as_any(&self) -> &dyn Any;
}

impl std::fmt::Debug for dyn Routable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Routable").field(self.identifier()).finish()
    }
}
