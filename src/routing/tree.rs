//! The routing tree: the single active navigation hierarchy.
//!
//! # Responsibilities
//! - Keep the node graph and the identifier → routable registry in sync
//! - Reject structurally invalid insertions
//! - Report the currently active chain of nodes
//!
//! # Design Decisions
//! - Nodes own their children; parents are found by depth-first search, so
//!   the tree holds no back-references and no cycles
//! - Removing a node removes its whole subtree and purges every removed
//!   identifier from the registry
//! - The tree is an explicit object shared through `SharedTree`, never global
//!   state, so tests can build isolated instances

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::TreeError;
use crate::flow::Routable;
use crate::observability::metrics;
use crate::routing::identifier::RoutingIdentifier;

/// Routing tree shared between the navigator and every flow controller.
///
/// The lock must never be held across an `.await`.
pub type SharedTree = Arc<Mutex<RoutingTree>>;

/// A node of the routing tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    identifier: RoutingIdentifier,
    sub_nodes: Vec<Node>,
}

impl Node {
    fn new(identifier: RoutingIdentifier) -> Self {
        Self {
            identifier,
            sub_nodes: Vec::new(),
        }
    }

    pub fn identifier(&self) -> &RoutingIdentifier {
        &self.identifier
    }

    /// Children in insertion order; the last one is the most recently entered.
    pub fn sub_nodes(&self) -> &[Node] {
        &self.sub_nodes
    }

    /// Depth-first search for `identifier` in this subtree.
    pub fn find(&self, identifier: &RoutingIdentifier) -> Option<&Node> {
        if &self.identifier == identifier {
            return Some(self);
        }
        self.sub_nodes.iter().find_map(|node| node.find(identifier))
    }

    fn find_mut(&mut self, identifier: &RoutingIdentifier) -> Option<&mut Node> {
        if &self.identifier == identifier {
            return Some(self);
        }
        self.sub_nodes
            .iter_mut()
            .find_map(|node| node.find_mut(identifier))
    }

    fn find_parent(&self, identifier: &RoutingIdentifier) -> Option<&Node> {
        if self.sub_nodes.iter().any(|node| &node.identifier == identifier) {
            return Some(self);
        }
        self.sub_nodes
            .iter()
            .find_map(|node| node.find_parent(identifier))
    }

    fn find_parent_mut(&mut self, identifier: &RoutingIdentifier) -> Option<&mut Node> {
        if self.sub_nodes.iter().any(|node| &node.identifier == identifier) {
            return Some(self);
        }
        self.sub_nodes
            .iter_mut()
            .find_map(|node| node.find_parent_mut(identifier))
    }

    fn collect_identifiers(&self, out: &mut Vec<RoutingIdentifier>) {
        out.push(self.identifier.clone());
        for node in &self.sub_nodes {
            node.collect_identifiers(out);
        }
    }
}

/// Node graph plus registry of the routables occupying the nodes.
#[derive(Default)]
pub struct RoutingTree {
    root: Option<Node>,
    routables: HashMap<RoutingIdentifier, Arc<dyn Routable>>,
}

impl RoutingTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh, empty tree behind a lock.
    pub fn shared() -> SharedTree {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Register `routable` and insert its node under `parent`.
    ///
    /// The first registration without a parent initializes the tree.
    pub fn add_routable(
        &mut self,
        routable: Arc<dyn Routable>,
        parent: Option<&RoutingIdentifier>,
    ) -> Result<(), TreeError> {
        let identifier = routable.identifier().clone();

        if self.routables.contains_key(&identifier) {
            return Err(TreeError::DuplicateIdentifier(identifier));
        }

        match (self.root.as_mut(), parent) {
            (None, None) => {
                self.root = Some(Node::new(identifier.clone()));
            }
            (Some(_), None) => return Err(TreeError::MissingParent(identifier)),
            (root, Some(parent)) => {
                let parent_node = root
                    .and_then(|root| root.find_mut(parent))
                    .ok_or_else(|| TreeError::ParentNotFound {
                        parent: parent.clone(),
                        child: identifier.clone(),
                    })?;
                parent_node.sub_nodes.push(Node::new(identifier.clone()));
            }
        }

        tracing::debug!(routable = %identifier, parent = ?parent.map(|p| p.as_str()), "Routable added to tree");
        self.routables.insert(identifier, routable);
        metrics::record_tree_size(self.routables.len());
        Ok(())
    }

    /// Remove the node of `routable` together with its subtree.
    ///
    /// Removing the root empties the tree. Returns every identifier purged
    /// from the registry; empty when the routable has no node.
    pub fn remove_routable(&mut self, routable: &dyn Routable) -> Vec<RoutingIdentifier> {
        self.remove_identifier(routable.identifier())
    }

    /// Identifier-keyed form of [`RoutingTree::remove_routable`].
    pub fn remove_identifier(&mut self, identifier: &RoutingIdentifier) -> Vec<RoutingIdentifier> {
        let Some(root) = self.root.as_mut() else {
            return Vec::new();
        };

        if &root.identifier == identifier {
            let mut removed = Vec::new();
            root.collect_identifiers(&mut removed);
            self.empty_tree();
            return removed;
        }

        let Some(parent) = root.find_parent_mut(identifier) else {
            return Vec::new();
        };
        let Some(index) = parent
            .sub_nodes
            .iter()
            .position(|node| &node.identifier == identifier)
        else {
            return Vec::new();
        };
        let node = parent.sub_nodes.remove(index);

        let mut removed = Vec::new();
        node.collect_identifiers(&mut removed);
        for id in &removed {
            self.routables.remove(id);
        }

        tracing::debug!(routable = %identifier, purged = removed.len(), "Routable removed from tree");
        metrics::record_tree_size(self.routables.len());
        removed
    }

    pub fn get_routable_with(&self, identifier: &RoutingIdentifier) -> Option<Arc<dyn Routable>> {
        self.routables.get(identifier).cloned()
    }

    /// Reset to the empty state.
    pub fn empty_tree(&mut self) {
        self.root = None;
        self.routables.clear();
        metrics::record_tree_size(0);
    }

    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref()
    }

    pub fn node(&self, identifier: &RoutingIdentifier) -> Option<&Node> {
        self.root.as_ref().and_then(|root| root.find(identifier))
    }

    pub fn contains(&self, identifier: &RoutingIdentifier) -> bool {
        self.routables.contains_key(identifier)
    }

    pub fn parent_of(&self, identifier: &RoutingIdentifier) -> Option<&RoutingIdentifier> {
        self.root
            .as_ref()
            .and_then(|root| root.find_parent(identifier))
            .map(Node::identifier)
    }

    /// Number of registered routables.
    pub fn len(&self) -> usize {
        self.routables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Registered identifiers, sorted.
    pub fn identifiers(&self) -> Vec<RoutingIdentifier> {
        let mut ids: Vec<_> = self.routables.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// The active chain: the root, then the most recently entered child at
    /// each level.
    pub fn active_path(&self) -> Vec<RoutingIdentifier> {
        let mut path = Vec::new();
        let mut current = self.root.as_ref();
        while let Some(node) = current {
            path.push(node.identifier.clone());
            current = node.sub_nodes.last();
        }
        path
    }
}

impl std::fmt::Debug for RoutingTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutingTree")
            .field("root", &self.root)
            .field("routables", &self.identifiers())
            .finish()
    }
}
