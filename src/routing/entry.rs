//! Routing entries: the records that identify a node to enter, leave or
//! switch to.
//!
//! # Design Decisions
//! - The routable back-reference is a `Weak`: an entry never keeps a routable
//!   alive. A dead reference makes the entry stale, never invalid.
//! - `ManagedEntries` stores the index of the active entry, so the active
//!   entry is a member of the list by construction.

use std::fmt;
use std::sync::{Arc, Weak};

use crate::flow::Routable;
use crate::routing::identifier::{RoutingContext, RoutingIdentifier};

/// Identifies one node of the navigation hierarchy and its context.
#[derive(Clone)]
pub struct RoutingEntry {
    /// Identifier of the node.
    pub identifier: RoutingIdentifier,

    /// Parameters the node is entered with, if any.
    pub context: Option<RoutingContext>,

    /// Children managed by the node, with the one currently on screen.
    pub managed_entries: Option<ManagedEntries>,

    routable: Option<Weak<dyn Routable>>,
}

impl RoutingEntry {
    pub fn new(identifier: impl Into<RoutingIdentifier>) -> Self {
        Self {
            identifier: identifier.into(),
            context: None,
            managed_entries: None,
            routable: None,
        }
    }

    pub fn with_context(mut self, context: RoutingContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Attach a non-owning reference to the routable occupying the node.
    pub fn with_routable(mut self, routable: &Arc<dyn Routable>) -> Self {
        self.routable = Some(Arc::downgrade(routable));
        self
    }

    pub(crate) fn with_weak_routable(mut self, routable: Weak<dyn Routable>) -> Self {
        self.routable = Some(routable);
        self
    }

    pub fn with_managed_entries(mut self, managed: ManagedEntries) -> Self {
        self.managed_entries = Some(managed);
        self
    }

    /// The routable occupying the node, if it is still alive.
    pub fn routable(&self) -> Option<Arc<dyn Routable>> {
        self.routable.as_ref().and_then(Weak::upgrade)
    }

    /// True when a routable was attached but has since been dropped.
    pub fn is_stale(&self) -> bool {
        self.routable
            .as_ref()
            .is_some_and(|weak| weak.strong_count() == 0)
    }

    /// Identifier and context only, without the routable reference or
    /// managed entries.
    pub fn template(&self) -> Self {
        Self {
            identifier: self.identifier.clone(),
            context: self.context.clone(),
            managed_entries: None,
            routable: None,
        }
    }
}

impl PartialEq for RoutingEntry {
    fn eq(&self, other: &Self) -> bool {
        if self.identifier != other.identifier || self.context != other.context {
            return false;
        }
        match (self.routable(), other.routable()) {
            (Some(lhs), Some(rhs)) => std::ptr::addr_eq(Arc::as_ptr(&lhs), Arc::as_ptr(&rhs)),
            // Without two live references equality is structural.
            _ => true,
        }
    }
}

impl fmt::Debug for RoutingEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let routable = match &self.routable {
            None => "none",
            Some(weak) if weak.strong_count() == 0 => "stale",
            Some(_) => "live",
        };
        f.debug_struct("RoutingEntry")
            .field("identifier", &self.identifier)
            .field("context", &self.context)
            .field("routable", &routable)
            .field("managed_entries", &self.managed_entries)
            .finish()
    }
}

impl From<RoutingIdentifier> for RoutingEntry {
    fn from(identifier: RoutingIdentifier) -> Self {
        Self::new(identifier)
    }
}

impl From<&str> for RoutingEntry {
    fn from(identifier: &str) -> Self {
        Self::new(identifier)
    }
}

/// Entries managed by a node, plus the one that is currently active.
#[derive(Debug, Clone, PartialEq)]
pub struct ManagedEntries {
    entries: Vec<RoutingEntry>,
    active: usize,
}

impl ManagedEntries {
    /// Returns `None` when `active_entry` is not one of `entries`.
    pub fn new(entries: Vec<RoutingEntry>, active_entry: &RoutingEntry) -> Option<Self> {
        let active = entries.iter().position(|entry| entry == active_entry)?;
        Some(Self { entries, active })
    }

    pub fn single(entry: RoutingEntry) -> Self {
        Self {
            entries: vec![entry],
            active: 0,
        }
    }

    pub fn entries(&self) -> &[RoutingEntry] {
        &self.entries
    }

    pub fn active_entry(&self) -> &RoutingEntry {
        &self.entries[self.active]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Make `entry` the active one, appending it when it is not managed yet.
    /// An existing entry with the same identifier is replaced.
    pub fn activate(&mut self, entry: RoutingEntry) {
        match self
            .entries
            .iter()
            .position(|existing| existing.identifier == entry.identifier)
        {
            Some(index) => {
                self.entries[index] = entry;
                self.active = index;
            }
            None => {
                self.entries.push(entry);
                self.active = self.entries.len() - 1;
            }
        }
    }

    /// Drop the entry with `identifier`. If it was active, the most recently
    /// added remaining entry becomes active. `None` when nothing remains.
    pub fn without(mut self, identifier: &RoutingIdentifier) -> Option<Self> {
        let active_id = self.active_entry().identifier.clone();
        self.entries.retain(|entry| &entry.identifier != identifier);
        self.reselect(&active_id)
    }

    /// Drop stale entries. `None` when nothing remains.
    pub fn pruned(mut self) -> Option<Self> {
        let active_id = self.active_entry().identifier.clone();
        self.entries.retain(|entry| !entry.is_stale());
        self.reselect(&active_id)
    }

    fn reselect(mut self, previous_active: &RoutingIdentifier) -> Option<Self> {
        if self.entries.is_empty() {
            return None;
        }
        self.active = self
            .entries
            .iter()
            .position(|entry| &entry.identifier == previous_active)
            .unwrap_or(self.entries.len() - 1);
        Some(self)
    }
}
