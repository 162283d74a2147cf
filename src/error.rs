//! Error types shared across the navigation subsystems.
//!
//! # Taxonomy
//! - `TreeError`: structural violations of the routing tree. These are
//!   programmer errors; nothing in this crate retries or recovers from them.
//! - `TableError`: a routing table key or path could not be resolved.
//! - `NavigationError`: everything a navigation request can fail with.
//!
//! Unresolvable routes (a routable with no case for an identifier) and
//! malformed payloads are not errors; they are absorbed where they occur.

use thiserror::Error;

use crate::routing::RoutingIdentifier;

/// Structural violations of the routing tree.
///
/// Callers must never attempt to recover from these: they mean the calling
/// code broke the tree's invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// A routable with the same identifier is already registered.
    #[error("a routable with identifier '{0}' is already registered")]
    DuplicateIdentifier(RoutingIdentifier),

    /// The declared parent has no node in the tree.
    #[error("no node found for parent '{parent}' while inserting '{child}'")]
    ParentNotFound {
        parent: RoutingIdentifier,
        child: RoutingIdentifier,
    },

    /// No parent was given while the tree already has a root.
    #[error("cannot insert '{0}' without a parent: the tree already has a root")]
    MissingParent(RoutingIdentifier),
}

/// Errors raised while resolving routing table keys.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// No entry is registered under the key.
    #[error("routing table has no entry for key '{0}'")]
    UnknownKey(String),

    /// A dynamic entry exists but its resolver produced nothing.
    #[error("dynamic entry '{0}' did not resolve to a destination")]
    Unresolved(String),

    /// The key is declared twice.
    #[error("duplicate routing table key '{0}'")]
    DuplicateKey(String),

    /// No named path is registered under the name.
    #[error("routing table has no path named '{0}'")]
    UnknownPath(String),
}

/// Errors a navigation request can end with.
#[derive(Debug, Error)]
pub enum NavigationError {
    /// Fatal structural violation raised by the routing tree.
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// Destination lookup failed.
    #[error(transparent)]
    Table(#[from] TableError),

    /// The presenter dropped its completion handle without completing.
    #[error("presentation of '{0}' was abandoned before it completed")]
    PresentationAbandoned(RoutingIdentifier),

    /// The presenter dropped its dismissal handle without completing.
    #[error("dismissal of '{0}' was abandoned before it completed")]
    DismissalAbandoned(RoutingIdentifier),

    /// An earlier request hit a fatal tree violation; the navigator no longer
    /// accepts work.
    #[error("navigator halted after a fatal tree violation: {0}")]
    Halted(TreeError),

    /// The navigator worker is gone.
    #[error("navigator is closed")]
    Closed,
}

/// Result type for navigation operations.
pub type NavigationResult<T> = Result<T, NavigationError>;
