//! Routing strategies: turn the active chain and a destination path into an
//! ordered plan of leave and enter steps.
//!
//! # Design Decisions
//! - Plans are pure data; executing them is the navigator's job
//! - Leaves are innermost first, enters outermost first, never interleaved
//! - A destination starting with the root identifier is compared from the
//!   root; any other destination is taken as relative to the root
//! - The root is never left by a plan

use crate::navigation::path::Path;
use crate::routing::{RoutingEntry, RoutingIdentifier};

/// Ordered steps for one navigation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    /// Entries to leave, innermost first.
    pub leave: Vec<RoutingEntry>,

    /// Node the first enter step is issued on. `None` when the tree is empty.
    pub anchor: Option<RoutingIdentifier>,

    /// Entries to enter, outermost first.
    pub enter: Vec<RoutingEntry>,
}

impl Plan {
    /// Enter `entry` directly below `anchor`, leaving nothing.
    pub fn direct(anchor: Option<RoutingIdentifier>, entry: RoutingEntry) -> Self {
        Self {
            leave: Vec::new(),
            anchor,
            enter: vec![entry],
        }
    }

    pub fn is_noop(&self) -> bool {
        self.leave.is_empty() && self.enter.is_empty()
    }
}

/// Diffs the active chain against a destination.
pub trait RoutingStrategy: Send + Sync + std::fmt::Debug {
    /// `active` is the tree's active chain, root first.
    fn plan(&self, active: &[RoutingEntry], destination: &Path) -> Plan;
}

/// Splits the active chain at the root and strips a leading root segment
/// from the destination. `None` when there is no active chain.
fn anchored<'a>(
    active: &'a [RoutingEntry],
    destination: &'a Path,
) -> Option<(&'a RoutingEntry, &'a [RoutingEntry], &'a [RoutingEntry])> {
    let (root, below) = active.split_first()?;
    let segments = destination.segments();
    let target = match segments.first() {
        Some(first) if first.identifier == root.identifier => &segments[1..],
        _ => segments,
    };
    Some((root, below, target))
}

fn unanchored(destination: &Path) -> Plan {
    Plan {
        leave: Vec::new(),
        anchor: None,
        enter: destination.segments().to_vec(),
    }
}

/// Minimal diff: keep the longest shared prefix, leave the rest of the active
/// chain, enter the rest of the destination.
///
/// Segments are shared when their entries are equal (identifier and context).
/// A destination unrelated to the active chain vacates everything below the
/// root.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommonAncestor;

impl RoutingStrategy for CommonAncestor {
    fn plan(&self, active: &[RoutingEntry], destination: &Path) -> Plan {
        let Some((root, below, target)) = anchored(active, destination) else {
            return unanchored(destination);
        };

        let shared = below
            .iter()
            .zip(target)
            .take_while(|(current, wanted)| current == wanted)
            .count();

        let anchor = match shared {
            0 => root.identifier.clone(),
            n => below[n - 1].identifier.clone(),
        };

        Plan {
            leave: below[shared..].iter().rev().cloned().collect(),
            anchor: Some(anchor),
            enter: target[shared..].to_vec(),
        }
    }
}

/// Leave everything below the root, then enter the whole destination, even
/// where it matches the active chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rebuild;

impl RoutingStrategy for Rebuild {
    fn plan(&self, active: &[RoutingEntry], destination: &Path) -> Plan {
        let Some((root, below, target)) = anchored(active, destination) else {
            return unanchored(destination);
        };

        Plan {
            leave: below.iter().rev().cloned().collect(),
            anchor: Some(root.identifier.clone()),
            enter: target.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::RoutingContext;

    fn chain(ids: &[&str]) -> Vec<RoutingEntry> {
        ids.iter().map(|id| RoutingEntry::new(*id)).collect()
    }

    fn ids(entries: &[RoutingEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.identifier.as_str()).collect()
    }

    #[test]
    fn test_common_ancestor_from_root() {
        let plan = CommonAncestor.plan(&chain(&["A", "B", "C"]), &["A", "D"].into_iter().collect());
        assert_eq!(ids(&plan.leave), vec!["C", "B"]);
        assert_eq!(plan.anchor, Some("A".into()));
        assert_eq!(ids(&plan.enter), vec!["D"]);
    }

    #[test]
    fn test_common_ancestor_relative_to_root() {
        let plan = CommonAncestor.plan(&chain(&["root"]), &["a"].into_iter().collect());
        assert!(plan.leave.is_empty());
        assert_eq!(plan.anchor, Some("root".into()));
        assert_eq!(ids(&plan.enter), vec!["a"]);
    }

    #[test]
    fn test_common_ancestor_keeps_shared_prefix() {
        let plan = CommonAncestor.plan(
            &chain(&["root", "a", "b"]),
            &["a", "c", "d"].into_iter().collect(),
        );
        assert_eq!(ids(&plan.leave), vec!["b"]);
        assert_eq!(plan.anchor, Some("a".into()));
        assert_eq!(ids(&plan.enter), vec!["c", "d"]);
    }

    #[test]
    fn test_common_ancestor_unrelated_path_vacates_below_root() {
        let plan = CommonAncestor.plan(&chain(&["root", "x", "y"]), &["p", "q"].into_iter().collect());
        assert_eq!(ids(&plan.leave), vec!["y", "x"]);
        assert_eq!(plan.anchor, Some("root".into()));
        assert_eq!(ids(&plan.enter), vec!["p", "q"]);
    }

    #[test]
    fn test_common_ancestor_same_destination_is_noop() {
        let plan = CommonAncestor.plan(&chain(&["root", "a"]), &["root", "a"].into_iter().collect());
        assert!(plan.is_noop());
        assert_eq!(plan.anchor, Some("a".into()));
    }

    #[test]
    fn test_common_ancestor_context_change_reenters() {
        let active = vec![
            RoutingEntry::new("root"),
            RoutingEntry::new("a").with_context(RoutingContext::new().with("id", 1)),
        ];
        let destination = Path::new().then(RoutingEntry::new("a").with_context(RoutingContext::new().with("id", 2)));
        let plan = CommonAncestor.plan(&active, &destination);
        assert_eq!(ids(&plan.leave), vec!["a"]);
        assert_eq!(ids(&plan.enter), vec!["a"]);
        assert_eq!(plan.anchor, Some("root".into()));
    }

    #[test]
    fn test_rebuild_leaves_everything_below_root() {
        let plan = Rebuild.plan(&chain(&["root", "a", "b"]), &["a", "b"].into_iter().collect());
        assert_eq!(ids(&plan.leave), vec!["b", "a"]);
        assert_eq!(plan.anchor, Some("root".into()));
        assert_eq!(ids(&plan.enter), vec!["a", "b"]);
    }

    #[test]
    fn test_empty_tree_has_no_anchor() {
        let plan = CommonAncestor.plan(&[], &["a"].into_iter().collect());
        assert_eq!(plan.anchor, None);
        assert_eq!(ids(&plan.enter), vec!["a"]);
        assert_eq!(Rebuild.plan(&[], &Path::new()), Plan::default());
    }
}
