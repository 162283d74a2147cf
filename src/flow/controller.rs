//! Flow controllers: routables that own child flows and drive a presenter.
//!
//! # States
//! ```text
//! NotStarted → Active: start() registered the node and presentation settled
//! Active → Leaving: leave() requested the dismissal
//! Leaving → Detached: dismissal settled, node removed, parent detached
//! Leaving → Active: dismissal abandoned by the presenter
//! ```
//! Entering a child is a nested sub-state tracked by a counter; it never
//! changes the controller's own state.
//!
//! # Design Decisions
//! - A child controller is owned by its parent (strong), the parent is
//!   referenced weakly, and the tree registry holds one more strong handle
//! - Controllers reference the tree weakly; the registry already owns them
//! - Locks are only taken inside synchronous helpers, never across `.await`

use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::config::FlowConfig;
use crate::error::{NavigationError, NavigationResult};
use crate::flow::presenter::{Completion, Presenter};
use crate::flow::routable::Routable;
use crate::observability::metrics;
use crate::routing::{ManagedEntries, RoutingContext, RoutingEntry, RoutingIdentifier, RoutingTree, SharedTree};

/// Lifecycle state of a flow controller.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    NotStarted = 0,
    Active = 1,
    Leaving = 2,
    Detached = 3,
}

impl From<u8> for FlowState {
    fn from(val: u8) -> Self {
        match val {
            1 => FlowState::Active,
            2 => FlowState::Leaving,
            3 => FlowState::Detached,
            _ => FlowState::NotStarted,
        }
    }
}

/// Describes one kind of flow: how it is shown and which children it can
/// enter.
#[derive(Clone)]
pub struct FlowBlueprint {
    identifier: RoutingIdentifier,
    presenter: Arc<dyn Presenter>,
    children: Vec<RoutingIdentifier>,
}

impl FlowBlueprint {
    pub fn new(identifier: impl Into<RoutingIdentifier>, presenter: Arc<dyn Presenter>) -> Self {
        Self {
            identifier: identifier.into(),
            presenter,
            children: Vec::new(),
        }
    }

    /// Identifiers this flow knows how to enter.
    pub fn with_children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<RoutingIdentifier>,
    {
        self.children = children.into_iter().map(Into::into).collect();
        self
    }

    pub fn identifier(&self) -> &RoutingIdentifier {
        &self.identifier
    }

    pub fn children(&self) -> &[RoutingIdentifier] {
        &self.children
    }

    pub fn handles(&self, identifier: &RoutingIdentifier) -> bool {
        self.children.contains(identifier)
    }
}

impl std::fmt::Debug for FlowBlueprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowBlueprint")
            .field("identifier", &self.identifier)
            .field("children", &self.children)
            .finish()
    }
}

/// All flow kinds of one application, keyed by identifier.
#[derive(Debug, Clone, Default)]
pub struct FlowCatalog {
    blueprints: HashMap<RoutingIdentifier, FlowBlueprint>,
}

impl FlowCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from config, showing every flow through `presenter`.
    pub fn from_config(flows: &[FlowConfig], presenter: Arc<dyn Presenter>) -> Self {
        flows.iter().fold(Self::new(), |catalog, flow| {
            catalog.with_flow(
                FlowBlueprint::new(flow.identifier.as_str(), presenter.clone())
                    .with_children(flow.children.iter().map(String::as_str)),
            )
        })
    }

    pub fn with_flow(mut self, blueprint: FlowBlueprint) -> Self {
        self.insert(blueprint);
        self
    }

    /// Insert a blueprint, replacing any previous one for the identifier.
    pub fn insert(&mut self, blueprint: FlowBlueprint) {
        self.blueprints.insert(blueprint.identifier.clone(), blueprint);
    }

    pub fn blueprint(&self, identifier: &RoutingIdentifier) -> Option<&FlowBlueprint> {
        self.blueprints.get(identifier)
    }

    pub fn contains(&self, identifier: &RoutingIdentifier) -> bool {
        self.blueprints.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.blueprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blueprints.is_empty()
    }
}

/// A routable that owns child flow controllers and drives a presenter.
pub struct FlowController {
    blueprint: FlowBlueprint,
    context: Option<RoutingContext>,
    tree: Weak<Mutex<RoutingTree>>,
    catalog: Arc<FlowCatalog>,
    me: Weak<FlowController>,
    parent: Mutex<Option<Weak<FlowController>>>,
    sub_flow_controllers: Mutex<Vec<Arc<FlowController>>>,
    managed: Mutex<Option<ManagedEntries>>,
    state: AtomicU8,
    entering: AtomicUsize,
    last_info: Mutex<Option<String>>,
}

impl FlowController {
    fn new(
        blueprint: &FlowBlueprint,
        context: Option<RoutingContext>,
        tree: Weak<Mutex<RoutingTree>>,
        catalog: Arc<FlowCatalog>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            blueprint: blueprint.clone(),
            context,
            tree,
            catalog,
            me: me.clone(),
            parent: Mutex::new(None),
            sub_flow_controllers: Mutex::new(Vec::new()),
            managed: Mutex::new(None),
            state: AtomicU8::new(FlowState::NotStarted as u8),
            entering: AtomicUsize::new(0),
            last_info: Mutex::new(None),
        })
    }

    /// Controller for the top of the hierarchy. `None` when `catalog` has no
    /// blueprint for `identifier`. Call [`FlowController::start`] with no
    /// parent to register and present it.
    ///
    /// Only a weak handle on `tree` is kept: the caller owns the tree.
    pub fn root(
        identifier: impl Into<RoutingIdentifier>,
        context: Option<RoutingContext>,
        tree: SharedTree,
        catalog: Arc<FlowCatalog>,
    ) -> Option<Arc<Self>> {
        let identifier = identifier.into();
        let blueprint = catalog.blueprint(&identifier)?.clone();
        Some(Self::new(&blueprint, context, Arc::downgrade(&tree), catalog))
    }

    pub fn identifier(&self) -> &RoutingIdentifier {
        &self.blueprint.identifier
    }

    pub fn context(&self) -> Option<&RoutingContext> {
        self.context.as_ref()
    }

    pub fn state(&self) -> FlowState {
        FlowState::from(self.state.load(Ordering::Acquire))
    }

    /// True while a child of this controller is being presented.
    pub fn is_entering_child(&self) -> bool {
        self.entering.load(Ordering::Acquire) > 0
    }

    pub fn parent(&self) -> Option<Arc<FlowController>> {
        self.parent.lock().as_ref().and_then(Weak::upgrade)
    }

    pub fn sub_flow_controllers(&self) -> Vec<Arc<FlowController>> {
        self.sub_flow_controllers.lock().clone()
    }

    /// Children entered through this controller; stale entries are dropped on
    /// every read.
    pub fn managed_entries(&self) -> Option<ManagedEntries> {
        let mut managed = self.managed.lock();
        *managed = managed.take().and_then(ManagedEntries::pruned);
        managed.clone()
    }

    /// Last text payload delivered through `did_enter_with_info`.
    pub fn last_info(&self) -> Option<String> {
        self.last_info.lock().clone()
    }

    /// Register this controller's node under `parent` (or as the root) and
    /// present it. Resolves once the presentation settled.
    pub async fn start(&self, parent: Option<&FlowController>, animated: bool) -> NavigationResult<()> {
        if self.state() != FlowState::NotStarted {
            tracing::debug!(flow = %self.identifier(), state = ?self.state(), "Start ignored");
            return Ok(());
        }
        self.register(parent.map(FlowController::identifier))?;

        let entry = self.entry();
        let (completion, signal) = Completion::pair();
        self.blueprint.presenter.present(&entry, animated, completion);

        if !signal.settled().await {
            tracing::warn!(flow = %self.identifier(), "Presentation abandoned, rolling back registration");
            self.unregister();
            return Err(NavigationError::PresentationAbandoned(self.identifier().clone()));
        }

        self.state.store(FlowState::Active as u8, Ordering::Release);
        metrics::record_transition("enter", self.identifier());
        tracing::info!(flow = %self.identifier(), animated, "Flow entered");
        Ok(())
    }

    /// Take ownership of `child`.
    pub fn add(&self, child: &Arc<FlowController>) {
        *child.parent.lock() = Some(self.me.clone());
        self.sub_flow_controllers.lock().push(child.clone());
    }

    /// Detach from the owning controller. Calling it again is a no-op.
    pub fn remove_from_super_flow_controller(&self) {
        let parent = self.parent.lock().take().and_then(|weak| weak.upgrade());
        if let Some(parent) = parent {
            parent.remove_sub_flow_controller(self.identifier());
        }
    }

    fn remove_sub_flow_controller(&self, identifier: &RoutingIdentifier) {
        self.sub_flow_controllers
            .lock()
            .retain(|child| child.identifier() != identifier);
        let mut managed = self.managed.lock();
        *managed = managed
            .take()
            .and_then(|m| m.without(identifier))
            .and_then(ManagedEntries::pruned);
    }

    fn record_active_child(&self, entry: RoutingEntry) {
        let mut managed = self.managed.lock();
        let mut current = managed.take().unwrap_or_else(|| ManagedEntries::single(entry.clone()));
        current.activate(entry);
        *managed = current.pruned();
    }

    /// No-op once the tree is gone.
    fn register(&self, parent: Option<&RoutingIdentifier>) -> NavigationResult<()> {
        let (Some(me), Some(tree)) = (self.me.upgrade(), self.tree.upgrade()) else {
            tracing::debug!(flow = %self.identifier(), "Registration skipped: tree dropped");
            return Ok(());
        };
        let routable: Arc<dyn Routable> = me;
        tree.lock().add_routable(routable, parent)?;
        Ok(())
    }

    fn unregister(&self) {
        if let Some(tree) = self.tree.upgrade() {
            tree.lock().remove_identifier(self.identifier());
        }
    }
}

#[async_trait]
impl Routable for FlowController {
    fn identifier(&self) -> &RoutingIdentifier {
        &self.blueprint.identifier
    }

    fn entry(&self) -> RoutingEntry {
        let weak: Weak<dyn Routable> = self.me.clone();
        let mut entry = RoutingEntry::new(self.identifier().clone()).with_weak_routable(weak);
        entry.context = self.context.clone();
        entry.managed_entries = self.managed_entries();
        entry
    }

    async fn enter(
        &self,
        entry: &RoutingEntry,
        animated: bool,
    ) -> NavigationResult<Option<Arc<dyn Routable>>> {
        if self.state() != FlowState::Active {
            tracing::debug!(flow = %self.identifier(), destination = %entry.identifier, "Enter ignored: flow not active");
            return Ok(None);
        }
        if !self.blueprint.handles(&entry.identifier) {
            tracing::debug!(flow = %self.identifier(), destination = %entry.identifier, "No case for identifier");
            return Ok(None);
        }
        let Some(blueprint) = self.catalog.blueprint(&entry.identifier) else {
            tracing::debug!(destination = %entry.identifier, "No blueprint for identifier");
            return Ok(None);
        };

        let child = FlowController::new(
            blueprint,
            entry.context.clone(),
            self.tree.clone(),
            self.catalog.clone(),
        );
        self.add(&child);

        self.entering.fetch_add(1, Ordering::AcqRel);
        let started = child.start(Some(self), animated).await;
        self.entering.fetch_sub(1, Ordering::AcqRel);

        if let Err(err) = started {
            child.remove_from_super_flow_controller();
            return Err(err);
        }

        self.record_active_child(child.entry());
        let child: Arc<dyn Routable> = child;
        Ok(Some(child))
    }

    async fn leave(&self, entry: &RoutingEntry, animated: bool) -> NavigationResult<()> {
        if self
            .state
            .compare_exchange(
                FlowState::Active as u8,
                FlowState::Leaving as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            tracing::debug!(flow = %self.identifier(), state = ?self.state(), "Leave ignored: flow not active");
            return Ok(());
        }

        let (completion, signal) = Completion::pair();
        self.blueprint.presenter.dismiss(entry, animated, completion);

        if !signal.settled().await {
            tracing::warn!(flow = %self.identifier(), "Dismissal abandoned");
            self.state.store(FlowState::Active as u8, Ordering::Release);
            return Err(NavigationError::DismissalAbandoned(self.identifier().clone()));
        }

        self.unregister();
        self.remove_from_super_flow_controller();
        self.state.store(FlowState::Detached as u8, Ordering::Release);
        metrics::record_transition("leave", self.identifier());
        tracing::info!(flow = %self.identifier(), animated, "Flow left");
        Ok(())
    }

    fn did_enter_with_info(&self, info: Option<&(dyn Any + Send + Sync)>) {
        let Some(info) = info else {
            return;
        };
        let text = info
            .downcast_ref::<String>()
            .cloned()
            .or_else(|| info.downcast_ref::<&'static str>().map(|s| s.to_string()));

        match text {
            Some(text) => {
                tracing::info!(flow = %self.identifier(), info = %text, "Flow received info");
                *self.last_info.lock() = Some(text);
            }
            None => tracing::debug!(flow = %self.identifier(), "Ignoring unsupported info payload"),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl std::fmt::Debug for FlowController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowController")
            .field("identifier", self.identifier())
            .field("context", &self.context)
            .field("state", &self.state())
            .field("sub_flow_controllers", &self.sub_flow_controllers.lock().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::error::TreeError;
    use crate::flow::presenter::ImmediatePresenter;
    use crate::routing::RoutingTree;

    /// Drops every completion handle it is given.
    struct AbandoningPresenter;

    impl Presenter for AbandoningPresenter {
        fn present(&self, _entry: &RoutingEntry, _animated: bool, _completion: Completion) {}
        fn dismiss(&self, _entry: &RoutingEntry, _animated: bool, _completion: Completion) {}
    }

    /// Completes every transition after a fixed delay.
    struct SlowPresenter(Duration);

    impl SlowPresenter {
        fn settle(&self, completion: Completion) {
            let delay = self.0;
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                completion.complete();
            });
        }
    }

    impl Presenter for SlowPresenter {
        fn present(&self, _entry: &RoutingEntry, _animated: bool, completion: Completion) {
            self.settle(completion);
        }
        fn dismiss(&self, _entry: &RoutingEntry, _animated: bool, completion: Completion) {
            self.settle(completion);
        }
    }

    fn catalog() -> Arc<FlowCatalog> {
        let presenter: Arc<dyn Presenter> = Arc::new(ImmediatePresenter);
        Arc::new(
            FlowCatalog::new()
                .with_flow(FlowBlueprint::new("root", presenter.clone()).with_children(["a", "b", "ghost"]))
                .with_flow(FlowBlueprint::new("a", presenter.clone()).with_children(["b"]))
                .with_flow(FlowBlueprint::new("b", presenter.clone()))
                .with_flow(FlowBlueprint::new("stuck", Arc::new(AbandoningPresenter))),
        )
    }

    async fn started_root() -> (SharedTree, Arc<FlowController>) {
        let tree = RoutingTree::shared();
        let root = FlowController::root("root", None, tree.clone(), catalog()).unwrap();
        root.start(None, false).await.unwrap();
        (tree, root)
    }

    #[tokio::test]
    async fn test_root_start_registers_and_activates() {
        let (tree, root) = started_root().await;
        assert_eq!(root.state(), FlowState::Active);
        assert_eq!(tree.lock().active_path(), vec![RoutingIdentifier::from("root")]);
        assert!(tree.lock().get_routable_with(&"root".into()).is_some());
    }

    #[tokio::test]
    async fn test_second_root_is_fatal() {
        let (tree, _root) = started_root().await;
        let other = FlowController::root("a", None, tree.clone(), catalog()).unwrap();
        let err = other.start(None, false).await.unwrap_err();
        assert!(matches!(err, NavigationError::Tree(TreeError::MissingParent(_))));
        assert_eq!(other.state(), FlowState::NotStarted);
    }

    #[tokio::test]
    async fn test_enter_child_updates_tree_and_managed_entries() {
        let (tree, root) = started_root().await;
        let context = RoutingContext::new().with("user", "ada");
        let child = root
            .enter(&RoutingEntry::new("a").with_context(context.clone()), true)
            .await
            .unwrap()
            .expect("root has a case for 'a'");

        assert_eq!(child.identifier().as_str(), "a");
        assert_eq!(child.entry().context, Some(context));
        assert_eq!(tree.lock().parent_of(&"a".into()), Some(&"root".into()));
        assert!(!root.is_entering_child());

        let managed = root.managed_entries().unwrap();
        assert_eq!(managed.active_entry().identifier.as_str(), "a");
        assert_eq!(root.sub_flow_controllers().len(), 1);

        let controller = child.as_any().downcast_ref::<FlowController>().unwrap();
        assert_eq!(controller.parent().unwrap().identifier().as_str(), "root");
    }

    #[tokio::test]
    async fn test_enter_unknown_identifier_is_noop() {
        let (tree, root) = started_root().await;
        // Not one of root's cases.
        assert!(root.enter(&RoutingEntry::new("zzz"), true).await.unwrap().is_none());
        // A case, but no blueprint in the catalog.
        assert!(root.enter(&RoutingEntry::new("ghost"), true).await.unwrap().is_none());
        assert_eq!(tree.lock().len(), 1);
        assert!(root.sub_flow_controllers().is_empty());
        assert!(root.managed_entries().is_none());
    }

    #[tokio::test]
    async fn test_leave_removes_node_and_detaches() {
        let (tree, root) = started_root().await;
        let child = root.enter(&RoutingEntry::new("a"), false).await.unwrap().unwrap();

        child.leave(&child.entry(), false).await.unwrap();

        let controller = child.as_any().downcast_ref::<FlowController>().unwrap();
        assert_eq!(controller.state(), FlowState::Detached);
        assert!(controller.parent().is_none());
        assert!(!tree.lock().contains(&"a".into()));
        assert!(root.sub_flow_controllers().is_empty());
        assert!(root.managed_entries().is_none());
    }

    #[tokio::test]
    async fn test_leave_twice_is_noop() {
        let (_tree, root) = started_root().await;
        let child = root.enter(&RoutingEntry::new("b"), false).await.unwrap().unwrap();
        child.leave(&child.entry(), false).await.unwrap();
        child.leave(&child.entry(), false).await.unwrap();
    }

    #[tokio::test]
    async fn test_remove_from_super_flow_controller_is_idempotent() {
        let (_tree, root) = started_root().await;
        let child = root.enter(&RoutingEntry::new("a"), false).await.unwrap().unwrap();
        let controller = child.as_any().downcast_ref::<FlowController>().unwrap();

        controller.remove_from_super_flow_controller();
        controller.remove_from_super_flow_controller();
        assert!(root.sub_flow_controllers().is_empty());
    }

    #[tokio::test]
    async fn test_abandoned_presentation_rolls_back() {
        let tree = RoutingTree::shared();
        let stuck = FlowController::root("stuck", None, tree.clone(), catalog()).unwrap();
        let err = stuck.start(None, true).await.unwrap_err();
        assert!(matches!(err, NavigationError::PresentationAbandoned(_)));
        assert!(tree.lock().is_empty());
        assert_eq!(stuck.state(), FlowState::NotStarted);
    }

    #[tokio::test]
    async fn test_did_enter_with_info_ignores_mismatched_payload() {
        let (_tree, root) = started_root().await;
        root.did_enter_with_info(None);
        root.did_enter_with_info(Some(&42u32));
        assert!(root.last_info().is_none());

        root.did_enter_with_info(Some(&String::from("hello")));
        assert_eq!(root.last_info().as_deref(), Some("hello"));
        root.did_enter_with_info(Some(&"static"));
        assert_eq!(root.last_info().as_deref(), Some("static"));
    }

    #[tokio::test]
    async fn test_controllers_do_not_keep_tree_alive() {
        let (tree, root) = started_root().await;
        let child = root.enter(&RoutingEntry::new("a"), false).await.unwrap().unwrap();
        let weak_tree = Arc::downgrade(&tree);
        let weak_child = Arc::downgrade(&child);
        drop(child);

        drop(tree);
        assert!(weak_tree.upgrade().is_none());
        // Root still owns `a` as a sub flow controller.
        assert!(weak_child.upgrade().is_some());

        drop(root);
        assert!(weak_child.upgrade().is_none());
    }

    #[tokio::test]
    async fn test_is_entering_child_during_presentation() {
        let tree = RoutingTree::shared();
        let presenter: Arc<dyn Presenter> = Arc::new(SlowPresenter(Duration::from_millis(50)));
        let catalog = Arc::new(
            FlowCatalog::new()
                .with_flow(FlowBlueprint::new("root", Arc::new(ImmediatePresenter)).with_children(["a"]))
                .with_flow(FlowBlueprint::new("a", presenter)),
        );
        let root = FlowController::root("root", None, tree.clone(), catalog).unwrap();
        root.start(None, false).await.unwrap();

        let entering = {
            let root = root.clone();
            tokio::spawn(async move { root.enter(&RoutingEntry::new("a"), true).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(root.is_entering_child());
        assert_eq!(root.state(), FlowState::Active);

        let child = entering.await.unwrap().unwrap();
        assert!(child.is_some());
        assert!(!root.is_entering_child());
    }

    #[test]
    fn test_catalog_from_config() {
        let flows = vec![FlowConfig {
            identifier: "root".into(),
            children: vec!["a".into()],
        }];
        let catalog = FlowCatalog::from_config(&flows, Arc::new(ImmediatePresenter));
        let blueprint = catalog.blueprint(&"root".into()).unwrap();
        assert!(blueprint.handles(&"a".into()));
        assert!(!blueprint.handles(&"b".into()));
    }
}
