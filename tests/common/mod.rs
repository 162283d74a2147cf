//! Shared utilities for integration tests.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use parking_lot::Mutex;

use flow_router::config::NavigationConfig;
use flow_router::flow::{Completion, FlowBlueprint, FlowCatalog, FlowController, Presenter};
use flow_router::navigation::{Navigator, RoutingTable};
use flow_router::routing::{RoutingEntry, RoutingIdentifier, RoutingTree, SharedTree};

/// Something the presenter was asked to do, or finished doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Present(String, bool),
    Presented(String),
    Dismiss(String, bool),
    Dismissed(String),
}

/// Presenter that records every call in order and completes after `delay`.
#[derive(Clone, Default)]
pub struct RecordingPresenter {
    log: Arc<Mutex<Vec<Event>>>,
    delay: Duration,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an animation of `delay` for every transition.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.log.lock().clone()
    }

    pub fn clear(&self) {
        self.log.lock().clear();
    }

    fn settle(&self, started: Event, done: Event, completion: Completion) {
        self.log.lock().push(started);
        if self.delay.is_zero() {
            self.log.lock().push(done);
            completion.complete();
            return;
        }
        let log = self.log.clone();
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            log.lock().push(done);
            completion.complete();
        });
    }
}

impl Presenter for RecordingPresenter {
    fn present(&self, entry: &RoutingEntry, animated: bool, completion: Completion) {
        let flow = entry.identifier.to_string();
        self.settle(Event::Present(flow.clone(), animated), Event::Presented(flow), completion);
    }

    fn dismiss(&self, entry: &RoutingEntry, animated: bool, completion: Completion) {
        let flow = entry.identifier.to_string();
        self.settle(Event::Dismiss(flow.clone(), animated), Event::Dismissed(flow), completion);
    }
}

/// Catalog from `(flow, children)` pairs, every flow shown by `presenter`.
pub fn catalog(presenter: Arc<dyn Presenter>, flows: &[(&str, &[&str])]) -> Arc<FlowCatalog> {
    let catalog = flows.iter().fold(FlowCatalog::new(), |catalog, (flow, children)| {
        catalog.with_flow(FlowBlueprint::new(*flow, presenter.clone()).with_children(children.iter().copied()))
    });
    Arc::new(catalog)
}

/// A started root flow plus a navigator over its tree.
pub struct Harness {
    pub tree: SharedTree,
    pub root: Arc<FlowController>,
    pub navigator: Navigator,
}

impl Harness {
    pub async fn start(root: &str, catalog: Arc<FlowCatalog>, table: RoutingTable) -> Self {
        let tree = RoutingTree::shared();
        let root = FlowController::root(root, None, tree.clone(), catalog).unwrap();
        root.start(None, true).await.unwrap();

        let config = NavigationConfig {
            root: root.identifier().to_string(),
            ..NavigationConfig::default()
        };
        let table = Arc::new(ArcSwap::from_pointee(table));
        let (navigator, _worker) = Navigator::spawn(tree.clone(), table, &config);
        Self { tree, root, navigator }
    }

    pub fn active_path(&self) -> Vec<String> {
        self.tree
            .lock()
            .active_path()
            .iter()
            .map(RoutingIdentifier::to_string)
            .collect()
    }

    /// The flow controller registered under `identifier`.
    #[allow(dead_code)]
    pub fn flow(&self, identifier: &str) -> Option<Arc<dyn flow_router::Routable>> {
        self.tree.lock().get_routable_with(&identifier.into())
    }
}

pub fn ids(raw: &[&str]) -> Vec<RoutingIdentifier> {
    raw.iter().map(|id| RoutingIdentifier::from(*id)).collect()
}
