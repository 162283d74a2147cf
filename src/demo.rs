//! Headless demo application: a `root` flow and flows `a`, `b`, `c` that can
//! enter each other, shown through a console presenter that simulates
//! animation time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::config::{NavigatorConfig, PresentationConfig};
use crate::error::{NavigationError, NavigationResult, TableError};
use crate::flow::{Completion, FlowCatalog, FlowController, Presenter};
use crate::navigation::{NavigationOutcome, Navigator, RoutingTable, SharedTable};
use crate::routing::{RoutingContext, RoutingEntry, RoutingIdentifier, RoutingTree, SharedTree};

/// Table key of the dynamic demo entry.
pub const VISIT_KEY: &str = "visit";

/// Errors raised while starting the demo.
#[derive(Debug, Error)]
pub enum DemoError {
    #[error("root flow '{0}' has no blueprint")]
    UnknownRoot(String),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Navigation(#[from] NavigationError),
}

/// Logs every transition and completes after the configured animation time.
#[derive(Debug, Clone)]
pub struct ConsolePresenter {
    animation: Duration,
    jitter_ms: u64,
}

impl ConsolePresenter {
    pub fn new(config: &PresentationConfig) -> Self {
        Self {
            animation: Duration::from_millis(config.animation_ms),
            jitter_ms: config.jitter_ms,
        }
    }

    fn delay(&self, animated: bool) -> Duration {
        if !animated {
            return Duration::ZERO;
        }
        self.animation + Duration::from_millis(fastrand::u64(0..=self.jitter_ms))
    }

    fn settle(&self, action: &'static str, entry: &RoutingEntry, animated: bool, completion: Completion) {
        let delay = self.delay(animated);
        let flow = entry.identifier.clone();
        tracing::info!(flow = %flow, action, delay_ms = delay.as_millis() as u64, "Screen transition started");

        if delay.is_zero() {
            completion.complete();
            return;
        }
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tracing::debug!(flow = %flow, action, "Screen transition settled");
            completion.complete();
        });
    }
}

impl Presenter for ConsolePresenter {
    fn present(&self, entry: &RoutingEntry, animated: bool, completion: Completion) {
        self.settle("present", entry, animated, completion);
    }

    fn dismiss(&self, entry: &RoutingEntry, animated: bool, completion: Completion) {
        self.settle("dismiss", entry, animated, completion);
    }
}

/// Routing table from config plus the dynamic [`VISIT_KEY`] entry, which
/// enters flow `c` with the number of times it was resolved.
pub fn demo_table(config: &NavigatorConfig, visits: Arc<AtomicU64>) -> Result<RoutingTable, TableError> {
    let mut table = RoutingTable::from_config(&config.table)?;
    table.insert_dynamic(VISIT_KEY, move || {
        let visit = visits.fetch_add(1, Ordering::SeqCst) + 1;
        Some(RoutingEntry::new("c").with_context(RoutingContext::new().with("visit", visit)))
    });
    Ok(table)
}

/// A started demo application.
pub struct DemoApp {
    pub navigator: Navigator,
    pub root: Arc<FlowController>,
    visits: Arc<AtomicU64>,
    worker: JoinHandle<()>,
}

impl DemoApp {
    /// Build the catalog and table, start the root flow and spawn the
    /// navigator.
    pub async fn start(config: &NavigatorConfig, presenter: Arc<dyn Presenter>) -> Result<Self, DemoError> {
        let catalog = Arc::new(FlowCatalog::from_config(&config.flows, presenter));
        let tree: SharedTree = RoutingTree::shared();

        let root = FlowController::root(config.navigation.root.as_str(), None, tree.clone(), catalog)
            .ok_or_else(|| DemoError::UnknownRoot(config.navigation.root.clone()))?;
        root.start(None, config.navigation.animated).await?;

        let visits = Arc::new(AtomicU64::new(0));
        let table: SharedTable = Arc::new(ArcSwap::from_pointee(demo_table(config, visits.clone())?));
        let (navigator, worker) = Navigator::spawn(tree, table, &config.navigation);

        tracing::info!(root = %root.identifier(), flows = config.flows.len(), "Demo application started");
        Ok(Self {
            navigator,
            root,
            visits,
            worker,
        })
    }

    /// Route to a named path, or to a single table key.
    pub async fn run_route(&self, route: &str) -> NavigationResult<NavigationOutcome> {
        if self.navigator.table().load().contains_path(route) {
            self.navigator.route_to_named(route).await
        } else {
            self.navigator.route_to_keys([route]).await
        }
    }

    pub fn active_path(&self) -> Vec<RoutingIdentifier> {
        self.navigator.tree().lock().active_path()
    }

    /// How often the dynamic entry was resolved.
    pub fn visits(&self) -> u64 {
        self.visits.load(Ordering::SeqCst)
    }

    /// Drop the navigator and wait for its worker to drain the queue.
    pub async fn shutdown(self) {
        let Self { navigator, worker, .. } = self;
        drop(navigator);
        if let Err(e) = worker.await {
            tracing::error!(error = %e, "Navigator worker panicked");
        }
    }
}
