//! The navigator: a request queue in front of a single worker that plans and
//! executes navigations one at a time.

use std::any::Any;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::NavigationConfig;
use crate::error::{NavigationError, NavigationResult, TreeError};
use crate::flow::Routable;
use crate::navigation::path::Path;
use crate::navigation::strategy::{Plan, RoutingStrategy};
use crate::navigation::table::SharedTable;
use crate::observability::metrics;
use crate::routing::{RoutingEntry, RoutingIdentifier, SharedTree};

/// Payload handed to the final entered routable.
pub type Info = Arc<dyn Any + Send + Sync>;

/// Per-request options.
#[derive(Clone, Default)]
pub struct RouteOptions {
    pub animated: bool,
    pub info: Option<Info>,
}

impl RouteOptions {
    pub fn animated(animated: bool) -> Self {
        Self {
            animated,
            info: None,
        }
    }

    pub fn with_info<T: Any + Send + Sync>(mut self, info: T) -> Self {
        self.info = Some(Arc::new(info));
        self
    }
}

impl std::fmt::Debug for RouteOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteOptions")
            .field("animated", &self.animated)
            .field("info", &self.info.is_some())
            .finish()
    }
}

/// What one navigation did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationOutcome {
    /// Left nodes, in the order they were left.
    pub left: Vec<RoutingIdentifier>,

    /// Entered nodes, in the order they were entered.
    pub entered: Vec<RoutingIdentifier>,

    /// First enter step nobody handled. Later steps were skipped.
    pub unresolved: Option<RoutingIdentifier>,
}

impl NavigationOutcome {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_none()
    }
}

/// Handle on a queued navigation. Dropping it does not cancel the request.
#[derive(Debug)]
pub struct PendingNavigation {
    id: Uuid,
    reply: oneshot::Receiver<NavigationResult<NavigationOutcome>>,
}

impl PendingNavigation {
    /// Request id, also recorded on the request's tracing span.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Wait for the request to finish.
    pub async fn wait(self) -> NavigationResult<NavigationOutcome> {
        self.reply.await.unwrap_or(Err(NavigationError::Closed))
    }
}

enum Target {
    Enter(RoutingEntry),
    Route {
        path: Path,
        strategy: Arc<dyn RoutingStrategy>,
    },
}

struct Request {
    id: Uuid,
    target: Target,
    options: RouteOptions,
    reply: oneshot::Sender<NavigationResult<NavigationOutcome>>,
}

/// Entry point for application code. Cheap to clone; all clones feed the
/// same queue.
#[derive(Clone)]
pub struct Navigator {
    requests: mpsc::UnboundedSender<Request>,
    tree: SharedTree,
    table: SharedTable,
    animated: bool,
    strategy: Arc<dyn RoutingStrategy>,
}

impl Navigator {
    /// Spawn the worker. It stops once every `Navigator` clone is dropped.
    pub fn spawn(tree: SharedTree, table: SharedTable, config: &NavigationConfig) -> (Self, JoinHandle<()>) {
        let (requests, rx) = mpsc::unbounded_channel();
        let worker = NavigatorWorker {
            requests: rx,
            tree: tree.clone(),
            halted: None,
        };
        let handle = tokio::spawn(worker.run());

        let navigator = Self {
            requests,
            tree,
            table,
            animated: config.animated,
            strategy: config.strategy.strategy(),
        };
        (navigator, handle)
    }

    pub fn tree(&self) -> &SharedTree {
        &self.tree
    }

    pub fn table(&self) -> &SharedTable {
        &self.table
    }

    /// Enter `destination` directly below the deepest active node, without
    /// diffing. Fire-and-forget: the returned handle may be dropped.
    pub fn enter(&self, destination: impl Into<RoutingEntry>) -> PendingNavigation {
        self.submit(
            Target::Enter(destination.into()),
            RouteOptions::animated(self.animated),
        )
    }

    /// Route to `path`, leaving and entering whatever `strategy` plans.
    pub async fn route_to(
        &self,
        path: Path,
        strategy: Arc<dyn RoutingStrategy>,
        animated: bool,
    ) -> NavigationResult<NavigationOutcome> {
        self.route_to_with(path, strategy, RouteOptions::animated(animated))
            .await
    }

    pub async fn route_to_with(
        &self,
        path: Path,
        strategy: Arc<dyn RoutingStrategy>,
        options: RouteOptions,
    ) -> NavigationResult<NavigationOutcome> {
        self.submit(Target::Route { path, strategy }, options)
            .wait()
            .await
    }

    /// Route to a path registered in the table, with the configured defaults.
    pub async fn route_to_named(&self, name: &str) -> NavigationResult<NavigationOutcome> {
        let path = self.table.load().resolve_named(name)?;
        self.route_to(path, self.strategy.clone(), self.animated).await
    }

    /// Resolve `keys` through the table and route there, with the configured
    /// defaults.
    pub async fn route_to_keys<I, S>(&self, keys: I) -> NavigationResult<NavigationOutcome>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let path = self.table.load().resolve_path(keys)?;
        self.route_to(path, self.strategy.clone(), self.animated).await
    }

    fn submit(&self, target: Target, options: RouteOptions) -> PendingNavigation {
        let id = Uuid::new_v4();
        let (reply, rx) = oneshot::channel();
        let request = Request {
            id,
            target,
            options,
            reply,
        };
        if self.requests.send(request).is_err() {
            // The rejected request drops its reply sender, so `wait` reports
            // `Closed`.
            tracing::warn!(request_id = %id, "Navigator worker is gone, request dropped");
        }
        PendingNavigation { id, reply: rx }
    }
}

impl std::fmt::Debug for Navigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("animated", &self.animated)
            .field("strategy", &self.strategy)
            .field("closed", &self.requests.is_closed())
            .finish()
    }
}

struct NavigatorWorker {
    requests: mpsc::UnboundedReceiver<Request>,
    tree: SharedTree,
    halted: Option<TreeError>,
}

impl NavigatorWorker {
    async fn run(mut self) {
        tracing::debug!("Navigator worker starting");

        while let Some(request) = self.requests.recv().await {
            let span = tracing::info_span!("navigation", request_id = %request.id);
            let result = self
                .handle(request.target, request.options)
                .instrument(span)
                .await;
            // The caller may have dropped its handle.
            let _ = request.reply.send(result);
        }

        tracing::debug!("Navigator worker stopped");
    }

    async fn handle(&mut self, target: Target, options: RouteOptions) -> NavigationResult<NavigationOutcome> {
        if let Some(err) = &self.halted {
            tracing::warn!(error = %err, "Request rejected: navigator halted");
            return Err(NavigationError::Halted(err.clone()));
        }

        let started = Instant::now();
        let plan = self.plan(target);
        tracing::debug!(
            leave = plan.leave.len(),
            anchor = ?plan.anchor.as_ref().map(RoutingIdentifier::as_str),
            enter = plan.enter.len(),
            "Navigation planned"
        );

        let result = self.execute(plan, &options).await;
        let label = match &result {
            Ok(outcome) if outcome.is_complete() => {
                tracing::info!(left = outcome.left.len(), entered = outcome.entered.len(), "Navigation completed");
                "complete"
            }
            Ok(outcome) => {
                tracing::info!(
                    unresolved = ?outcome.unresolved.as_ref().map(RoutingIdentifier::as_str),
                    "Navigation stopped at an unresolved step"
                );
                "unresolved"
            }
            Err(NavigationError::Tree(err)) => {
                tracing::error!(error = %err, "Fatal routing tree violation, halting navigator");
                self.halted = Some(err.clone());
                "fatal"
            }
            Err(err) => {
                tracing::warn!(error = %err, "Navigation failed");
                "failed"
            }
        };
        metrics::record_navigation(label, started);
        result
    }

    fn plan(&self, target: Target) -> Plan {
        match target {
            Target::Enter(entry) => {
                let deepest = self.tree.lock().active_path().pop();
                Plan::direct(deepest, entry)
            }
            Target::Route { path, strategy } => strategy.plan(&self.active_entries(), &path),
        }
    }

    /// Current entries of the active chain, root first.
    fn active_entries(&self) -> Vec<RoutingEntry> {
        let routables: Vec<_> = {
            let tree = self.tree.lock();
            tree.active_path()
                .iter()
                .filter_map(|id| tree.get_routable_with(id))
                .collect()
        };
        routables.iter().map(|routable| routable.entry()).collect()
    }

    fn routable(&self, identifier: &RoutingIdentifier) -> Option<Arc<dyn Routable>> {
        self.tree.lock().get_routable_with(identifier)
    }

    async fn execute(&self, plan: Plan, options: &RouteOptions) -> NavigationResult<NavigationOutcome> {
        let mut outcome = NavigationOutcome::default();
        if plan.is_noop() {
            return Ok(outcome);
        }

        for entry in &plan.leave {
            let Some(routable) = self.routable(&entry.identifier) else {
                tracing::debug!(flow = %entry.identifier, "Leave skipped: no longer in the tree");
                continue;
            };
            routable.leave(entry, options.animated).await?;
            outcome.left.push(entry.identifier.clone());
        }

        let Some(mut current) = plan.anchor.as_ref().and_then(|anchor| self.routable(anchor)) else {
            outcome.unresolved = plan.enter.first().map(|entry| entry.identifier.clone());
            if let Some(unresolved) = &outcome.unresolved {
                tracing::debug!(destination = %unresolved, "No anchor to enter from");
            }
            return Ok(outcome);
        };

        let mut last_entered = None;
        for entry in &plan.enter {
            match current.enter(entry, options.animated).await? {
                Some(child) => {
                    outcome.entered.push(child.identifier().clone());
                    last_entered = Some(child.clone());
                    current = child;
                }
                None => {
                    tracing::debug!(flow = %current.identifier(), destination = %entry.identifier, "Unresolved enter step");
                    outcome.unresolved = Some(entry.identifier.clone());
                    break;
                }
            }
        }

        if let Some(routable) = last_entered {
            routable.did_enter_with_info(options.info.as_deref());
        }
        Ok(outcome)
    }
}
