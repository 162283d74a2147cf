//! Boundary to the presentation mechanism.
//!
//! # Responsibilities
//! - Define what the navigation core needs from whatever shows screens
//! - Turn completion callbacks into something a flow can `.await`
//!
//! # Design Decisions
//! - `Completion` is consumed by `complete`, so it fires at most once
//! - Dropping a `Completion` without completing is reported as abandonment
//!   instead of stalling; never completing still stalls (no timeout)

use tokio::sync::oneshot;

use crate::routing::RoutingEntry;

/// Shows and hides screens. Implementations invoke the given completion once
/// the screen has visually settled.
pub trait Presenter: Send + Sync {
    fn present(&self, entry: &RoutingEntry, animated: bool, completion: Completion);

    fn dismiss(&self, entry: &RoutingEntry, animated: bool, completion: Completion);
}

/// One-shot completion handle passed to a [`Presenter`].
#[derive(Debug)]
pub struct Completion {
    tx: oneshot::Sender<()>,
}

impl Completion {
    /// Create a handle and the signal that resolves when it completes.
    pub fn pair() -> (Self, CompletionSignal) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, CompletionSignal { rx })
    }

    pub fn complete(self) {
        // The waiting side may already be gone; nothing to report then.
        let _ = self.tx.send(());
    }
}

/// Waiting side of a [`Completion`].
#[derive(Debug)]
pub struct CompletionSignal {
    rx: oneshot::Receiver<()>,
}

impl CompletionSignal {
    /// Resolves once the presenter completed. Returns `false` if the handle
    /// was dropped without completing.
    pub async fn settled(self) -> bool {
        self.rx.await.is_ok()
    }
}

/// Presenter that completes synchronously, for headless hosts and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediatePresenter;

impl Presenter for ImmediatePresenter {
    fn present(&self, _entry: &RoutingEntry, _animated: bool, completion: Completion) {
        completion.complete();
    }

    fn dismiss(&self, _entry: &RoutingEntry, _animated: bool, completion: Completion) {
        completion.complete();
    }
}
