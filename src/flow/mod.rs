//! Flow subsystem: the routable capability and its flow controller
//! implementation.
//!
//! # Data Flow
//! ```text
//! Navigator step
//!     → Routable::enter(entry) on the parent flow
//!         → controller.rs (create child, add to parent, child.start)
//!         → tree.rs (register child node)
//!         → presenter.rs (present; await completion)
//!     → Routable::leave(entry) on the leaving flow
//!         → presenter.rs (dismiss; await completion)
//!         → tree.rs (remove node) → detach from parent
//! ```
//!
//! # Design Decisions
//! - Completion callbacks become awaited signals, so a step's future
//!   resolves strictly after its presentation settled
//! - Unknown destinations are silent no-ops, not errors

pub mod controller;
pub mod presenter;
pub mod routable;

pub use controller::{FlowBlueprint, FlowCatalog, FlowController, FlowState};
pub use presenter::{Completion, CompletionSignal, ImmediatePresenter, Presenter};
pub use routable::Routable;
