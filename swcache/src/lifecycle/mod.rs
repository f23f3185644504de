//! Worker lifecycle: install and activate.
//!
//! A [`ServiceWorker`] moves through its lifecycle by consuming itself:
//!
//! ```text
//! ServiceWorker<Parsed> --install()--> ServiceWorker<Installed> --activate()--> ServiceWorker<Active>
//! ```
//!
//! Install caches the static asset manifest into the static generation.
//! Activate evicts every generation that is neither the current static nor
//! the current runtime one. The [`LifecycleState`] enum mirrors the
//! compile-time state at runtime, including the transient `Installing` and
//! `Activating` states and the terminal `Redundant` state.

mod state;
mod worker;

pub use state::LifecycleState;
pub use state::states::{self, Active, Installed, Parsed, WorkerState};
pub use worker::ServiceWorker;
