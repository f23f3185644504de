use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Runtime view of where a worker is in its lifecycle.
///
/// ```text
/// Parsed -> Installing -> Installed -> Activating -> Active
///              |                          |           |
///              +--------> Redundant <-----+-----------+
/// ```
///
/// A worker becomes redundant when its install or activation fails, or when
/// a newer worker replaces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LifecycleState {
    /// Created, not installed yet.
    Parsed = 0,
    /// Fetching the static asset manifest.
    Installing = 1,
    /// Installed and waiting to activate.
    Installed = 2,
    /// Evicting stale generations.
    Activating = 3,
    /// Controlling clients and answering requests.
    Active = 4,
    /// Failed or superseded. Never used again.
    Redundant = 5,
}

impl LifecycleState {
    /// Returns the state as a string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Parsed => "parsed",
            LifecycleState::Installing => "installing",
            LifecycleState::Installed => "installed",
            LifecycleState::Activating => "activating",
            LifecycleState::Active => "active",
            LifecycleState::Redundant => "redundant",
        }
    }

    const fn from_u8(value: u8) -> Self {
        match value {
            0 => LifecycleState::Parsed,
            1 => LifecycleState::Installing,
            2 => LifecycleState::Installed,
            3 => LifecycleState::Activating,
            4 => LifecycleState::Active,
            _ => LifecycleState::Redundant,
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state shared by every handle of one worker.
#[derive(Debug)]
pub(crate) struct SharedState(AtomicU8);

impl SharedState {
    pub(crate) fn new() -> Self {
        Self(AtomicU8::new(LifecycleState::Parsed as u8))
    }

    pub(crate) fn get(&self) -> LifecycleState {
        LifecycleState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub(crate) fn set(&self, state: LifecycleState) {
        self.0.store(state as u8, Ordering::Release);
        crate::metrics::record_transition(state.as_str());
    }
}

/// Compile-time lifecycle states of a [`ServiceWorker`](super::ServiceWorker).
pub mod states {
    /// Created from a configuration, not installed yet.
    #[derive(Debug, Clone, Copy)]
    pub struct Parsed;

    /// Static assets are cached; the worker waits to activate.
    #[derive(Debug, Clone, Copy)]
    pub struct Installed;

    /// Stale generations are evicted; the worker answers requests.
    #[derive(Debug, Clone, Copy)]
    pub struct Active;

    mod sealed {
        pub trait Sealed {}
        impl Sealed for super::Parsed {}
        impl Sealed for super::Installed {}
        impl Sealed for super::Active {}
    }

    /// Marker trait of the compile-time states.
    pub trait WorkerState: sealed::Sealed + Send + Sync + 'static {}

    impl WorkerState for Parsed {}
    impl WorkerState for Installed {}
    impl WorkerState for Active {}
}
