#![warn(missing_docs)]
//! Cache store abstraction for swcache.
//!
//! If you want to keep cache generations somewhere else, you are in the
//! right place: implement [`CacheStore`] and inject it into the worker.
mod error;
mod memory;
mod store;

pub use error::{DeleteStatus, StoreError};
pub use memory::MemoryStore;
pub use store::{CacheStore, StoreResult};
