#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod error;
pub mod settings;
pub mod store;

pub use error::ConfigError;
pub use settings::Settings;
pub use store::{Moka, Store};
