#![doc = include_str!("../README.md")]

pub mod network;
pub mod steps;
pub mod world;

pub use network::ScriptedNetwork;
pub use world::{Answer, ORIGIN, SwWorld};
