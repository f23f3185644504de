#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

mod middleware;
mod network;

pub use middleware::ServiceWorkerMiddleware;
pub use network::ReqwestNetwork;

pub use swcache::CACHE_STATUS_HEADER;
