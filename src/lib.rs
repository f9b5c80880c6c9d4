//! Token-gated catalog portal for the AI use case repository.
//!
//! The server side (`proxy`) exposes a cookie login, an auth gate and a
//! pagination proxy in front of the upstream use case API. The client side
//! (`client`) holds the page-by-page and infinite-scroll loaders that drive it.

pub mod client;
pub mod modules;
pub mod proxy;
