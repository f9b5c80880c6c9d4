// proxy module - token gate and pagination proxy in front of the use case API

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod server;
pub mod session;
pub mod upstream;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::PortalConfig;
pub use error::PortalError;
pub use server::{AppState, AxumServer};
