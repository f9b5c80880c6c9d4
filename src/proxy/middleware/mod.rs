// Middleware module - Axum middleware

pub mod auth_gate;

pub use auth_gate::auth_gate_middleware;
