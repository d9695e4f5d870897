//! portal-core: shared infrastructure for the access portal services.
//!
//! Holds the pieces that are not specific to any one service: the HTTP-facing
//! error type, base configuration loading, logging setup, and reusable axum
//! middleware (rate limiting, security headers, request-id propagation).

pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;
