//! service-core: Shared infrastructure for the session lookup service.
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;
pub mod utils;
