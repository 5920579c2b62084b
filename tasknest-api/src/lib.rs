//! # TaskNest API Server Library
//!
//! HTTP surface of TaskNest: a multi-tenant TODO service where every task
//! is visible only to the user who created it.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Layered configuration
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Validating JSON extractor
//! - `middleware`: Access gate and security headers
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;

/// Version reported at startup and by `/health`
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
