//! # gitview node
//!
//! The gitview server: loads bare repositories from disk and serves the
//! web front-end over HTTP.
//!
//! ## Modules
//!
//! - [`config`] - Layered YAML and environment configuration
//! - [`observability`] - Structured logging and request ids
//! - [`server`] - Application state, bootstrap and router assembly

pub mod config;
pub mod observability;
pub mod server;

pub use config::{ConfigError, NodeConfig};
pub use server::{bootstrap, build_router, AppState};
