//! Shared utilities for stock-dashboard
//!
//! This crate provides common functionality used across the workspace,
//! including logging setup and environment-driven configuration.

pub mod config;
pub mod logging;

pub use config::{Config, EnvError, env_parse, env_var};
pub use logging::init_tracing_with;
