//! Shared utilities for stock-insight
//!
//! Logging setup and the small configuration types it needs.

pub mod config;
pub mod logging;

pub use config::{LogConfig, LogFormat};
pub use logging::{init_tracing, init_tracing_with};
