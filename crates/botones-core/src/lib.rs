//! botones-core — configuration and shared operational limits for the
//! Botones workspace.

pub mod config;
pub mod error;

pub use config::BotonesConfig;
pub use error::{ConfigError, Result};
