//! Configuration loading and validation.
//!
//! Configuration comes from an optional `deskpilot.toml` file with
//! environment-variable overrides for credentials. Validation happens once
//! at startup; a `ConfigError` here is fatal before any cycle runs.

pub mod error;
pub mod loader;
pub mod models;

pub use error::{ConfigError, ConfigResult};
pub use loader::load_config;
pub use models::AppConfig;
