//! # waymark-core
//!
//! Foundation types shared by every waymark crate. This crate has no routing
//! logic of its own.
//!
//! ## Modules
//!
//! - [`error`] - The [`RouterError`] enum and result alias
//! - [`settings`] - Router configuration with sensible defaults
//! - [`settings_loader`] - Loading settings from TOML, JSON, and the environment
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;

// Re-export the most commonly used types at the crate root.
pub use error::{RouterError, RouterResult};
pub use settings::Settings;
