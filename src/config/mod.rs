//! Engine configuration: TOML-backed settings plus the hot-swappable
//! handle the resolution path reads rules and blacklists through.

pub mod settings;

pub use settings::{ConfigData, ConfigHandle, Settings};
