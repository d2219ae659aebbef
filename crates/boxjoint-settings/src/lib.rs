//! BoxJoint Settings Crate
//!
//! Persisted generation defaults in TOML or JSON.

pub mod config;
pub mod error;

pub use config::{default_path, Settings, SettingsFormat};
pub use error::{SettingsError, SettingsResult};
