//! levelkit Settings Crate
//!
//! Loads, validates and saves the leveling configuration.

pub mod config;
pub mod error;

pub use config::{
    default_config_path, CompensationSettings, ConnectionSettings, LevelingConfig, TimingSettings,
};
pub use error::{SettingsError, SettingsResult};
