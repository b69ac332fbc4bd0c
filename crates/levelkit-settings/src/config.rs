//! Configuration for bed leveling
//!
//! Configuration is organized into sections:
//! - Probe job defaults
//! - Timing (per-command deadline)
//! - Connection (serial port, baud rate, feedrate override)
//! - Compensation (arc handling, spacing checks)
//!
//! Files are JSON or TOML, chosen by extension.

use std::path::{Path, PathBuf};
use std::time::Duration;

use levelkit_communication::ProbeParameters;
use levelkit_gcode::{ArcExpanderConfig, ArcMode, CompensationOptions};
use serde::{Deserialize, Serialize};

use crate::error::{SettingsError, SettingsResult};

/// Timing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingSettings {
    /// Deadline for each probe command's acknowledgment
    pub command_timeout_ms: u64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            command_timeout_ms: 60_000,
        }
    }
}

impl TimingSettings {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }
}

/// Connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Serial port name; empty means none configured
    pub port: String,
    /// Baud rate for serial connections
    pub baud_rate: u32,
    /// Replaces the controller's `$110` when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_move_feedrate: Option<f64>,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            port: String::new(),
            baud_rate: 115_200,
            free_move_feedrate: None,
        }
    }
}

/// Compensation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompensationSettings {
    pub arc_mode: ArcMode,
    /// Minimum chords per interpolated arc
    pub arc_segments: usize,
    /// Allowed deviation of a grid gap from the inferred spacing, in mm
    pub spacing_tolerance: f64,
    /// Warn about unevenly spaced height samples
    pub validate_spacing: bool,
}

impl Default for CompensationSettings {
    fn default() -> Self {
        Self {
            arc_mode: ArcMode::Legacy,
            arc_segments: 4,
            spacing_tolerance: 0.05,
            validate_spacing: true,
        }
    }
}

impl CompensationSettings {
    /// Options for a compensation pass
    pub fn options(&self) -> CompensationOptions {
        CompensationOptions {
            arc_mode: self.arc_mode,
            arc: ArcExpanderConfig {
                num_segments: self.arc_segments,
                ..Default::default()
            },
            sample_program: None,
        }
    }
}

/// Complete leveling configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelingConfig {
    pub probe: ProbeParameters,
    pub timing: TimingSettings,
    pub connection: ConnectionSettings,
    pub compensation: CompensationSettings,
}

enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> SettingsResult<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(SettingsError::UnsupportedFormat(
            other.unwrap_or("<none>").to_string(),
        )),
    }
}

impl LevelingConfig {
    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_of(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::LoadError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load config, falling back to defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::debug!("No configuration at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match format_of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content).map_err(|e| {
            SettingsError::SaveError(format!("Failed to write {}: {}", path.display(), e))
        })?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        self.probe
            .validate()
            .map_err(|e| SettingsError::invalid("probe", e.to_string()))?;

        if self.timing.command_timeout_ms == 0 {
            return Err(SettingsError::invalid(
                "timing.command_timeout_ms",
                "must be > 0",
            ));
        }

        if self.connection.baud_rate == 0 {
            return Err(SettingsError::invalid("connection.baud_rate", "must be > 0"));
        }

        if let Some(feedrate) = self.connection.free_move_feedrate {
            if !(feedrate.is_finite() && feedrate > 0.0) {
                return Err(SettingsError::invalid(
                    "connection.free_move_feedrate",
                    format!("must be > 0, got {}", feedrate),
                ));
            }
        }

        if self.compensation.arc_segments == 0 {
            return Err(SettingsError::invalid(
                "compensation.arc_segments",
                "must be > 0",
            ));
        }

        if !(self.compensation.spacing_tolerance.is_finite()
            && self.compensation.spacing_tolerance >= 0.0)
        {
            return Err(SettingsError::invalid(
                "compensation.spacing_tolerance",
                "must be a non-negative number",
            ));
        }

        Ok(())
    }
}

/// `<config_dir>/levelkit/config.toml`
pub fn default_config_path() -> SettingsResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("levelkit").join("config.toml"))
        .ok_or_else(|| {
            SettingsError::ConfigDirectory("no configuration directory on this platform".into())
        })
}
