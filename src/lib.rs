//! # levelkit
//!
//! Bed leveling for CNC machines driven by GRBL-style controllers:
//! - Probe the work surface on a regular grid
//! - Turn the samples into a height map, padded out to the machine limits
//! - Rewrite G-code so every absolute move follows the probed surface
//!
//! ## Architecture
//!
//! levelkit is organized as a workspace with multiple crates:
//!
//! 1. **levelkit-core** - Errors, units, geometry
//! 2. **levelkit-heightmap** - Height grid, stats, extrapolation, machine profiles
//! 3. **levelkit-gcode** - G-code Z compensation
//! 4. **levelkit-communication** - GRBL link and the probing sequencer
//! 5. **levelkit-settings** - Configuration files
//! 6. **levelkit** - This crate and the `levelkit` binary

pub use levelkit_communication as communication;
pub use levelkit_gcode as gcode;
pub use levelkit_heightmap as heightmap;
pub use levelkit_settings as settings;

pub use levelkit_communication::{
    list_ports, ControllerChannel, ProbeDriver, ProbeOutcome, ProbeParameters, SerialLink,
};
pub use levelkit_core::{Error, GcodeError, HeightMapError, Point3, ProbeError, Result, Units};
pub use levelkit_gcode::{ArcMode, CompensatedProgram, CompensationOptions, Compensator};
pub use levelkit_heightmap::{DeterminedHeightInfo, HeightInfo, MachineLimits, MachineProfile};
pub use levelkit_settings::LevelingConfig;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging
///
/// Logs go to stderr so command output on stdout stays machine-readable.
/// `RUST_LOG` overrides the default `info` level; `json` switches to one
/// JSON object per event.
pub fn init_logging(json: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if json {
        let fmt_layer = fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_current_span(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    }

    Ok(())
}
