//! # levelkit-heightmap
//!
//! Turns raw probe samples into a height grid, describes it, and pads it out
//! to the machine limits by linear extrapolation. Also owns the machine
//! profile model that stores those samples.

pub mod error;
pub mod extrapolate;
pub mod grid;
pub mod info;
pub mod limits;
pub mod profile;
pub mod sample;
pub mod spacing;
pub mod stats;

pub use error::{ProfileError, ProfileResult};
pub use extrapolate::{extrapolate, Extension, ExtrapolatedGrid};
pub use grid::{GridIndex, HeightGrid};
pub use info::{DeterminedHeightInfo, HeightInfo};
pub use limits::MachineLimits;
pub use profile::{MachineProfile, ProfileStore};
pub use sample::{parse_samples, round_z, HeightPoint};
pub use spacing::{check_spacing, SpacingAxis, SpacingWarning};
pub use stats::{diagonal_spacing, HeightStats};
