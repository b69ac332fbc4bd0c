//! # levelkit-gcode
//!
//! Rewrites G-code so every absolute move follows a probed surface.
//!
//! The pass tracks modal state line by line, splits feed moves into pieces
//! no longer than half the probe spacing, and sets each piece's Z from the
//! plane through the three nearest height samples.

pub mod arc;
pub mod compensator;
pub mod line;
pub mod modal;
pub mod samples;
pub mod segments;

pub use arc::{ArcExpander, ArcExpanderConfig, ArcMode};
pub use compensator::{
    CompensatedPoint, CompensatedProgram, CompensationOptions, CompensationReport, Compensator,
    LineKind, ORIGINAL_TAG, RELATIVE_TAG,
};
pub use line::{strip_comments, ParsedLine, Word};
pub use modal::{is_pass_through, DistanceMode, ModalState, MotionMode};
pub use samples::SampleProgram;
pub use segments::split_linear;
