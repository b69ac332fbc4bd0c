//! Bed probing
//!
//! [`ProbeParameters`] describe the grid, [`build_commands`] turns them into
//! G-code, [`ProbeSequencer`] tracks acknowledgments and probe reports, and
//! [`ProbeDriver`] runs the whole thing against a live controller.

pub mod commands;
pub mod driver;
pub mod params;
pub mod sequencer;

pub use commands::{build_commands, final_retract, COMMANDS_PER_POINT, PREAMBLE_LEN};
pub use driver::{ProbeDriver, ProbeOutcome, ProbeProgress, ProbeState, DEFAULT_COMMAND_TIMEOUT};
pub use params::{ProbeGridInfo, ProbeParameters};
pub use sequencer::{ProbeSequencer, Step};
