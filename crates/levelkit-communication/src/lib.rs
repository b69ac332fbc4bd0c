//! # levelkit Communication
//!
//! Controller communication for bed probing.
//! Provides GRBL response parsing, the [`ControllerChannel`] seam with a
//! serial implementation, and the probe sequencer and its async driver.

pub mod communication;
pub mod firmware;
pub mod probe;

pub use communication::{
    serial::{list_ports, SerialLink, SerialPortInfo},
    ControllerChannel,
};
pub use firmware::grbl::{GrblResponse, GrblResponseParser, ProbeReport};
pub use probe::{
    build_commands, ProbeDriver, ProbeGridInfo, ProbeOutcome, ProbeParameters, ProbeProgress,
    ProbeSequencer, ProbeState, Step,
};
