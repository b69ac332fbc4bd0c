//! Controller communication
//!
//! A probing run talks to the controller one line at a time: it writes a
//! G-code command and then reads response lines until the command is
//! acknowledged. [`ControllerChannel`] is that seam; [`serial::SerialLink`]
//! implements it over a real serial port and tests implement it in memory.

pub mod serial;

use async_trait::async_trait;
use levelkit_core::ProbeError;

/// Line-oriented, request/response link to a motion controller
#[async_trait]
pub trait ControllerChannel: Send {
    /// Write one command line (without the terminating newline)
    async fn send_line(&mut self, line: &str) -> Result<(), ProbeError>;

    /// Wait for the next non-empty response line
    ///
    /// Returns `None` once the controller stream has closed. Implementations
    /// must be cancel-safe: dropping the future loses no line.
    async fn next_line(&mut self) -> Option<String>;

    /// Free-move feedrate configured on the controller (GRBL `$110`), if known
    fn free_move_feedrate(&self) -> Option<f64>;
}
