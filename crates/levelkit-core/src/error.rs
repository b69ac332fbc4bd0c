//! Error handling for levelkit
//!
//! Provides error types for each layer of the bed-leveling engine:
//! - Height map errors (sample parsing and grid validation)
//! - G-Code errors (compensation pass failures)
//! - Probe errors (probing run failures, timeouts, cancellation)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Height map error type
///
/// Raised while turning raw probe samples into a grid. Every variant is a
/// validation failure: nothing is computed from rejected input.
#[derive(Error, Debug)]
pub enum HeightMapError {
    /// The sample string is not valid JSON or holds non-numeric coordinates
    #[error("Failed to parse height samples: {reason}")]
    Parse {
        /// The reason parsing failed.
        reason: String,
    },

    /// No samples were supplied
    #[error("Height map contains no samples")]
    Empty,

    /// A row has a different column count than the first row
    #[error("Height map is not rectangular: row {row} has {found} columns, expected {expected}")]
    NotRectangular {
        /// The offending row index.
        row: usize,
        /// Column count of the first row.
        expected: usize,
        /// Column count of the offending row.
        found: usize,
    },

    /// Extrapolation needs more rows or columns than the grid has
    #[error("Cannot extend grid along {direction}: need {required} lines, grid has {found}")]
    InsufficientGrid {
        /// The axis being extended ("X" or "Y").
        direction: String,
        /// Rows/columns required.
        required: usize,
        /// Rows/columns available.
        found: usize,
    },

    /// Grid spacing is zero or not finite where a spacing is required
    #[error("Invalid grid spacing along {axis}: {value}")]
    InvalidSpacing {
        /// The axis with the bad spacing.
        axis: String,
        /// The inferred spacing value.
        value: f64,
    },

    /// A reference cell index lies outside the grid
    #[error("Reference cell [{row}][{column}] is outside the grid")]
    ReferenceOutOfRange {
        /// The requested row.
        row: usize,
        /// The requested column.
        column: usize,
    },
}

impl From<serde_json::Error> for HeightMapError {
    fn from(err: serde_json::Error) -> Self {
        HeightMapError::Parse {
            reason: err.to_string(),
        }
    }
}

/// G-Code error type
///
/// Any of these aborts the whole compensation pass; no partial program is
/// ever returned.
#[derive(Error, Debug, Clone)]
pub enum GcodeError {
    /// A coordinate word did not hold a number
    #[error("Invalid number in word '{word}' at line {line_number}")]
    InvalidNumber {
        /// 1-based line number.
        line_number: usize,
        /// The offending word.
        word: String,
    },

    /// An arc used an I/J offset without the axis the legacy center reads
    #[error("Arc at line {line_number} has no {axis} word for its center")]
    MissingArcAxis {
        /// 1-based line number.
        line_number: usize,
        /// The missing axis letter.
        axis: char,
    },

    /// The pass was cancelled by the caller
    #[error("Compensation cancelled at line {line_number}")]
    Cancelled {
        /// 1-based line number reached when the cancel was observed.
        line_number: usize,
    },

    /// No program text was supplied and no sample program was requested
    #[error("Program is empty")]
    EmptyProgram,

    /// The height grid holds no usable samples
    #[error("No height data available for compensation")]
    NoHeightData,
}

/// Probe error type
///
/// Failures of a probing run. A failed run never yields partial results.
#[derive(Error, Debug, Clone)]
pub enum ProbeError {
    /// A probe parameter is missing or out of range
    #[error("Invalid probe parameter '{name}': {reason}")]
    InvalidParameter {
        /// The parameter name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The controller did not answer a command in time
    #[error("Probe command '{command}' timed out after {timeout_ms}ms")]
    Timeout {
        /// The command awaiting acknowledgment.
        command: String,
        /// The per-command deadline in milliseconds.
        timeout_ms: u64,
    },

    /// The caller aborted the run
    #[error("Probing cancelled")]
    Cancelled,

    /// Another probing run already owns the controller
    #[error("A probing run is already in progress on this controller")]
    AlreadyRunning,

    /// The controller stream closed
    #[error("Controller connection lost")]
    ConnectionLost,

    /// The controller rejected a command
    #[error("Controller rejected '{command}' with error {code}")]
    ControllerError {
        /// The rejected command.
        command: String,
        /// The firmware error code.
        code: u8,
    },

    /// The controller raised an alarm
    #[error("Controller alarm {code}")]
    Alarm {
        /// The firmware alarm code.
        code: u8,
    },

    /// Transport failure while talking to the controller
    #[error("I/O error: {reason}")]
    Io {
        /// The underlying failure.
        reason: String,
    },
}

/// Main error type for levelkit
///
/// A unified error type that can represent any error from all layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Height map error
    #[error(transparent)]
    HeightMap(#[from] HeightMapError),

    /// G-Code error
    #[error(transparent)]
    Gcode(#[from] GcodeError),

    /// Probe error
    #[error(transparent)]
    Probe(#[from] ProbeError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a probe timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Probe(ProbeError::Timeout { .. }))
    }

    /// Check if this is a cancellation of either a probe run or a compensation pass
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            Error::Probe(ProbeError::Cancelled) | Error::Gcode(GcodeError::Cancelled { .. })
        )
    }

    /// Check if the input was rejected before any computation started
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::HeightMap(_) | Error::Probe(ProbeError::InvalidParameter { .. })
        )
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
