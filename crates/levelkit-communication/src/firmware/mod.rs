//! Firmware-specific protocol handling
//!
//! Only GRBL and its descendants are supported for probing.

pub mod grbl;
