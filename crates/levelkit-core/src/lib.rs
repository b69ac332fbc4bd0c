//! # levelkit Core
//!
//! Core types and utilities shared by the levelkit crates.
//! Provides the error taxonomy, unit conversion between millimeters and
//! inches, and the small vector toolkit used for plane fitting.

pub mod error;
pub mod geometry;
pub mod units;

pub use error::{Error, GcodeError, HeightMapError, ProbeError, Result};
pub use geometry::{cross_product, distance_squared_2d, distance_squared_3d, is_colinear, Point3};
pub use units::Units;
