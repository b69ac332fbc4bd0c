//! Error types for machine profile storage.

use levelkit_core::HeightMapError;
use std::io;
use thiserror::Error;

/// Errors that can occur while reading or writing machine profiles.
#[derive(Error, Debug)]
pub enum ProfileError {
    /// The requested profile was not found.
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    /// A required field is missing or empty.
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// An axis limit has min greater than max.
    #[error("Invalid axis limit for {axis}: {reason}")]
    InvalidAxisLimit { axis: String, reason: String },

    /// The stored height info could not be turned into a grid.
    #[error("Invalid height info: {0}")]
    HeightInfo(#[from] HeightMapError),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type alias for profile operations.
pub type ProfileResult<T> = Result<T, ProfileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_error_display() {
        let err = ProfileError::ProfileNotFound("router-1".to_string());
        assert_eq!(err.to_string(), "Profile not found: router-1");

        let err = ProfileError::InvalidAxisLimit {
            axis: "X".to_string(),
            reason: "min greater than max".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid axis limit for X: min greater than max");
    }

    #[test]
    fn test_error_conversion() {
        let err: ProfileError = HeightMapError::Empty.into();
        assert!(matches!(err, ProfileError::HeightInfo(_)));

        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: ProfileError = io_err.into();
        assert!(matches!(err, ProfileError::IoError(_)));
    }
}
