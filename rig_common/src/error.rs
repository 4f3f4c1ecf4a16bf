//! Workspace-wide error type.
//!
//! One taxonomy for the whole rig: configuration problems are fatal at
//! startup, a missing singleton device is fatal at the moment a command
//! targets it, and persistence failures are reported but never stop the
//! sequence.

use thiserror::Error;

/// Error types for rig operations.
#[derive(Debug, Clone, Error)]
pub enum RigError {
    /// Configuration file could not be read
    #[error("config I/O error: {0}")]
    ConfigIo(String),

    /// Configuration file could not be parsed
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// Configuration failed validation
    #[error("config validation: {0}")]
    ConfigValidation(String),

    /// A required singleton device is not present on the rig
    #[error("required device '{0}' not found")]
    MissingDevice(String),

    /// Driver not found
    #[error("driver not found: {0}")]
    DriverNotFound(String),

    /// Resume-slot persistence error
    #[error("state persistence error: {0}")]
    Persistence(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_carries_detail() {
        let err = RigError::MissingDevice("Rig Rotor".to_string());
        assert!(err.to_string().contains("Rig Rotor"));

        let err = RigError::DriverNotFound("ethercat".to_string());
        assert!(err.to_string().contains("ethercat"));

        let err = RigError::ConfigValidation("extended_position".to_string());
        assert!(err.to_string().contains("extended_position"));
    }
}
