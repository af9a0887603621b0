//! Error types for the ocean simulator
//!
//! Construction-time failures are fatal: an invalid configuration or a backend
//! that cannot provide its buffers never yields a partially built simulator.
//! Once constructed, `update()` only fails if the compute backend itself fails.

use std::fmt;

/// Errors produced by the ocean simulation core
#[derive(Debug, Clone, PartialEq)]
pub enum OceanSimError {
    /// A parameter is outside its valid range
    Configuration {
        /// Name of the offending parameter (e.g. `"grid_dimension"`)
        parameter: &'static str,
        /// Description of the violated constraint
        message: String,
    },
    /// The compute backend could not provide the required buffers
    ResourceAllocation(String),
    /// The compute backend failed while running a frame
    Backend(String),
    /// A parameter file could not be read, parsed or written
    ParameterFile(String),
}

impl OceanSimError {
    /// Create a configuration error for a named parameter
    pub fn configuration(parameter: &'static str, message: impl Into<String>) -> Self {
        Self::Configuration {
            parameter,
            message: message.into(),
        }
    }

    /// Create a configuration error for a non-finite or out-of-range float
    pub fn invalid_value(parameter: &'static str, value: f32, constraint: &str) -> Self {
        Self::configuration(parameter, format!("{constraint}, got {value}"))
    }

    /// Returns `true` for configuration errors
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}

impl fmt::Display for OceanSimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration { parameter, message } => {
                write!(f, "Invalid parameter '{parameter}': {message}")
            }
            Self::ResourceAllocation(msg) => write!(f, "Resource allocation failed: {msg}"),
            Self::Backend(msg) => write!(f, "Compute backend failure: {msg}"),
            Self::ParameterFile(msg) => write!(f, "Parameter file error: {msg}"),
        }
    }
}

impl std::error::Error for OceanSimError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_message() {
        let err = OceanSimError::invalid_value("patch_length", -1.0, "must be positive");
        assert!(err.is_configuration());
        assert_eq!(
            err.to_string(),
            "Invalid parameter 'patch_length': must be positive, got -1"
        );
    }

    #[test]
    fn test_backend_is_not_configuration() {
        let err = OceanSimError::Backend("map failed".to_string());
        assert!(!err.is_configuration());
        assert!(err.to_string().contains("map failed"));
    }
}
