//! Domain-specific error types for skin-routine

use thiserror::Error;

/// Main error type for skin-routine.
///
/// Profile normalization and routine derivation never produce one of these;
/// they appear only at the configuration, storage and collaborator boundaries.
#[derive(Error, Debug)]
pub enum SkinRoutineError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Catalog error: {message}")]
    Catalog { message: String },

    #[error("Upstream service error: {message}")]
    Upstream { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<anyhow::Error> for SkinRoutineError {
    fn from(err: anyhow::Error) -> Self {
        SkinRoutineError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for SkinRoutineError {
    fn from(err: serde_json::Error) -> Self {
        SkinRoutineError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for SkinRoutineError {
    fn from(err: toml::de::Error) -> Self {
        SkinRoutineError::Config {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for SkinRoutineError {
    fn from(err: reqwest::Error) -> Self {
        SkinRoutineError::Upstream {
            message: format!("HTTP request failed: {}", err),
        }
    }
}

impl From<std::io::Error> for SkinRoutineError {
    fn from(err: std::io::Error) -> Self {
        SkinRoutineError::Storage {
            message: err.to_string(),
        }
    }
}

impl SkinRoutineError {
    /// Short machine-readable label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SkinRoutineError::Config { .. } => "config",
            SkinRoutineError::Validation { .. } => "validation",
            SkinRoutineError::Catalog { .. } => "catalog",
            SkinRoutineError::Upstream { .. } => "upstream",
            SkinRoutineError::Serialization { .. } => "serialization",
            SkinRoutineError::Storage { .. } => "storage",
            SkinRoutineError::NotFound { .. } => "not_found",
            SkinRoutineError::Internal { .. } => "internal",
        }
    }
}

/// Result type alias for skin-routine operations
pub type Result<T> = std::result::Result<T, SkinRoutineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SkinRoutineError::Validation {
            message: "step 2 is incomplete".into(),
        };
        assert_eq!(err.to_string(), "Validation error: step 2 is incomplete");
        assert_eq!(err.kind(), "validation");
    }

    #[test]
    fn test_from_serde_json() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: SkinRoutineError = parse.unwrap_err().into();
        assert!(matches!(err, SkinRoutineError::Serialization { .. }));
    }

    #[test]
    fn test_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: SkinRoutineError = io.into();
        assert_eq!(err.kind(), "storage");
        assert!(err.to_string().contains("denied"));
    }
}
