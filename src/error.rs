//! Error types for the workforce engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while tracking attendance or
//! managing leave.

use thiserror::Error;

/// The coarse category of an [`EngineError`].
///
/// Callers at the transport boundary use this to pick a status code without
/// matching on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or out-of-range payload fields.
    InvalidInput,
    /// A referenced record is absent.
    NotFound,
    /// The actor lacks the role or ownership for the operation.
    Forbidden,
    /// An invariant would be violated.
    Conflict,
    /// Persistence or configuration failure.
    Internal,
}

/// The main error type for the workforce engine.
///
/// # Example
///
/// ```
/// use workforce_engine::error::{EngineError, ErrorKind};
///
/// let error = EngineError::conflict("insufficient balance");
/// assert_eq!(error.to_string(), "Conflict: insufficient balance");
/// assert_eq!(error.kind(), ErrorKind::Conflict);
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed or failed validation.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A payload field was malformed or out of range.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// What was wrong with the input.
        message: String,
    },

    /// A referenced record does not exist.
    #[error("{resource} not found")]
    NotFound {
        /// The kind of record that was looked up (e.g. "shift").
        resource: String,
    },

    /// The actor is not allowed to perform the operation.
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Why access was denied.
        message: String,
    },

    /// The operation would violate an invariant.
    #[error("Conflict: {message}")]
    Conflict {
        /// The invariant that would be violated.
        message: String,
    },

    /// The backing store failed or a transaction aborted.
    #[error("Internal error: {message}")]
    Internal {
        /// A description of the failure.
        message: String,
    },
}

impl EngineError {
    /// Builds an [`EngineError::InvalidInput`].
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Builds an [`EngineError::NotFound`] for the named resource.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Builds an [`EngineError::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Builds an [`EngineError::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Builds an [`EngineError::Internal`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::InvalidInput { .. } => ErrorKind::InvalidInput,
            EngineError::NotFound { .. } => ErrorKind::NotFound,
            EngineError::Forbidden { .. } => ErrorKind::Forbidden,
            EngineError::Conflict { .. } => ErrorKind::Conflict,
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::Internal { .. } => ErrorKind::Internal,
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/config.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/config.yaml"
        );
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = EngineError::ConfigParseError {
            path: "/config/bad.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/config/bad.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_not_found_displays_resource() {
        let error = EngineError::not_found("open shift");
        assert_eq!(error.to_string(), "open shift not found");
        assert_eq!(error.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_conflict_displays_reason() {
        let error = EngineError::conflict("open shift exists");
        assert_eq!(error.to_string(), "Conflict: open shift exists");
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            EngineError::invalid_input("x").kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(EngineError::forbidden("x").kind(), ErrorKind::Forbidden);
        assert_eq!(EngineError::internal("x").kind(), ErrorKind::Internal);
        assert_eq!(
            EngineError::ConfigNotFound {
                path: "x".to_string()
            }
            .kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_conflict() -> EngineResult<()> {
            Err(EngineError::conflict("already checked out"))
        }

        fn propagates_error() -> EngineResult<()> {
            returns_conflict()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
