//! Unified error types for the casevac ecosystem
//!
//! This module provides a common error type [`CasevacError`] that can
//! represent errors from any part of the system. Domain-specific error
//! types can be converted to `CasevacError` for uniform handling at API
//! boundaries.
//!
//! Note that the decision engine itself never surfaces domain outcomes as
//! errors: an unreachable patient or an infeasible assignment is a
//! structured forfeit decision, not an `Err`. `CasevacError` covers the
//! layer below that: malformed wire records, invalid coordinates, solver
//! backend failures.

use thiserror::Error;

/// Unified error type for all casevac operations.
#[derive(Error, Debug)]
pub enum CasevacError {
    /// I/O errors (file access, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Data validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Solver/algorithm errors
    #[error("Solver error: {0}")]
    Solver(String),

    /// Generic errors (for wrapping external errors)
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Results using CasevacError.
pub type CasevacResult<T> = Result<T, CasevacError>;

// Conversion from anyhow::Error
impl From<anyhow::Error> for CasevacError {
    fn from(err: anyhow::Error) -> Self {
        CasevacError::Other(err.to_string())
    }
}

// Conversion from string-like types for convenience
impl From<String> for CasevacError {
    fn from(s: String) -> Self {
        CasevacError::Other(s)
    }
}

impl From<&str> for CasevacError {
    fn from(s: &str) -> Self {
        CasevacError::Other(s.to_string())
    }
}

// JSON parsing errors
impl From<serde_json::Error> for CasevacError {
    fn from(err: serde_json::Error) -> Self {
        CasevacError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CasevacError::Solver("deadline expired".into());
        assert!(err.to_string().contains("Solver error"));
        assert!(err.to_string().contains("deadline expired"));
    }

    #[test]
    fn test_validation_display() {
        let err = CasevacError::Validation("latitude out of range".into());
        assert!(err.to_string().contains("Validation error"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: CasevacError = json_err.into();
        assert!(matches!(err, CasevacError::Parse(_)));
    }

    #[test]
    fn test_question_mark_operator() {
        fn inner() -> CasevacResult<()> {
            Err(CasevacError::Validation("test".into()))
        }

        fn outer() -> CasevacResult<()> {
            inner()?;
            Ok(())
        }

        assert!(outer().is_err());
    }
}
