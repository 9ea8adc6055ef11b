//! Error handling for ctc
//!
//! Library operations return [`CtcError`] so callers can tell a rejected
//! manual entry from a rejected file; the binary wraps them in anyhow for
//! context chaining.

use thiserror::Error;

/// Core error types for tax and conversion operations
#[derive(Error, Debug)]
pub enum CtcError {
    /// A required field of a single manual entry is missing or malformed
    #[error("validation error: {0}")]
    ValidationError(String),

    /// The whole input was rejected (empty file, no data rows, missing columns)
    #[error("format error: {0}")]
    FormatError(String),

    #[error("config error: {0}")]
    ConfigError(String),
}

/// Result type alias for application-level operations
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_formatting_is_readable() {
        let err = CtcError::FormatError("CSV file is empty or has no data rows".to_string());
        assert_eq!(
            err.to_string(),
            "format error: CSV file is empty or has no data rows"
        );
    }

    #[test]
    fn test_anyhow_context_chains_errors() {
        use anyhow::Context;
        let result: Result<()> = Err(CtcError::ValidationError("amount".to_string()))
            .context("failed to calculate tax");
        match result {
            Err(e) => {
                assert!(e.to_string().contains("failed to calculate tax"));
                let debug_msg = format!("{:?}", e);
                assert!(debug_msg.contains("validation error: amount"));
                assert!(matches!(
                    e.downcast_ref::<CtcError>(),
                    Some(CtcError::ValidationError(_))
                ));
            }
            Ok(_) => panic!("expected error"),
        }
    }

    #[test]
    fn test_error_variants() {
        let validation = CtcError::ValidationError("test".to_string());
        assert!(validation.to_string().starts_with("validation error"));

        let format = CtcError::FormatError("test".to_string());
        assert!(format.to_string().starts_with("format error"));

        let config = CtcError::ConfigError("test".to_string());
        assert!(config.to_string().starts_with("config error"));
    }
}
