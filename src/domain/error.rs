//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;

/// Domain-specific errors
///
/// These errors represent business rule violations and domain invariant
/// failures. They are independent of the web/infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Rating outside the allowed [1, 5] range
    #[error("Invalid rating: {0}")]
    InvalidRating(#[from] super::rating::RatingError),

    /// A required field was missing or empty
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Rating;

    #[test]
    fn test_invalid_rating_error() {
        let err: DomainError = Rating::new(9).unwrap_err().into();

        assert!(err.to_string().contains("9"));
    }

    #[test]
    fn test_missing_field_error() {
        let err = DomainError::MissingField("content");

        assert!(err.to_string().contains("content"));
    }
}
