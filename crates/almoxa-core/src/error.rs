//! # Error Types
//!
//! Validation error types for almoxa-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  almoxa-core errors (this file)                                        │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  almoxa-db errors (separate crate)                                     │
//! │  └── DbError          - Storage taxonomy (NotFound, DuplicateItem,     │
//! │                         CodeConflict, AlreadyDeleted, ...)             │
//! │                                                                         │
//! │  Flow: ValidationError → DbError → bridge → UI message                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field name, limits)
//! 3. Errors are enum variants, never String
//! 4. A ValidationError must be raised BEFORE any SQL runs

use thiserror::Error;

/// Input validation errors.
///
/// These errors occur when caller-supplied data fails a precondition.
/// They are raised before the storage layer is touched, so a rejected
/// input never opens a transaction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or blank after trimming.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Numeric value must not be negative.
    ///
    /// ## When This Occurs
    /// - Negative opening quantity or minimum threshold
    /// - Negative unit cost on a movement
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Numeric value must be strictly positive.
    ///
    /// ## When This Occurs
    /// - Zero-quantity material issue on a work order
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., bad characters in a username).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates a Required error for the given field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Creates a MustBeNonNegative error for the given field.
    pub fn negative(field: impl Into<String>) -> Self {
        ValidationError::MustBeNonNegative {
            field: field.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_are_human_readable() {
        let err = ValidationError::required("description");
        assert_eq!(err.to_string(), "description is required");

        let err = ValidationError::negative("opening_quantity");
        assert_eq!(err.to_string(), "opening_quantity must not be negative");

        let err = ValidationError::TooLong {
            field: "description".to_string(),
            max: 200,
        };
        assert_eq!(err.to_string(), "description must be at most 200 characters");
    }
}
