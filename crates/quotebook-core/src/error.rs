//! # Error Types
//!
//! Domain-specific error types for quotebook-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  quotebook-core errors (this file)                                     │
//! │  ├── CoreError        - Business rule failures                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  quotebook-db errors (separate crate)                                  │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── DocumentError    - What the coordinator hands to callers          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DocumentError → HTTP layer        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (number, status, ...)
//! 3. Errors are enum variants, never String

use thiserror::Error;

use crate::types::DocumentStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The requested status change is not allowed by the lifecycle.
    ///
    /// ## When This Occurs
    /// - Sending a document that is already validated
    /// - Validating a draft that was never sent
    /// - Any transition out of Validated, Rejected or Expired
    #[error("Cannot move document from {from:?} to {to:?}")]
    InvalidTransition {
        from: DocumentStatus,
        to: DocumentStatus,
    },

    /// The document is in a terminal status and can no longer be edited.
    #[error("Document {number} is {status:?} and can no longer be modified")]
    DocumentLocked {
        number: String,
        status: DocumentStatus,
    },

    /// Every sequence number for this prefix and year has been used.
    #[error("No sequence numbers left for {prefix}{year}")]
    SequenceExhausted { prefix: String, year: i32 },

    /// Decimal arithmetic left the representable range.
    #[error("Amount overflow while computing {context}")]
    AmountOverflow { context: &'static str },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when a request doesn't meet requirements.
/// They are raised before any transaction is opened.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: String,
        min: String,
        max: String,
    },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g., invalid UUID, bad prefix).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Too many entries in a collection.
    #[error("{field} cannot have more than {max} entries")]
    TooMany { field: String, max: usize },

    /// Error inside a specific line item (1-based position).
    #[error("line {position}: {source}")]
    Line {
        position: usize,
        #[source]
        source: Box<ValidationError>,
    },
}

impl ValidationError {
    /// Wraps this error with the 1-based position of the offending line.
    pub fn at_line(self, position: usize) -> Self {
        ValidationError::Line {
            position,
            source: Box::new(self),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
