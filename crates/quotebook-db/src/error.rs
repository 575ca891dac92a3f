//! # Database Error Types
//!
//! Error types for database operations and for the document coordinator.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError ← Adds context and categorization                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DocumentError ← Coordinator taxonomy, after rollback                  │
//! │       │          Validation | NotFound | Conflict |                    │
//! │       │          BusinessRule | Storage                                │
//! │       ▼                                                                 │
//! │  HTTP layer maps ErrorKind → status code                               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use quotebook_core::{CoreError, ValidationError};
use serde::Serialize;
use thiserror::Error;

// =============================================================================
// DbError
// =============================================================================

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Duplicate document number within a prefix
    /// - Duplicate line ordinal within a document
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Commit or rollback failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// A stored value could not be decoded (e.g. a decimal column).
    #[error("Corrupt value in {column}: '{value}'")]
    CorruptData { column: String, value: String },

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Whether this is the `UNIQUE (prefix, number)` constraint on documents.
    pub fn is_duplicate_number(&self) -> bool {
        matches!(self, DbError::UniqueViolation { field, .. } if field.contains("documents.number"))
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite constraint messages:
                // "UNIQUE constraint failed: documents.prefix, documents.number"
                // "FOREIGN KEY constraint failed"
                if let Some(field) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    DbError::UniqueViolation {
                        field: field.to_string(),
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// DocumentError
// =============================================================================

/// Errors returned by the document coordinator.
///
/// Every variant is scoped to a single request; none is fatal to the
/// process. Storage failures have already been rolled back when the caller
/// sees them.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Malformed or missing fields; detected before any transaction opened.
    #[error("Invalid document: {0}")]
    Validation(#[from] ValidationError),

    /// No document with this identifier.
    #[error("Document not found: {id}")]
    NotFound { id: String },

    /// The document number is already taken (lost a race, or a supplied
    /// number collided). Retrying the whole create allocates a fresh number.
    #[error("Document number {number} is already taken")]
    Conflict { number: String },

    /// A business rule refused the operation (status, locked document,
    /// exhausted sequence, amount overflow).
    #[error("{0}")]
    BusinessRule(CoreError),

    /// Connection, timeout or unexpected constraint failure.
    #[error("Storage failure: {0}")]
    Storage(#[from] DbError),
}

impl From<CoreError> for DocumentError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => DocumentError::Validation(e),
            other => DocumentError::BusinessRule(other),
        }
    }
}

/// Machine-readable category of a [`DocumentError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Input validation failed (400)
    Validation,
    /// Resource not found (404)
    NotFound,
    /// Duplicate number, retry the create (409)
    Conflict,
    /// Business rule refused the operation (422)
    BusinessRule,
    /// Storage failure (500)
    Storage,
}

impl DocumentError {
    pub fn not_found(id: impl Into<String>) -> Self {
        DocumentError::NotFound { id: id.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DocumentError::Validation(_) => ErrorKind::Validation,
            DocumentError::NotFound { .. } => ErrorKind::NotFound,
            DocumentError::Conflict { .. } => ErrorKind::Conflict,
            DocumentError::BusinessRule(_) => ErrorKind::BusinessRule,
            DocumentError::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Message safe to show an end user. Storage details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            DocumentError::Storage(_) => "Document storage operation failed".to_string(),
            other => other.to_string(),
        }
    }

    /// Whether retrying the whole operation can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DocumentError::Conflict { .. } | DocumentError::Storage(DbError::PoolExhausted)
        )
    }
}

/// Result type for coordinator operations.
pub type DocumentResult<T> = Result<T, DocumentError>;

// =============================================================================
// Unit Tests
// =============================================================================
