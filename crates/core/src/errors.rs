//! Core error types for the Hearth application.
//!
//! This module defines storage-agnostic error types. Backend-specific errors
//! are converted to these types by the storage layer.

use chrono::ParseError as ChronoParseError;
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the household finance domain.
///
/// Validation errors are raised before any I/O happens; everything coming
/// back from a repository is wrapped as a `Database` or `Repository` error
/// and propagated without retry.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Repository error: {0}")]
    Repository(String),
}

/// Storage-agnostic error type for repository operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish a database connection.
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to build the connection pool or check a connection out of it.
    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(String),

    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// A query or write against the backend failed.
    #[error("Database query failed: {0}")]
    QueryFailed(String),

    /// The requested record was not found.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A unique constraint was violated (e.g., duplicate key).
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Internal/unexpected backend error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Validation errors for user input and untrusted payloads.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Cycle has no positive net cash flow to distribute (net {net_cents} cents)")]
    NonPositiveNet { net_cents: i64 },

    #[error("Allocated {allocated_cents} cents but only {net_cents} cents are available")]
    AllocationExceedsNet {
        allocated_cents: i64,
        net_cents: i64,
    },

    #[error("Submitted net {submitted_cents} cents does not match the cycle net {expected_cents} cents")]
    NetMismatch {
        submitted_cents: i64,
        expected_cents: i64,
    },

    #[error("At least one goal must receive a non-zero allocation")]
    EmptyAllocation,

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Failed to parse date: {0}")]
    DateTimeParse(#[from] ChronoParseError),
}

impl Error {
    /// Returns true when the error was raised locally, before any I/O.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

// === From implementations for common error types ===

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
