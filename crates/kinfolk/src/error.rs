//! Error types for kinfolk.
//!
//! This module defines all error types used throughout the kinfolk crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

use crate::person::ValidationError;

/// The main error type for kinfolk operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Input Errors ===
    /// A person record failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Submitted form data could not be parsed.
    #[error("invalid form data: {0}")]
    Form(String),

    // === Lookup Errors ===
    /// No person exists with the given id.
    #[error("person {id} not found")]
    NotFound {
        /// The id that was looked up.
        id: i64,
    },

    /// A person id in a request could not be parsed.
    #[error("invalid person id: {0}")]
    InvalidId(String),

    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Upload Errors ===
    /// Failed to save an uploaded photo.
    #[error("failed to save upload to {path}: {source}")]
    Upload {
        /// Destination path of the upload.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for kinfolk operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a new form error.
    #[must_use]
    pub fn form(message: impl Into<String>) -> Self {
        Self::Form(message.into())
    }

    /// Check if this error is a lookup miss.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error was caused by bad user input.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Form(_) | Self::InvalidId(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::NotFound { id: 7 };
        assert_eq!(err.to_string(), "person 7 not found");

        let err = Error::form("missing boundary");
        assert_eq!(err.to_string(), "invalid form data: missing boundary");
    }

    #[test]
    fn test_validation_error_is_transparent() {
        let err: Error = ValidationError::InvalidGender.into();
        assert_eq!(err.to_string(), "invalid gender");
        assert!(err.is_validation());
    }

    #[test]
    fn test_error_is_not_found() {
        assert!(Error::NotFound { id: 1 }.is_not_found());
        assert!(!Error::internal("x").is_not_found());
    }

    #[test]
    fn test_invalid_id_is_validation() {
        let err = Error::InvalidId("abc".to_string());
        assert!(err.is_validation());
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn test_internal_error() {
        let err = Error::internal("something went wrong");
        assert_eq!(err.to_string(), "internal error: something went wrong");
    }

    #[test]
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::DatabaseQuery(_)));
        }
    }

    #[test]
    fn test_upload_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::Upload {
            path: PathBuf::from("uploads/1700000000_me.png"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("uploads/1700000000_me.png"));
        assert!(msg.contains("access denied"));
    }

    #[test]
    fn test_database_migration_error_display() {
        let err = Error::DatabaseMigration {
            message: "version mismatch".to_string(),
        };
        assert!(err.to_string().contains("version mismatch"));
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "page_size must be greater than 0".to_string(),
        };
        assert!(err.to_string().contains("page_size"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }
}
