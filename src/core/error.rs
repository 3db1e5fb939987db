/// odbql Error Module
///
/// This module defines the error types for the odbql crate. The native ODBC
/// status code remains the primary result of every driver-facing operation;
/// the types here layer a coarse classification on top for callers that
/// prefer `Result`-shaped APIs over raw status inspection.
use odbc_sys::SqlReturn;
use thiserror::Error;

/// Error type for odbql operations.
///
/// The driver-facing variants carry the raw `SqlReturn` unchanged, so no
/// status information is lost by going through the checked APIs.
#[derive(Error, Debug)]
pub enum OdbqlError {
    /// Environment or connection handle allocation failed at construction
    #[error("Handle allocation failed with status {0:?}")]
    Allocation(SqlReturn),

    /// Connecting to the server failed
    #[error("Connection failed with status {0:?}")]
    Connection(SqlReturn),

    /// Statement allocation, execution or fetching failed
    #[error("Statement failed with status {0:?}")]
    Statement(SqlReturn),

    /// Configuration loading and validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system and I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Type alias for Result to use OdbqlError as the error type.
pub type Result<T> = std::result::Result<T, OdbqlError>;

/// Returns true for `SUCCESS` and `SUCCESS_WITH_INFO`.
///
/// Success-with-info carries driver diagnostics but still produced a usable
/// outcome, so it never aborts an operation.
pub fn succeeded(status: SqlReturn) -> bool {
    status == SqlReturn::SUCCESS || status == SqlReturn::SUCCESS_WITH_INFO
}

/// Coarse classification of the native ODBC status vocabulary.
///
/// Raw statuses stay the primary API; this enum exists for callers that
/// want to branch on the class of an outcome without memorizing the
/// numeric vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    /// Operation completed
    Success,
    /// Operation completed, driver left diagnostic records
    SuccessWithInfo,
    /// Operation failed
    Error,
    /// A handle passed to the driver was invalid or never allocated
    InvalidHandle,
    /// No more data to fetch
    NoData,
    /// Any other status the driver may report (need-data, still-executing)
    Other,
}

impl StatusKind {
    /// Classifies a raw status code.
    pub fn of(status: SqlReturn) -> Self {
        match status {
            SqlReturn::SUCCESS => StatusKind::Success,
            SqlReturn::SUCCESS_WITH_INFO => StatusKind::SuccessWithInfo,
            SqlReturn::ERROR => StatusKind::Error,
            SqlReturn::INVALID_HANDLE => StatusKind::InvalidHandle,
            SqlReturn::NO_DATA => StatusKind::NoData,
            _ => StatusKind::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let conn_err = OdbqlError::Connection(SqlReturn::ERROR);
        assert!(conn_err.to_string().contains("Connection failed"));

        let stmt_err = OdbqlError::Statement(SqlReturn::INVALID_HANDLE);
        assert!(stmt_err.to_string().contains("Statement failed"));

        let config_err = OdbqlError::Config("missing [connection] table".to_string());
        assert!(config_err.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: OdbqlError = io_err.into();
        match err {
            OdbqlError::Io(_) => {}
            _ => panic!("Expected IO error"),
        }
    }

    #[test]
    fn test_succeeded_predicate() {
        assert!(succeeded(SqlReturn::SUCCESS));
        assert!(succeeded(SqlReturn::SUCCESS_WITH_INFO));
        assert!(!succeeded(SqlReturn::ERROR));
        assert!(!succeeded(SqlReturn::INVALID_HANDLE));
        assert!(!succeeded(SqlReturn::NO_DATA));
    }

    #[test]
    fn test_status_classification() {
        assert_eq!(StatusKind::of(SqlReturn::SUCCESS), StatusKind::Success);
        assert_eq!(
            StatusKind::of(SqlReturn::SUCCESS_WITH_INFO),
            StatusKind::SuccessWithInfo
        );
        assert_eq!(StatusKind::of(SqlReturn::ERROR), StatusKind::Error);
        assert_eq!(
            StatusKind::of(SqlReturn::INVALID_HANDLE),
            StatusKind::InvalidHandle
        );
        assert_eq!(StatusKind::of(SqlReturn::NO_DATA), StatusKind::NoData);
        assert_eq!(StatusKind::of(SqlReturn::NEED_DATA), StatusKind::Other);
        assert_eq!(StatusKind::of(SqlReturn::STILL_EXECUTING), StatusKind::Other);
    }
}
