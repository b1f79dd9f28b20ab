//! Error types and error code constants for scalaidx.
//!
//! This module provides a unified error type (`IndexError`) for everything
//! that can fail outside a single file's result record, and a stable mapping
//! from each variant to a process exit code.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments or a malformed batch request
//! - `3`: Resolution errors (input file not found)
//! - `4`: Parser errors (the external parser could not run)
//! - `10`: Internal errors (bugs, unexpected state)
//!
//! ## Per-file failures
//!
//! Failures scoped to one source file (unreadable file, syntax error,
//! pathological tree) never abort a batch. The batch layer converts them into
//! a result record carrying only `filename` and `error`.

use std::fmt;
use std::io;

use thiserror::Error;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output and process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad flags, malformed request).
    InvalidArguments = 2,
    /// Resolution errors (input file not found).
    ResolutionError = 3,
    /// The external parser failed to produce a tree.
    ParserError = 4,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for the indexer and its front doors.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// A batch request that does not have the expected shape.
    ///
    /// The message is rendered verbatim so that clients see the same text
    /// regardless of transport.
    #[error("{message}")]
    BadRequest { message: String },

    /// Input file not found.
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// Any other IO failure while reading an input.
    #[error("reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The parser could not be run or returned something unusable.
    #[error("parser error: {message}")]
    Parser { message: String },

    /// The tree nests deeper than the configured walk limit.
    #[error("tree nesting exceeds maximum depth of {max_depth}")]
    TreeTooDeep { max_depth: usize },

    /// Configuration could not be read or parsed.
    #[error("config error: {message}")]
    Config { message: String },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    Internal { message: String },
}

/// Message returned for a batch request without a `filenames` list.
pub const BAD_REQUEST_MESSAGE: &str = "bad request: expected '{ \"filenames\": [LIST OF FILES TO PARSE] }', but filenames list was not present";

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&IndexError> for OutputErrorCode {
    fn from(err: &IndexError) -> Self {
        match err {
            IndexError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            IndexError::BadRequest { .. } => OutputErrorCode::InvalidArguments,
            IndexError::Config { .. } => OutputErrorCode::InvalidArguments,
            IndexError::FileNotFound { .. } => OutputErrorCode::ResolutionError,
            IndexError::Io { .. } => OutputErrorCode::ResolutionError,
            IndexError::Parser { .. } => OutputErrorCode::ParserError,
            IndexError::TreeTooDeep { .. } => OutputErrorCode::InternalError,
            IndexError::Internal { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<IndexError> for OutputErrorCode {
    fn from(err: IndexError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl IndexError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        IndexError::InvalidArguments {
            message: message.into(),
        }
    }

    /// Create the canonical bad request error for a missing `filenames` list.
    pub fn missing_filenames() -> Self {
        IndexError::BadRequest {
            message: BAD_REQUEST_MESSAGE.to_string(),
        }
    }

    /// Create a bad request error with a custom message.
    pub fn bad_request(message: impl Into<String>) -> Self {
        IndexError::BadRequest {
            message: message.into(),
        }
    }

    /// Create a parser error.
    pub fn parser(message: impl Into<String>) -> Self {
        IndexError::Parser {
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        IndexError::Config {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        IndexError::Internal {
            message: message.into(),
        }
    }

    /// Convert an IO error on `path` into an `IndexError`.
    ///
    /// `NotFound` maps to [`IndexError::FileNotFound`]; everything else keeps
    /// the underlying error as its source.
    pub fn io(path: impl Into<String>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            IndexError::FileNotFound { path }
        } else {
            IndexError::Io { path, source }
        }
    }
}

/// Result type for indexer operations.
pub type IndexResult<T> = Result<T, IndexError>;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(OutputErrorCode::InvalidArguments.code(), 2);
        assert_eq!(OutputErrorCode::ResolutionError.code(), 3);
        assert_eq!(OutputErrorCode::ParserError.code(), 4);
        assert_eq!(OutputErrorCode::InternalError.code(), 10);
    }

    #[test]
    fn variants_map_to_codes() {
        let cases = [
            (IndexError::invalid_args("x"), OutputErrorCode::InvalidArguments),
            (IndexError::missing_filenames(), OutputErrorCode::InvalidArguments),
            (IndexError::config("x"), OutputErrorCode::InvalidArguments),
            (
                IndexError::FileNotFound {
                    path: "A.scala".to_string(),
                },
                OutputErrorCode::ResolutionError,
            ),
            (IndexError::parser("boom"), OutputErrorCode::ParserError),
            (
                IndexError::TreeTooDeep { max_depth: 4 },
                OutputErrorCode::InternalError,
            ),
            (IndexError::internal("x"), OutputErrorCode::InternalError),
        ];
        for (err, code) in cases {
            assert_eq!(OutputErrorCode::from(&err), code, "{err}");
        }
    }

    #[test]
    fn bad_request_renders_verbatim() {
        let err = IndexError::missing_filenames();
        assert_eq!(err.to_string(), BAD_REQUEST_MESSAGE);
        assert!(err.to_string().starts_with("bad request: expected"));
    }

    #[test]
    fn io_not_found_becomes_file_not_found() {
        let err = IndexError::io(
            "Missing.scala",
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, IndexError::FileNotFound { .. }));
        assert_eq!(err.to_string(), "file not found: Missing.scala");

        let err = IndexError::io(
            "Locked.scala",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, IndexError::Io { .. }));
        assert!(err.to_string().contains("Locked.scala"));
    }
}
