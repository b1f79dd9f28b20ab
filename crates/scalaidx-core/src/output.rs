//! JSON output types for scalaidx.
//!
//! This module defines the records that leave the indexer:
//! - [`FileSummary`]: the per-file symbol summary
//! - [`ParseRequest`] / [`ParseResponse`]: the batch request and its answer
//! - [`ErrorResponse`]: what the CLI prints when a command fails
//!
//! ## Omission rules
//!
//! `filename` is always present. Every collection is omitted when empty, so a
//! failed file serializes as `{"filename": ..., "error": ...}` and nothing
//! else. List fields are emitted sorted.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Write};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{IndexError, IndexResult, OutputErrorCode};

// ============================================================================
// Per-file Summary
// ============================================================================

/// Symbol summary for one source file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSummary {
    /// Path of the file as given by the caller.
    pub filename: String,
    /// Present only when the file could not be read, parsed or walked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Pretty-printed parse tree, only when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub traits: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub objects: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vals: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<String>,
    /// `"<kind> <qualified name>"` to supertypes, in declaration order.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extends: BTreeMap<String, Vec<String>>,
}

impl FileSummary {
    /// Create an empty summary for `filename`.
    pub fn new(filename: impl Into<String>) -> Self {
        FileSummary {
            filename: filename.into(),
            ..Default::default()
        }
    }

    /// Create a summary that carries only `filename` and `error`.
    pub fn failed(filename: impl Into<String>, error: impl Into<String>) -> Self {
        FileSummary {
            filename: filename.into(),
            error: Some(error.into()),
            ..Default::default()
        }
    }

    /// Whether this summary records a failure.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Flatten a set into a sorted list.
pub fn sorted_list(set: BTreeSet<String>) -> Vec<String> {
    set.into_iter().collect()
}

// ============================================================================
// Batch Request / Response
// ============================================================================

/// A batch of files to index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseRequest {
    pub filenames: Vec<String>,
    #[serde(default)]
    pub want_parse_tree: bool,
}

impl ParseRequest {
    /// Create a request for `filenames` without parse trees.
    pub fn new(filenames: Vec<String>) -> Self {
        ParseRequest {
            filenames,
            want_parse_tree: false,
        }
    }

    /// Parse a request from JSON text.
    ///
    /// Anything that is not an object with a `filenames` array of strings is
    /// rejected with the canonical bad request message.
    pub fn from_json(text: &str) -> IndexResult<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| IndexError::bad_request(format!("bad request: {}", e)))?;
        Self::from_value(&value)
    }

    /// Validate an already-decoded request.
    pub fn from_value(value: &Value) -> IndexResult<Self> {
        let filenames = value
            .get("filenames")
            .and_then(Value::as_array)
            .ok_or_else(IndexError::missing_filenames)?;
        let filenames = filenames
            .iter()
            .map(|v| v.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(IndexError::missing_filenames)?;
        let want_parse_tree = value
            .get("wantParseTree")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        Ok(ParseRequest {
            filenames,
            want_parse_tree,
        })
    }
}

/// The answer to a [`ParseRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResponse {
    /// One summary per requested file, in request order.
    pub files: Vec<FileSummary>,
    /// Wall-clock time spent on the whole batch.
    pub elapsed_millis: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ParseResponse {
    pub fn new(files: Vec<FileSummary>, elapsed_millis: u64) -> Self {
        ParseResponse {
            files,
            elapsed_millis,
            error: None,
        }
    }

    /// A response that carries only an error message.
    pub fn failed(error: impl Into<String>) -> Self {
        ParseResponse {
            files: Vec::new(),
            elapsed_millis: 0,
            error: Some(error.into()),
        }
    }
}

// ============================================================================
// Error Response
// ============================================================================

/// Error information included in an [`ErrorResponse`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code (also the process exit status).
    pub code: u8,
    /// Human-readable message.
    pub message: String,
}

impl ErrorInfo {
    pub fn from_error(err: &IndexError) -> Self {
        ErrorInfo {
            code: OutputErrorCode::from(err).code(),
            message: err.to_string(),
        }
    }
}

/// Printed on stdout when a CLI command fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always "error".
    pub status: String,
    pub error: ErrorInfo,
}

impl ErrorResponse {
    pub fn from_error(err: &IndexError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

// ============================================================================
// Emission
// ============================================================================

/// Emit a response as pretty JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

/// Emit a response as compact JSON (single line) to a writer.
pub fn emit_response_compact<T: Serialize>(
    response: &T,
    writer: &mut impl Write,
) -> io::Result<()> {
    let json = serde_json::to_string(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

// ============================================================================
// Tests
// ============================================================================
