//! Error types for the ARCAD conversion pipeline.
//!
//! This module defines the layered error types of the crate:
//!
//! - [`ParseError`] - Decoding a dataset payload (CSV or workbook)
//! - [`LoadError`] - Obtaining a payload from the archive or the disk
//! - [`ConfigError`] - Invalid configuration values
//! - [`PipelineError`] - Top-level orchestration errors
//! - [`WriteError`] - Persisting output tables and the report
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.
//!
//! Schema drift and malformed dates are not part of this
//! hierarchy: they degrade into [`crate::transform::Observation`]s and
//! empty strings instead.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::DatasetKind;

// =============================================================================
// Parsing Errors
// =============================================================================

/// Errors while decoding a dataset payload.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Payload has no content at all.
    #[error("Dataset file is empty")]
    EmptyFile,

    /// No header row found.
    #[error("No headers found in dataset")]
    NoHeaders,

    /// Malformed CSV record.
    #[error("Line {line}: {message}")]
    Csv { line: u64, message: String },

    /// Workbook could not be opened or read.
    #[error("Invalid workbook: {0}")]
    Workbook(String),

    /// Workbook has no worksheet to read.
    #[error("Workbook contains no worksheet")]
    NoWorksheet,
}

// =============================================================================
// Loading Errors
// =============================================================================

/// Errors while obtaining a raw dataset.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Failed to read a local file.
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Remote archive answered with a non-success status.
    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    /// HTTP request failed (after retries).
    #[error("HTTP request failed for {url}: {message}")]
    Request { url: String, message: String },

    /// Payload could not be decoded.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while resolving the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable holds a value that cannot be used.
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },

    /// Unknown input format.
    #[error("Unsupported input format '{0}' (expected xlsx or csv)")]
    UnknownFormat(String),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the error type returned by [`crate::transform::pipeline::run`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A dataset the pipeline cannot do without was not supplied.
    #[error("The {0} dataset is required but was not available")]
    MissingDataset(DatasetKind),
}

// =============================================================================
// Output Errors
// =============================================================================

/// Errors while persisting outputs.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Filesystem error.
    #[error("Cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV serialization error.
    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for configuration resolution.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for output operations.
pub type WriteResult<T> = Result<T, WriteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // ParseError -> LoadError
        let load_err: LoadError = ParseError::EmptyFile.into();
        assert!(load_err.to_string().contains("empty"));
        assert!(matches!(load_err, LoadError::Parse(ParseError::EmptyFile)));

        let status_err = LoadError::HttpStatus {
            url: "https://example.org/x.xlsx".into(),
            status: 404,
        };
        assert!(status_err.to_string().contains("404"));
    }

    #[test]
    fn test_missing_dataset_names_the_dataset() {
        let err = PipelineError::MissingDataset(DatasetKind::Objects);
        let msg = err.to_string();
        assert!(msg.contains("objects"));
        assert!(msg.contains("required"));
    }

    #[test]
    fn test_csv_error_format() {
        let err = ParseError::Csv {
            line: 5,
            message: "unequal lengths".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Line 5"));
        assert!(msg.contains("unequal lengths"));
    }
}
