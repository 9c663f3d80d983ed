//! Error types for the IPEDS dataset pipeline.
//!
//! One error type per layer:
//!
//! - [`SourceError`] - reading, decoding and parsing a source table
//! - [`TransformError`] - a pipeline stage (load, join, aggregate) failed
//! - [`ValidationError`] - output schema problems
//! - [`OutputError`] - writing the output tables
//! - [`PipelineError`] - top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;

use thiserror::Error;

// =============================================================================
// Source Errors
// =============================================================================

/// Errors while reading a source table.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Failed to read file.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Content could not be decoded with any supported encoding.
    #[error("Cannot decode {path} as {tried}")]
    Decode { path: PathBuf, tried: String },

    /// Invalid CSV structure.
    #[error("Invalid CSV in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Empty file.
    #[error("Source file {0} is empty")]
    EmptyFile(PathBuf),

    /// Expected column absent from the header row.
    #[error("Missing column '{column}' in {table}")]
    MissingColumn { table: String, column: String },

    /// Identifier cell that is not an integer.
    #[error("Invalid {column} value '{value}' in {table} (line {line})")]
    InvalidKey {
        table: String,
        column: String,
        value: String,
        line: usize,
    },

    /// Same identifier appears twice in a table that must be unique.
    #[error("Duplicate {column} {value} in {table}")]
    DuplicateKey {
        table: String,
        column: String,
        value: i64,
    },
}

// =============================================================================
// Transformation Errors
// =============================================================================

/// Errors raised by a pipeline stage.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A source table could not be used.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// A stage was given a table without a column it needs.
    #[error("Stage '{stage}' requires column '{column}'")]
    MissingColumn { stage: String, column: String },
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors from output schema validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Embedded schema could not be loaded.
    #[error("Invalid schema '{name}': {message}")]
    InvalidSchema { name: String, message: String },
}

// =============================================================================
// Output Errors
// =============================================================================

/// Errors while writing an output table.
#[derive(Debug, Error)]
pub enum OutputError {
    /// Output directory or file could not be created.
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV serialization failed.
    #[error("Failed to serialize {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the error type returned by [`crate::transform::pipeline::run_pipeline`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Source table error.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Stage error.
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// Validation setup error.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Output error.
    #[error("Output error: {0}")]
    Output(#[from] OutputError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for stage operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Result type for output operations.
pub type OutputResult<T> = Result<T, OutputError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
