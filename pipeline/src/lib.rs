//! # ipeds - IPEDS survey extracts to analysis-ready tables
//!
//! Builds two flat tables from the raw IPEDS 2023 extracts: one row per
//! 4-year institution, and one row per institution/CIP-family pair of
//! bachelor's completions.
//!
//! ## Architecture
//!
//! ```text
//! HD2023 ──▶ Loader ──▶ Join ×4 ──▶ Labels ──▶ Zero filter ──┐
//!  (sector 1-3)     (adm, gr, ef, sfa)                       ├──▶ Validate ──▶ CSV
//! C2023_a ──▶ Programs (AWLEVEL 5, per CIP family) ──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ipeds::{run_pipeline, PipelineOptions};
//!
//! let report = run_pipeline(&PipelineOptions::default()).unwrap();
//! println!("{} institutions, {} program rows", report.institutions_written, report.programs_written);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per layer
//! - [`models`] - Table, sector and locale types, source and column names
//! - [`parser`] - CSV reading with encoding fallback
//! - [`transform`] - Loader, joins, labels, filter, programs, pipeline
//! - [`validation`] - Output schema validation
//! - [`writer`] - CSV output
//! - [`logs`] - Progress logging

// Core modules
pub mod error;
pub mod logs;
pub mod models;

// Reading
pub mod parser;

// Transformation
pub mod transform;

// Validation
pub mod validation;

// Output
pub mod writer;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{OutputError, PipelineError, SourceError, TransformError, ValidationError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{LocaleGroup, Record, Sector, Table, INSTITUTION_COLUMNS, PROGRAM_COLUMNS};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{decode_content, parse_bytes, parse_str, read_source, ParseResult, SourceEncoding, SourceInfo};

// =============================================================================
// Re-exports - Stages
// =============================================================================

pub use transform::{
    add_labels, aggregate_programs, build_programs, cip_label, drop_zero_rates, join_admissions,
    join_enrollment_demographics, join_graduation_rates, join_pell, join_source, join_table,
    load_institutions, select_institutions, JoinSpec, CIP_FAMILIES, INSTITUTION_JOINS,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{run_pipeline, PipelineOptions, RunReport, ValidationReport};

// =============================================================================
// Re-exports - Validation and output
// =============================================================================

pub use validation::{RecordValidator, TableValidation};
pub use writer::{write_outputs, write_table, OutputPaths};
