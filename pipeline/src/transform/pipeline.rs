//! High-level pipeline API: raw extracts in, two CSV tables out.
//!
//! # Example
//!
//! ```rust,ignore
//! use ipeds::{run_pipeline, PipelineOptions};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let report = run_pipeline(&PipelineOptions::default())?;
//!     println!("Wrote {} institutions", report.institutions_written);
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::filter::drop_zero_rates;
use super::join::{join_table, INSTITUTION_JOINS};
use super::labels::add_labels;
use super::loader::select_institutions;
use super::programs::aggregate_programs;
use crate::error::PipelineResult;
use crate::logs::{log_error, log_info, log_info_indent, log_success, log_success_indent, log_warning};
use crate::models::{sources, Table, INSTITUTION_COLUMNS};
use crate::parser::{read_source, ParseResult, SourceInfo};
use crate::validation::{RecordValidator, TableValidation};
use crate::writer::{write_outputs, OutputPaths};

/// Options for a pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOptions {
    /// Directory holding the raw survey extracts
    pub raw_dir: PathBuf,

    /// Directory receiving `institutions.csv` and `programs.csv`
    pub output_dir: PathBuf,

    /// Skip schema validation of the output rows
    pub skip_validation: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("data/raw"),
            output_dir: PathBuf::from("data/output"),
            skip_validation: false,
        }
    }
}

/// Validation outcome for both output tables
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub institutions: TableValidation,
    pub programs: TableValidation,
}

/// Summary of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Every source read, in reading order
    pub sources: Vec<SourceInfo>,

    /// 4-year institutions after the sector filter
    pub institutions_loaded: usize,

    /// Institutions removed for a zero admission or graduation rate
    pub institutions_dropped: usize,

    pub institutions_written: usize,
    pub programs_written: usize,

    /// `None` when validation was skipped
    pub validation: Option<ValidationReport>,

    pub outputs: OutputPaths,
}

/// Institution table and the bookkeeping of building it
struct InstitutionBuild {
    table: Table,
    loaded: usize,
    dropped: usize,
}

/// Run the whole pipeline.
///
/// 1. Load institutions and keep sectors 1-3
/// 2. Join admissions, graduation rates, enrollment and Pell data
/// 3. Add sector and locale labels
/// 4. Drop zero admission/graduation rates
/// 5. Aggregate bachelor's completions per CIP family
/// 6. Validate, then write both tables
///
/// Both tables are built before anything is written, so a failing run
/// leaves no partial output.
pub fn run_pipeline(options: &PipelineOptions) -> PipelineResult<RunReport> {
    let mut read_log = Vec::new();

    let institutions = build_institutions(options, &mut read_log)?;

    log_info("Building programs dataset...");
    let completions = read(options, sources::COMPLETIONS, &mut read_log)?;
    let programs = aggregate_programs(&completions.table)?;
    log_success_indent(format!("{} institution/program-family rows", programs.len()), 1);

    let validation = if options.skip_validation {
        log_info("Validation skipped");
        None
    } else {
        Some(validate_outputs(&institutions.table, &programs)?)
    };

    log_info(format!("Writing outputs to {}...", options.output_dir.display()));
    let outputs = write_outputs(&institutions.table, &programs, &options.output_dir)?;
    log_success(format!("Wrote {} rows to {}", institutions.table.len(), outputs.institutions.display()));
    log_success(format!("Wrote {} rows to {}", programs.len(), outputs.programs.display()));

    Ok(RunReport {
        sources: read_log,
        institutions_loaded: institutions.loaded,
        institutions_dropped: institutions.dropped,
        institutions_written: institutions.table.len(),
        programs_written: programs.len(),
        validation,
        outputs,
    })
}

fn read(options: &PipelineOptions, file: &str, read_log: &mut Vec<SourceInfo>) -> PipelineResult<ParseResult> {
    let parsed = read_source(&options.raw_dir.join(file))?;
    let info = parsed.info();
    log_info_indent(
        format!("{}: {} rows ({})", info.file, info.row_count, info.encoding),
        1,
    );
    read_log.push(info);
    Ok(parsed)
}

fn build_institutions(options: &PipelineOptions, read_log: &mut Vec<SourceInfo>) -> PipelineResult<InstitutionBuild> {
    log_info(format!("Loading institutions from {}...", sources::INSTITUTIONS));
    let hd = read(options, sources::INSTITUTIONS, read_log)?;
    let mut table = select_institutions(hd.table)?;
    let loaded = table.len();
    log_success_indent(format!("{} 4-year institutions", loaded), 1);

    for spec in INSTITUTION_JOINS {
        log_info(format!("Joining {} data...", spec.name));
        let aux = read(options, spec.file, read_log)?;
        table = join_table(table, &aux.table, spec)?;
    }

    log_info("Adding labels...");
    table = add_labels(table)?;

    let dropped = drop_zero_rates(&mut table);
    log_success_indent(
        format!("Filtered out {} institutions with 0% admit or grad rate", dropped),
        1,
    );

    Ok(InstitutionBuild {
        table: table.project(INSTITUTION_COLUMNS),
        loaded,
        dropped,
    })
}

fn validate_outputs(institutions: &Table, programs: &Table) -> PipelineResult<ValidationReport> {
    log_info("Validating output rows...");
    let report = ValidationReport {
        institutions: RecordValidator::institution()?.validate_table(institutions),
        programs: RecordValidator::program()?.validate_table(programs),
    };

    for (name, result) in [("institutions", &report.institutions), ("programs", &report.programs)] {
        if result.is_ok() {
            log_success_indent(format!("All {} {} rows valid", result.valid, name), 1);
        } else {
            log_warning(format!("{} of {} {} rows failed validation", result.invalid, result.valid + result.invalid, name));
            for (row, errors) in result.errors.iter().take(3) {
                log_error(format!("{} row {}: {}", name, row, errors.join(", ")));
            }
        }
    }

    Ok(report)
}
