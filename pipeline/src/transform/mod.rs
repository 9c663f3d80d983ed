//! Transformation stages.
//!
//! - Loader: institutions filtered to 4-year sectors
//! - Join: auxiliary sources left-joined by `UNITID`
//! - Labels: sector and locale labels
//! - Filter: zero-rate artifacts removed
//! - Programs: bachelor's completions per CIP family
//! - Pipeline: the stages wired together

pub mod filter;
pub mod join;
pub mod labels;
pub mod loader;
pub mod pipeline;
pub mod programs;

pub use filter::drop_zero_rates;
pub use join::{
    join_admissions, join_enrollment_demographics, join_graduation_rates, join_pell, join_source,
    join_table, JoinSpec, INSTITUTION_JOINS,
};
pub use labels::add_labels;
pub use loader::{load_institutions, select_institutions};
pub use pipeline::{run_pipeline, PipelineOptions, RunReport, ValidationReport};
pub use programs::{aggregate_programs, build_programs, cip_label, CIP_FAMILIES};
