//! Institution loader: directory information filtered to 4-year sectors.

use std::path::Path;

use crate::error::TransformResult;
use crate::models::{cell_i64, columns, sources, Sector, Table};
use crate::parser::read_source;

/// Keep institutions whose `SECTOR` is public, private nonprofit or
/// private for-profit 4-year. All columns are retained.
pub fn select_institutions(mut table: Table) -> TransformResult<Table> {
    table.require_column(columns::UNITID)?;
    table.require_column(columns::SECTOR)?;

    table.retain(|record| {
        cell_i64(record, columns::SECTOR)
            .and_then(Sector::from_code)
            .is_some()
    });
    Ok(table)
}

/// Read `HD2023.csv` from `raw_dir` and keep the 4-year institutions.
pub fn load_institutions(raw_dir: &Path) -> TransformResult<Table> {
    let parsed = read_source(&raw_dir.join(sources::INSTITUTIONS))?;
    select_institutions(parsed.table)
}
