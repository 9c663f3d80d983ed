//! CSV output of the final tables.

use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::error::{OutputError, OutputResult};
use crate::models::Table;

pub const INSTITUTIONS_FILE: &str = "institutions.csv";
pub const PROGRAMS_FILE: &str = "programs.csv";

/// Where a run wrote its tables.
#[derive(Debug, Clone, Serialize)]
pub struct OutputPaths {
    pub institutions: PathBuf,
    pub programs: PathBuf,
}

/// Text form of a cell: missing values are empty fields.
pub fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Write `table` as CSV, header row first, columns in header order.
pub fn write_table(table: &Table, path: &Path) -> OutputResult<()> {
    let csv_error = |source| OutputError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(csv_error)?;
    writer.write_record(&table.headers).map_err(csv_error)?;

    for record in &table.records {
        let row = table
            .headers
            .iter()
            .map(|h| record.get(h).map(render_cell).unwrap_or_default());
        writer.write_record(row).map_err(csv_error)?;
    }

    writer.flush().map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Create `output_dir` if needed and write both tables into it.
pub fn write_outputs(institutions: &Table, programs: &Table, output_dir: &Path) -> OutputResult<OutputPaths> {
    std::fs::create_dir_all(output_dir).map_err(|source| OutputError::Io {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let paths = OutputPaths {
        institutions: output_dir.join(INSTITUTIONS_FILE),
        programs: output_dir.join(PROGRAMS_FILE),
    };
    write_table(institutions, &paths.institutions)?;
    write_table(programs, &paths.programs)?;
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_cell() {
        assert_eq!(render_cell(&Value::Null), "");
        assert_eq!(render_cell(&json!("Boston")), "Boston");
        assert_eq!(render_cell(&json!(15)), "15");
        assert_eq!(render_cell(&json!(67.5)), "67.5");
    }

    #[test]
    fn test_write_table_quotes_and_blanks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut table = Table::new("t", vec!["UNITID".into(), "INSTNM".into(), "pct_pell".into()]);
        table.records.push(
            json!({ "UNITID": "1", "INSTNM": "Saint Mary's College, Notre Dame", "pct_pell": null })
                .as_object()
                .cloned()
                .unwrap(),
        );

        write_table(&table, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "UNITID,INSTNM,pct_pell\n1,\"Saint Mary's College, Notre Dame\",\n");
    }

    #[test]
    fn test_write_outputs_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let output_dir = dir.path().join("nested").join("output");
        let table = Table::new("t", vec!["a".into()]);

        let paths = write_outputs(&table, &table, &output_dir).unwrap();

        assert!(paths.institutions.ends_with("institutions.csv"));
        assert!(paths.programs.exists());
    }
}
