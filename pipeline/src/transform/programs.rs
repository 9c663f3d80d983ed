//! Bachelor's completions grouped by CIP family.
//!
//! # Architecture
//!
//! ```text
//! Completions (one row per program/award level)      Programs (one row per family)
//! ┌─────────────────────────────────────────┐        ┌───────────────────────────────┐
//! │ UNITID 1, CIPCODE 11.0101, AWLEVEL 5, 10 │        │ UNITID 1, family 11, 15       │
//! │ UNITID 1, CIPCODE 11.0701, AWLEVEL 5,  5 │   →    │   "Computer Science"          │
//! │ UNITID 1, CIPCODE 11.0701, AWLEVEL 7,  2 │        └───────────────────────────────┘
//! │ UNITID 1, CIPCODE 99,      AWLEVEL 5, 15 │
//! └─────────────────────────────────────────┘
//! ```

use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::error::{SourceError, TransformResult};
use crate::models::{
    cell_f64, cell_i64, cell_text, columns, number_value, sources, Record, Table, PROGRAM_COLUMNS,
};
use crate::parser::read_source;

/// Award level code for a bachelor's degree.
pub const BACHELORS_AWARD_LEVEL: i64 = 5;

/// CIP code of the unclassified / grand total rows.
pub const UNCLASSIFIED_CIP: &str = "99";

/// Label for families missing from [`CIP_FAMILIES`].
pub const OTHER_LABEL: &str = "Other";

/// Two-digit CIP family → display label.
pub static CIP_FAMILIES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("01", "Agriculture"),
        ("03", "Natural Resources"),
        ("04", "Architecture"),
        ("05", "Area/Ethnic Studies"),
        ("09", "Communication"),
        ("10", "Communications Tech"),
        ("11", "Computer Science"),
        ("12", "Personal/Culinary"),
        ("13", "Education"),
        ("14", "Engineering"),
        ("15", "Engineering Tech"),
        ("16", "Foreign Languages"),
        ("19", "Family/Consumer Sciences"),
        ("22", "Legal Professions"),
        ("23", "English"),
        ("24", "Liberal Arts"),
        ("25", "Library Science"),
        ("26", "Biological Sciences"),
        ("27", "Mathematics"),
        ("29", "Military Tech"),
        ("30", "Interdisciplinary"),
        ("31", "Parks/Recreation"),
        ("38", "Philosophy/Religion"),
        ("39", "Theology"),
        ("40", "Physical Sciences"),
        ("41", "Science Tech"),
        ("42", "Psychology"),
        ("43", "Homeland Security"),
        ("44", "Public Administration"),
        ("45", "Social Sciences"),
        ("46", "Construction Trades"),
        ("47", "Mechanic/Repair"),
        ("48", "Precision Production"),
        ("49", "Transportation"),
        ("50", "Visual/Performing Arts"),
        ("51", "Health Professions"),
        ("52", "Business"),
        ("54", "History"),
    ])
});

/// Label for a two-character CIP family, `"Other"` when unknown.
pub fn cip_label(family: &str) -> &'static str {
    CIP_FAMILIES.get(family).copied().unwrap_or(OTHER_LABEL)
}

/// Family code of a bachelor's completion row worth counting, or `None`
/// when the row is filtered out.
fn counted_family(record: &Record) -> Option<String> {
    if cell_i64(record, columns::AWLEVEL) != Some(BACHELORS_AWARD_LEVEL) {
        return None;
    }
    let cip = cell_text(record, columns::CIPCODE)?;
    if cip == UNCLASSIFIED_CIP {
        return None;
    }

    let family: String = cip.chars().take(2).collect();
    if family.chars().count() != 2 || family == UNCLASSIFIED_CIP {
        return None;
    }
    Some(family)
}

/// Sum bachelor's completions per (`UNITID`, CIP family).
///
/// Rows with a non-numeric or negative `CTOTALT` are discarded. Output is
/// sorted by institution, then family.
pub fn aggregate_programs(completions: &Table) -> TransformResult<Table> {
    for column in [columns::UNITID, columns::AWLEVEL, columns::CIPCODE, columns::CTOTALT] {
        completions.require_column(column)?;
    }

    let mut totals: BTreeMap<(i64, String), f64> = BTreeMap::new();

    for (idx, record) in completions.records.iter().enumerate() {
        let Some(family) = counted_family(record) else {
            continue;
        };
        let count = match cell_f64(record, columns::CTOTALT) {
            Some(count) if count >= 0.0 => count,
            _ => continue,
        };
        let unitid = cell_i64(record, columns::UNITID).ok_or_else(|| SourceError::InvalidKey {
            table: completions.name.clone(),
            column: columns::UNITID.to_string(),
            value: cell_text(record, columns::UNITID).unwrap_or_default(),
            line: idx + 2,
        })?;

        *totals.entry((unitid, family)).or_insert(0.0) += count;
    }

    let mut programs = Table::new(
        "programs",
        PROGRAM_COLUMNS.iter().map(|c| c.to_string()).collect(),
    );
    for ((unitid, family), total) in totals {
        let mut record = Record::new();
        record.insert(columns::UNITID.to_string(), Value::from(unitid));
        record.insert(columns::CIP_FAMILY.to_string(), Value::String(family.clone()));
        record.insert(columns::TOTAL_AWARDS.to_string(), number_value(total));
        record.insert(columns::CIP_LABEL.to_string(), Value::String(cip_label(&family).to_string()));
        programs.records.push(record);
    }

    Ok(programs)
}

/// Read `C2023_a.csv` from `raw_dir` and aggregate it.
pub fn build_programs(raw_dir: &Path) -> TransformResult<Table> {
    let parsed = read_source(&raw_dir.join(sources::COMPLETIONS))?;
    aggregate_programs(&parsed.table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransformError;
    use crate::parser::parse_str;
    use serde_json::json;

    fn completions(csv: &str) -> Table {
        parse_str(csv, Path::new("C2023_a.csv")).unwrap()
    }

    #[test]
    fn test_lookup_has_38_families() {
        assert_eq!(CIP_FAMILIES.len(), 38);
        assert!(CIP_FAMILIES.keys().all(|k| k.len() == 2));
    }

    #[test]
    fn test_cip_label_fallback() {
        assert_eq!(cip_label("11"), "Computer Science");
        assert_eq!(cip_label("52"), "Business");
        assert_eq!(cip_label("60"), "Other");
    }

    #[test]
    fn test_computer_science_family() {
        let table = completions(
            "UNITID,CIPCODE,AWLEVEL,CTOTALT\n\
             1,1105,5,10\n\
             1,1199,5,5\n\
             1,9901,5,3",
        );

        let programs = aggregate_programs(&table).unwrap();

        assert_eq!(programs.len(), 1);
        let row = &programs.records[0];
        assert_eq!(row["UNITID"], json!(1));
        assert_eq!(row["cip_family"], "11");
        assert_eq!(row["total_awards"], json!(15));
        assert_eq!(row["cip_label"], "Computer Science");
    }

    #[test]
    fn test_filters_award_level_and_sentinel() {
        let table = completions(
            "UNITID,CIPCODE,AWLEVEL,CTOTALT\n\
             2,52.0201,5,40\n\
             2,52.0201,7,12\n\
             2,99,5,100\n\
             2,52.0301,5,.\n\
             2,52.0801,5,\n\
             2,52.1401,5,-4\n\
             2,7,5,9\n\
             2,,5,9",
        );

        let programs = aggregate_programs(&table).unwrap();

        assert_eq!(programs.len(), 1);
        assert_eq!(programs.records[0]["cip_family"], "52");
        assert_eq!(programs.records[0]["total_awards"], json!(40));
    }

    #[test]
    fn test_grouped_and_sorted() {
        let table = completions(
            "UNITID,CIPCODE,AWLEVEL,CTOTALT\n\
             20,26.0101,5,4\n\
             3,60.0101,5,2\n\
             20,14.0901,5,7\n\
             20,26.0202,5,1",
        );

        let programs = aggregate_programs(&table).unwrap();
        let keys: Vec<(Value, Value)> = programs
            .records
            .iter()
            .map(|r| (r["UNITID"].clone(), r["cip_family"].clone()))
            .collect();

        assert_eq!(
            keys,
            vec![
                (json!(3), json!("60")),
                (json!(20), json!("14")),
                (json!(20), json!("26")),
            ]
        );
        assert_eq!(programs.records[0]["cip_label"], "Other");
        assert_eq!(programs.records[2]["total_awards"], json!(5));
        assert_eq!(programs.headers, vec!["UNITID", "cip_family", "total_awards", "cip_label"]);
    }

    #[test]
    fn test_missing_count_column() {
        let table = completions("UNITID,CIPCODE,AWLEVEL\n1,11.0101,5");
        assert!(matches!(
            aggregate_programs(&table),
            Err(TransformError::Source(SourceError::MissingColumn { .. }))
        ));
    }
}
