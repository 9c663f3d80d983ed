//! Domain models for the IPEDS dataset pipeline.
//!
//! - [`Table`] - ordered headers plus JSON-object records
//! - [`Sector`] - institution control (public, private nonprofit, for-profit)
//! - [`LocaleGroup`] - urbanicity bucket derived from the locale code
//! - [`sources`] - fixed source file names
//! - [`columns`] - column names shared between stages
//!
//! Cells are `serde_json::Value`s: `Null` for a missing value, `String`
//! for raw source text and `Number` for coerced metrics.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::{SourceError, SourceResult};

/// A single row, keyed by column name.
pub type Record = Map<String, Value>;

// =============================================================================
// Source files and columns
// =============================================================================

/// File names of the survey extracts, relative to the raw data directory.
pub mod sources {
    /// Institutional characteristics (directory information).
    pub const INSTITUTIONS: &str = "HD2023.csv";
    /// Admissions derived variables.
    pub const ADMISSIONS: &str = "drvadm2023.csv";
    /// Graduation rates derived variables.
    pub const GRADUATION: &str = "drvgr2023.csv";
    /// Fall enrollment derived variables.
    pub const ENROLLMENT: &str = "drvef2023.csv";
    /// Student financial aid.
    pub const FINANCIAL_AID: &str = "sfa2223.csv";
    /// Completions by program and award level.
    pub const COMPLETIONS: &str = "C2023_a.csv";
}

/// Column names referenced by more than one stage.
pub mod columns {
    pub const UNITID: &str = "UNITID";
    pub const SECTOR: &str = "SECTOR";
    pub const LOCALE: &str = "LOCALE";
    pub const SECTOR_LABEL: &str = "sector_label";
    pub const LOCALE_GROUP: &str = "locale_group";
    pub const ADMISSION_RATE: &str = "admission_rate";
    pub const GRAD_RATE_6YR: &str = "grad_rate_6yr";

    pub const AWLEVEL: &str = "AWLEVEL";
    pub const CIPCODE: &str = "CIPCODE";
    pub const CTOTALT: &str = "CTOTALT";
    pub const CIP_FAMILY: &str = "cip_family";
    pub const TOTAL_AWARDS: &str = "total_awards";
    pub const CIP_LABEL: &str = "cip_label";
}

/// Columns of `institutions.csv`, in output order.
pub const INSTITUTION_COLUMNS: &[&str] = &[
    "UNITID", "INSTNM", "CITY", "STABBR", "SECTOR", "sector_label",
    "LOCALE", "locale_group", "C18BASIC", "INSTSIZE", "CONTROL", "HBCU",
    "LONGITUD", "LATITUDE", "COUNTYCD",
    "admission_rate", "grad_rate_6yr",
    "enrollment_total", "enrollment_ug",
    "pct_women", "pct_white", "pct_black", "pct_hispanic",
    "pct_asian", "pct_aian", "pct_nhpi", "pct_two_or_more",
    "pct_unknown", "pct_nonresident", "pct_pell",
];

/// Columns of `programs.csv`, in output order.
pub const PROGRAM_COLUMNS: &[&str] = &[
    columns::UNITID,
    columns::CIP_FAMILY,
    columns::TOTAL_AWARDS,
    columns::CIP_LABEL,
];

// =============================================================================
// Table
// =============================================================================

/// An in-memory table: ordered headers and one JSON object per row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// Name used in error messages (usually the source file name).
    pub name: String,
    /// Column names in order.
    pub headers: Vec<String>,
    /// Rows.
    pub records: Vec<Record>,
}

impl Table {
    pub fn new(name: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            headers,
            records: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    /// Fail with [`SourceError::MissingColumn`] unless `column` is present.
    pub fn require_column(&self, column: &str) -> SourceResult<()> {
        if self.has_column(column) {
            Ok(())
        } else {
            Err(SourceError::MissingColumn {
                table: self.name.clone(),
                column: column.to_string(),
            })
        }
    }

    /// Append a header unless it already exists.
    pub fn add_column(&mut self, column: &str) {
        if !self.has_column(column) {
            self.headers.push(column.to_string());
        }
    }

    /// Keep the records matching `keep`, returning how many were removed.
    pub fn retain<F>(&mut self, keep: F) -> usize
    where
        F: FnMut(&Record) -> bool,
    {
        let before = self.records.len();
        self.records.retain(keep);
        before - self.records.len()
    }

    /// Copy of this table restricted to `columns`, in that order.
    ///
    /// Columns not present in the table are skipped.
    pub fn project(&self, columns: &[&str]) -> Table {
        let headers: Vec<String> = columns
            .iter()
            .filter(|c| self.has_column(c))
            .map(|c| c.to_string())
            .collect();

        let records: Vec<Record> = self
            .records
            .iter()
            .map(|record| {
                headers
                    .iter()
                    .map(|h| (h.clone(), record.get(h).cloned().unwrap_or(Value::Null)))
                    .collect::<Record>()
            })
            .collect();

        Table {
            name: self.name.clone(),
            headers,
            records,
        }
    }
}

// =============================================================================
// Cell access
// =============================================================================

/// Trimmed text of a cell; `None` for missing or empty cells.
pub fn cell_text(record: &Record, column: &str) -> Option<String> {
    match record.get(column)? {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Numeric value of a cell, parsing text cells.
pub fn cell_f64(record: &Record, column: &str) -> Option<f64> {
    match coerce_numeric(record.get(column)?) {
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Integer value of a cell. Integral floats such as `"5.0"` are accepted.
pub fn cell_i64(record: &Record, column: &str) -> Option<i64> {
    let value = cell_f64(record, column)?;
    if value.fract() == 0.0 && value >= i64::MIN as f64 && value <= i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

/// Coerce a cell to a number, turning anything non-numeric into `Null`.
///
/// Integer tokens stay integers; other finite decimals become floats.
/// Never fails.
pub fn coerce_numeric(value: &Value) -> Value {
    match value {
        Value::Number(_) => value.clone(),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                return Value::from(i);
            }
            s.parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null)
        }
        _ => Value::Null,
    }
}

/// Numeric cell for a computed quantity: whole values are written as integers.
pub fn number_value(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Value::from(value as i64)
    } else {
        Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null)
    }
}

// =============================================================================
// Sector
// =============================================================================

/// Control of a 4-year (or higher) institution, from the `SECTOR` code.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Sector {
    /// Sector 1
    Public,
    /// Sector 2
    PrivateNonprofit,
    /// Sector 3
    PrivateForProfit,
}

impl Sector {
    /// Parse from the numeric sector code. Codes other than 1-3 are not 4-year sectors.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Public),
            2 => Some(Self::PrivateNonprofit),
            3 => Some(Self::PrivateForProfit),
            _ => None,
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            Self::Public => 1,
            Self::PrivateNonprofit => 2,
            Self::PrivateForProfit => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Public => "Public",
            Self::PrivateNonprofit => "Private nonprofit",
            Self::PrivateForProfit => "Private for-profit",
        }
    }
}

// =============================================================================
// Locale
// =============================================================================

/// Urbanicity bucket: the tens digit of the locale code.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LocaleGroup {
    City,
    Suburb,
    Town,
    Rural,
    Unknown,
}

impl LocaleGroup {
    /// Bucket a locale code such as `21` (suburb, large). Missing codes are `Unknown`.
    pub fn from_code(code: Option<i64>) -> Self {
        match code.map(|c| c.div_euclid(10)) {
            Some(1) => Self::City,
            Some(2) => Self::Suburb,
            Some(3) => Self::Town,
            Some(4) => Self::Rural,
            _ => Self::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::City => "City",
            Self::Suburb => "Suburb",
            Self::Town => "Town",
            Self::Rural => "Rural",
            Self::Unknown => "Unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_coerce_numeric() {
        assert_eq!(coerce_numeric(&json!("42")), json!(42));
        assert_eq!(coerce_numeric(&json!(" 57.5 ")), json!(57.5));
        assert_eq!(coerce_numeric(&json!("PrivacySuppressed")), Value::Null);
        assert_eq!(coerce_numeric(&json!("")), Value::Null);
        assert_eq!(coerce_numeric(&json!("inf")), Value::Null);
        assert_eq!(coerce_numeric(&Value::Null), Value::Null);
        assert_eq!(coerce_numeric(&json!(7)), json!(7));
    }

    #[test]
    fn test_cell_access() {
        let row = record(json!({ "SECTOR": "2", "AWLEVEL": "5.0", "CITY": " Boston ", "X": null }));
        assert_eq!(cell_i64(&row, "SECTOR"), Some(2));
        assert_eq!(cell_i64(&row, "AWLEVEL"), Some(5));
        assert_eq!(cell_i64(&row, "CITY"), None);
        assert_eq!(cell_text(&row, "CITY").as_deref(), Some("Boston"));
        assert_eq!(cell_text(&row, "X"), None);
        assert_eq!(cell_f64(&row, "MISSING"), None);
    }

    #[test]
    fn test_number_value() {
        assert_eq!(number_value(15.0), json!(15));
        assert_eq!(number_value(2.5), json!(2.5));
    }

    #[test]
    fn test_sector_codes() {
        assert_eq!(Sector::from_code(1), Some(Sector::Public));
        assert_eq!(Sector::from_code(3).map(|s| s.label()), Some("Private for-profit"));
        assert_eq!(Sector::from_code(4), None);
        assert_eq!(Sector::from_code(0), None);
        assert_eq!(Sector::PrivateNonprofit.code(), 2);
    }

    #[test]
    fn test_locale_groups() {
        assert_eq!(LocaleGroup::from_code(Some(11)), LocaleGroup::City);
        assert_eq!(LocaleGroup::from_code(Some(23)), LocaleGroup::Suburb);
        assert_eq!(LocaleGroup::from_code(Some(32)), LocaleGroup::Town);
        assert_eq!(LocaleGroup::from_code(Some(43)), LocaleGroup::Rural);
        assert_eq!(LocaleGroup::from_code(Some(5)), LocaleGroup::Unknown);
        assert_eq!(LocaleGroup::from_code(Some(51)), LocaleGroup::Unknown);
        assert_eq!(LocaleGroup::from_code(Some(-3)), LocaleGroup::Unknown);
        assert_eq!(LocaleGroup::from_code(None), LocaleGroup::Unknown);
    }

    #[test]
    fn test_project_skips_absent_columns() {
        let mut table = Table::new("t", vec!["b".into(), "a".into()]);
        table.records.push(record(json!({ "b": "2", "a": "1" })));

        let projected = table.project(&["a", "missing", "b"]);
        assert_eq!(projected.headers, vec!["a", "b"]);
        let keys: Vec<&String> = projected.records[0].keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_retain_reports_removed() {
        let mut table = Table::new("t", vec!["v".into()]);
        for v in ["1", "2", "3"] {
            table.records.push(record(json!({ "v": v })));
        }
        let removed = table.retain(|r| cell_i64(r, "v") != Some(2));
        assert_eq!(removed, 1);
        assert_eq!(table.len(), 2);
    }
}
