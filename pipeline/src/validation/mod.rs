//! JSON Schema validation of output rows.
//!
//! Both output tables have an embedded Draft 7 schema (compiled in from the
//! `schemas/` directory):
//!
//! - `institution.json` - sector code, labels, rate and percentage bounds
//! - `program.json` - two-character family, non-negative award totals
//!
//! Violations are reported, never fatal: a run with invalid rows still
//! writes its outputs.
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use ipeds::validation::RecordValidator;
//!
//! let validator = RecordValidator::program()?;
//! let row = json!({ "UNITID": 1, "cip_family": "11", "total_awards": 15, "cip_label": "Computer Science" });
//! assert!(validator.validate(&row).is_ok());
//! ```

use serde::Serialize;
use serde_json::Value;

use crate::error::{ValidationError, ValidationResult};
use crate::models::Table;

const INSTITUTION_SCHEMA: &str = include_str!("../../schemas/institution.json");
const PROGRAM_SCHEMA: &str = include_str!("../../schemas/program.json");

/// Maximum number of failing rows kept in a [`TableValidation`].
const MAX_REPORTED: usize = 10;

/// Validate a JSON value against a schema.
///
/// # Returns
/// * `Ok(())` when valid
/// * `Err(Vec<String>)` with one message per violation
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator.iter_errors(data).map(|e| e.to_string()).collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Quick check against a schema.
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

/// Per-table validation counts.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TableValidation {
    pub valid: usize,
    pub invalid: usize,
    /// First failing rows: (row index, messages)
    pub errors: Vec<(usize, Vec<String>)>,
}

impl TableValidation {
    pub fn is_ok(&self) -> bool {
        self.invalid == 0
    }
}

/// Compiled schema for one kind of output row.
pub struct RecordValidator {
    name: &'static str,
    validator: jsonschema::Validator,
}

impl RecordValidator {
    fn compile(name: &'static str, text: &str) -> ValidationResult<Self> {
        let invalid = |message: String| ValidationError::InvalidSchema {
            name: name.to_string(),
            message,
        };
        let schema: Value = serde_json::from_str(text).map_err(|e| invalid(e.to_string()))?;
        let validator = jsonschema::draft7::new(&schema).map_err(|e| invalid(e.to_string()))?;
        Ok(Self { name, validator })
    }

    /// Validator for `institutions.csv` rows.
    pub fn institution() -> ValidationResult<Self> {
        Self::compile("institution", INSTITUTION_SCHEMA)
    }

    /// Validator for `programs.csv` rows.
    pub fn program() -> ValidationResult<Self> {
        Self::compile("program", PROGRAM_SCHEMA)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn validate(&self, data: &Value) -> Result<(), Vec<String>> {
        let errors: Vec<String> = self.validator.iter_errors(data).map(|e| e.to_string()).collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn is_valid(&self, data: &Value) -> bool {
        self.validator.is_valid(data)
    }

    /// Validate every row of `table`.
    pub fn validate_table(&self, table: &Table) -> TableValidation {
        let mut result = TableValidation::default();

        for (i, record) in table.records.iter().enumerate() {
            match self.validate(&Value::Object(record.clone())) {
                Ok(()) => result.valid += 1,
                Err(errs) => {
                    result.invalid += 1;
                    if result.errors.len() < MAX_REPORTED {
                        result.errors.push((i, errs));
                    }
                }
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn institution() -> Value {
        json!({
            "UNITID": "100654",
            "INSTNM": "Alabama A & M University",
            "SECTOR": "1",
            "sector_label": "Public",
            "locale_group": "City",
            "admission_rate": 68,
            "grad_rate_6yr": 27.5,
            "pct_pell": null
        })
    }

    #[test]
    fn test_embedded_schemas_compile() {
        assert_eq!(RecordValidator::institution().unwrap().name(), "institution");
        assert_eq!(RecordValidator::program().unwrap().name(), "program");
    }

    #[test]
    fn test_valid_institution() {
        let validator = RecordValidator::institution().unwrap();
        assert!(validator.is_valid(&institution()));
    }

    #[test]
    fn test_rate_out_of_range() {
        let validator = RecordValidator::institution().unwrap();
        let mut row = institution();
        row["admission_rate"] = json!(120);

        let errors = validator.validate(&row).unwrap_err();
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_unknown_locale_group_rejected() {
        let validator = RecordValidator::institution().unwrap();
        let mut row = institution();
        row["locale_group"] = json!("Exurb");
        assert!(!validator.is_valid(&row));
    }

    #[test]
    fn test_program_family_length() {
        let validator = RecordValidator::program().unwrap();
        let good = json!({ "UNITID": 1, "cip_family": "11", "total_awards": 15, "cip_label": "Computer Science" });
        let bad = json!({ "UNITID": 1, "cip_family": "110", "total_awards": -1, "cip_label": "Other" });

        assert!(validator.is_valid(&good));
        assert_eq!(validator.validate(&bad).unwrap_err().len(), 2);
    }

    #[test]
    fn test_validate_table_counts() {
        let validator = RecordValidator::program().unwrap();
        let mut table = Table::new("programs", vec![]);
        for row in [
            json!({ "UNITID": 1, "cip_family": "11", "total_awards": 15, "cip_label": "Computer Science" }),
            json!({ "UNITID": 1, "cip_family": "5", "total_awards": 2, "cip_label": "Other" }),
        ] {
            table.records.push(row.as_object().cloned().unwrap());
        }

        let result = validator.validate_table(&table);
        assert_eq!(result.valid, 1);
        assert_eq!(result.invalid, 1);
        assert_eq!(result.errors[0].0, 1);
        assert!(!result.is_ok());
    }

    #[test]
    fn test_generic_validate() {
        let schema = json!({
            "type": "object",
            "required": ["name"],
            "properties": { "name": { "type": "string" } }
        });
        assert!(validate(&schema, &json!({ "name": "test" })).is_ok());
        assert!(validate(&schema, &json!({ "age": 42 })).is_err());
        assert!(is_valid(&schema, &json!({ "name": "x" })));
    }
}
