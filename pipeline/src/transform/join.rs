//! Left join of an auxiliary survey table onto the institution table.
//!
//! Every auxiliary source is handled by one routine driven by a
//! [`JoinSpec`]: project the key and value columns, rename the values,
//! coerce them to numbers and attach them to the matching base rows.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

use crate::error::{SourceError, TransformError, TransformResult};
use crate::models::{cell_i64, coerce_numeric, columns, sources, Record, Table};
use crate::parser::{read_source, SourceInfo};

/// What to take from one auxiliary source.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct JoinSpec {
    /// Stage name used in logs and errors.
    pub name: &'static str,
    /// Source file name under the raw directory.
    pub file: &'static str,
    /// Join key, present in both tables.
    pub key: &'static str,
    /// `(source column, output column)` pairs.
    pub columns: &'static [(&'static str, &'static str)],
}

pub const ADMISSIONS: JoinSpec = JoinSpec {
    name: "admissions",
    file: sources::ADMISSIONS,
    key: columns::UNITID,
    columns: &[("DVADM01", columns::ADMISSION_RATE)],
};

pub const GRADUATION_RATES: JoinSpec = JoinSpec {
    name: "graduation rates",
    file: sources::GRADUATION,
    key: columns::UNITID,
    columns: &[("BAGR150", columns::GRAD_RATE_6YR)],
};

pub const ENROLLMENT_DEMOGRAPHICS: JoinSpec = JoinSpec {
    name: "enrollment and demographics",
    file: sources::ENROLLMENT,
    key: columns::UNITID,
    columns: &[
        ("ENRTOT", "enrollment_total"),
        ("EFUG", "enrollment_ug"),
        ("PCTENRW", "pct_women"),
        ("PCTENRWH", "pct_white"),
        ("PCTENRBK", "pct_black"),
        ("PCTENRHS", "pct_hispanic"),
        ("PCTENRAS", "pct_asian"),
        ("PCTENRAN", "pct_aian"),
        ("PCTENRNH", "pct_nhpi"),
        ("PCTENR2M", "pct_two_or_more"),
        ("PCTENRUN", "pct_unknown"),
        ("PCTENRNR", "pct_nonresident"),
    ],
};

pub const PELL: JoinSpec = JoinSpec {
    name: "Pell grants",
    file: sources::FINANCIAL_AID,
    key: columns::UNITID,
    columns: &[("UPGRNTP", "pct_pell")],
};

/// Joins applied to the institution table, in order.
pub const INSTITUTION_JOINS: &[JoinSpec] = &[ADMISSIONS, GRADUATION_RATES, ENROLLMENT_DEMOGRAPHICS, PELL];

/// Left-join the projected, renamed and coerced columns of `aux` onto `base`.
///
/// Row count and order of `base` are unchanged. Base rows without a match
/// get `Null` in every new column. `aux` must hold at most one row per key.
pub fn join_table(mut base: Table, aux: &Table, spec: &JoinSpec) -> TransformResult<Table> {
    if !base.has_column(spec.key) {
        return Err(TransformError::MissingColumn {
            stage: spec.name.to_string(),
            column: spec.key.to_string(),
        });
    }
    aux.require_column(spec.key)?;
    for (source, _) in spec.columns {
        aux.require_column(source)?;
    }

    let mut lookup: HashMap<i64, Vec<Value>> = HashMap::with_capacity(aux.len());
    for (idx, record) in aux.records.iter().enumerate() {
        let key = join_key(aux, record, spec.key, idx)?;
        let values = spec
            .columns
            .iter()
            .map(|(source, _)| record.get(*source).map(coerce_numeric).unwrap_or(Value::Null))
            .collect();

        if lookup.insert(key, values).is_some() {
            return Err(SourceError::DuplicateKey {
                table: aux.name.clone(),
                column: spec.key.to_string(),
                value: key,
            }
            .into());
        }
    }

    let mut joined = Vec::with_capacity(base.len());
    for (idx, mut record) in std::mem::take(&mut base.records).into_iter().enumerate() {
        let key = join_key(&base, &record, spec.key, idx)?;
        let values = lookup.get(&key);
        for (i, (_, output)) in spec.columns.iter().enumerate() {
            let value = values.map(|v| v[i].clone()).unwrap_or(Value::Null);
            record.insert(output.to_string(), value);
        }
        joined.push(record);
    }
    base.records = joined;

    for (_, output) in spec.columns {
        base.add_column(output);
    }
    Ok(base)
}

fn join_key(table: &Table, record: &Record, key: &str, idx: usize) -> TransformResult<i64> {
    cell_i64(record, key).ok_or_else(|| {
        SourceError::InvalidKey {
            table: table.name.clone(),
            column: key.to_string(),
            value: record
                .get(key)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            line: idx + 2,
        }
        .into()
    })
}

/// Read the source named by `spec` from `raw_dir` and join it onto `base`.
pub fn join_source(base: Table, raw_dir: &Path, spec: &JoinSpec) -> TransformResult<(Table, SourceInfo)> {
    let parsed = read_source(&raw_dir.join(spec.file))?;
    let joined = join_table(base, &parsed.table, spec)?;
    Ok((joined, parsed.info()))
}

/// Add `admission_rate` from the admissions source.
pub fn join_admissions(base: Table, raw_dir: &Path) -> TransformResult<Table> {
    join_source(base, raw_dir, &ADMISSIONS).map(|(table, _)| table)
}

/// Add `grad_rate_6yr` from the graduation rates source.
pub fn join_graduation_rates(base: Table, raw_dir: &Path) -> TransformResult<Table> {
    join_source(base, raw_dir, &GRADUATION_RATES).map(|(table, _)| table)
}

/// Add enrollment totals and the demographic percentages.
pub fn join_enrollment_demographics(base: Table, raw_dir: &Path) -> TransformResult<Table> {
    join_source(base, raw_dir, &ENROLLMENT_DEMOGRAPHICS).map(|(table, _)| table)
}

/// Add `pct_pell` from the financial aid source.
pub fn join_pell(base: Table, raw_dir: &Path) -> TransformResult<Table> {
    join_source(base, raw_dir, &PELL).map(|(table, _)| table)
}
