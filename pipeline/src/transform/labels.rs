//! Human-readable sector and locale labels.

use serde_json::Value;

use crate::error::{TransformError, TransformResult};
use crate::models::{cell_i64, columns, LocaleGroup, Sector, Table};

/// Add `sector_label` and `locale_group` derived from `SECTOR` and `LOCALE`.
pub fn add_labels(mut table: Table) -> TransformResult<Table> {
    for column in [columns::SECTOR, columns::LOCALE] {
        if !table.has_column(column) {
            return Err(TransformError::MissingColumn {
                stage: "labels".to_string(),
                column: column.to_string(),
            });
        }
    }

    for record in &mut table.records {
        let sector_label = cell_i64(record, columns::SECTOR)
            .and_then(Sector::from_code)
            .map(|s| Value::String(s.label().to_string()))
            .unwrap_or(Value::Null);
        let locale_group = LocaleGroup::from_code(cell_i64(record, columns::LOCALE));

        record.insert(columns::SECTOR_LABEL.to_string(), sector_label);
        record.insert(
            columns::LOCALE_GROUP.to_string(),
            Value::String(locale_group.label().to_string()),
        );
    }

    table.add_column(columns::SECTOR_LABEL);
    table.add_column(columns::LOCALE_GROUP);
    Ok(table)
}
