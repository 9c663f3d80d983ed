//! Removal of implausible zero rates.

use crate::models::{cell_f64, columns, Table};

/// Drop institutions whose admission rate or six-year graduation rate is
/// exactly zero. Zeros in these extracts are data-entry artifacts; missing
/// rates are kept. Returns the number of rows removed.
pub fn drop_zero_rates(table: &mut Table) -> usize {
    table.retain(|record| {
        let is_zero = |column: &str| cell_f64(record, column) == Some(0.0);
        !(is_zero(columns::ADMISSION_RATE) || is_zero(columns::GRAD_RATE_6YR))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_zero_rates_dropped_missing_kept() {
        let mut table = Table::new(
            "institutions",
            vec!["UNITID".into(), "admission_rate".into(), "grad_rate_6yr".into()],
        );
        let rows = [
            json!({ "UNITID": "1", "admission_rate": 45, "grad_rate_6yr": 60 }),
            json!({ "UNITID": "2", "admission_rate": 0, "grad_rate_6yr": 60 }),
            json!({ "UNITID": "3", "admission_rate": 50, "grad_rate_6yr": 0.0 }),
            json!({ "UNITID": "4", "admission_rate": null, "grad_rate_6yr": null }),
            json!({ "UNITID": "5", "admission_rate": 0.5, "grad_rate_6yr": null }),
        ];
        for row in rows {
            table.records.push(row.as_object().cloned().unwrap());
        }

        let dropped = drop_zero_rates(&mut table);

        assert_eq!(dropped, 2);
        let ids: Vec<&Value> = table.records.iter().map(|r| &r["UNITID"]).collect();
        assert_eq!(ids, vec!["1", "4", "5"]);
    }

    #[test]
    fn test_without_rate_columns_nothing_dropped() {
        let mut table = Table::new("institutions", vec!["UNITID".into()]);
        table.records.push(json!({ "UNITID": "1" }).as_object().cloned().unwrap());
        assert_eq!(drop_zero_rates(&mut table), 0);
    }
}
