pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Locate the per-row array of a command result.
///
/// A currency report takes precedence over the USD rows, so `--currency`
/// changes what table and CSV output show.
pub fn row_array(value: &Value) -> Option<&Vec<Value>> {
    let paths: [&[&str]; 4] = [
        &["report", "rows"],
        &["result", "rows"],
        &["result", "allocation", "installments"],
        &["result", "cash_flows"],
    ];
    paths.iter().find_map(|path| {
        path.iter()
            .try_fold(value, |v, key| v.get(*key))
            .and_then(Value::as_array)
    })
}

/// Key names whose values are row arrays, left out of field/value listings.
pub const ROW_KEYS: [&str; 4] = ["rows", "installments", "cash_flows", "allocation"];

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_report_rows_preferred() {
        let value = json!({
            "result": { "rows": [{ "year": 1 }] },
            "report": { "rows": [{ "year": 1 }, { "year": 2 }] },
        });
        assert_eq!(row_array(&value).map(Vec::len), Some(2));
    }

    #[test]
    fn test_schedule_installments_found() {
        let value = json!({
            "result": { "allocation": { "installments": [{ "id": "a" }] }, "is_ready": true },
        });
        assert_eq!(row_array(&value).map(Vec::len), Some(1));
        assert!(row_array(&json!({ "result": { "npv": "1" } })).is_none());
    }
}
