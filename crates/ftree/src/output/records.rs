//! Matched record output formatting.

use filter_tree_rs::Record;
use owo_colors::OwoColorize;

/// Formats matched records as a JSON array.
pub fn format_records_json(records: &[&Record]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(records)
}

/// Formats matched records one compact JSON object per line, followed by a
/// count summary.
pub fn format_records_table(
    records: &[&Record],
    total: usize,
    use_colors: bool,
) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    for record in records {
        output.push_str(&serde_json::to_string(record)?);
        output.push('\n');
    }

    let summary = format!("Matched {} of {} records", records.len(), total);
    if use_colors {
        output.push_str(&format!("{}\n", summary.dimmed()));
    } else {
        output.push_str(&summary);
        output.push('\n');
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_format_records_table() {
        let a = record(json!({"age": 45, "name": "Bo"}));
        let output = format_records_table(&[&a], 3, false).unwrap();
        assert_eq!(output, "{\"age\":45,\"name\":\"Bo\"}\nMatched 1 of 3 records\n");
    }

    #[test]
    fn test_format_records_table_empty() {
        let output = format_records_table(&[], 2, false).unwrap();
        assert_eq!(output, "Matched 0 of 2 records\n");
    }

    #[test]
    fn test_format_records_json() {
        let a = record(json!({"id": 1}));
        let b = record(json!({"id": 2}));
        let parsed: serde_json::Value =
            serde_json::from_str(&format_records_json(&[&a, &b]).unwrap()).unwrap();
        assert_eq!(parsed, json!([{"id": 1}, {"id": 2}]));
    }
}
