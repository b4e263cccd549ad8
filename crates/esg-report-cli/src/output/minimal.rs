use serde_json::Value;

use super::format_scalar;

/// Print just the key answer value from the output.
///
/// Looks for the headline field of each command in priority order, then
/// falls back to the first field of the result object.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let priority_keys = [
        "total_emissions",
        "overall_turnover_rate",
        "percent_change",
        "iso",
    ];

    if let Value::Object(map) = result_obj {
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", format_scalar(val));
                    return;
                }
            }
        }

        // Report payloads keep their totals one level down
        if let Some(Value::Object(summary)) = map.get("summary") {
            if let Some(val) = summary.get("total_emissions") {
                println!("{}", format_scalar(val));
                return;
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_scalar(val));
            return;
        }
    }

    println!("{}", format_scalar(result_obj));
}
