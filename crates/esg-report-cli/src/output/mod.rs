pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Row-shaped fields of a result, checked in this order when picking the
/// one collection a flat format can show.
pub(crate) const COLLECTION_KEYS: [&str; 6] =
    ["groups", "rows", "locations", "scopes", "turnover", "countries"];

/// First non-empty array of objects in `result`, by [`COLLECTION_KEYS`].
pub(crate) fn primary_collection(result: &Map<String, Value>) -> Option<(&str, &[Value])> {
    COLLECTION_KEYS.iter().find_map(|key| match result.get(*key) {
        Some(Value::Array(items)) if items.first().is_some_and(Value::is_object) => {
            Some((*key, items.as_slice()))
        }
        _ => None,
    })
}

/// Render a leaf value as plain text; nested structures fall back to JSON.
pub(crate) fn format_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
