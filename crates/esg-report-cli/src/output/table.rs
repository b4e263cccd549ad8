use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::format_scalar;

/// Format output as tables using the tabled crate: scalar fields of the
/// result as a field/value table, then one table per row collection.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => print_result_table(result, map),
            _ => print_field_table(map),
        },
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", value),
    }
}

fn print_result_table(result: &Map<String, Value>, envelope: &Map<String, Value>) {
    let (collections, scalars): (Vec<_>, Vec<_>) = result
        .iter()
        .partition(|(_, v)| matches!(v, Value::Array(items) if items.first().is_some_and(Value::is_object)));

    let scalars: Map<String, Value> = scalars
        .into_iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    print_field_table(&scalars);

    for (key, items) in collections {
        if let Value::Array(items) = items {
            println!("\n{}:", key);
            print_array_table(items);
        }
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_field_table(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &format_value(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        _ => format_scalar(value),
    }
}
