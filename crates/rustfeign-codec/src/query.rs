//! Query maps derived from structured objects.

use rustfeign_core::codec::QueryMapEncoder;
use rustfeign_model::{EncodeError, Value};

/// Derives query parameters from the fields of an object.
///
/// Nested objects are flattened into dotted names (`page.size=10`), arrays become
/// multi-valued entries, and null fields are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldQueryMapEncoder;

impl QueryMapEncoder for FieldQueryMapEncoder {
    fn encode(&self, object: &Value) -> Result<Vec<(String, Value)>, EncodeError> {
        let json = match object {
            Value::Map(_) | Value::Object(_) => object.to_json(),
            other => {
                return Err(EncodeError::new(format!(
                    "cannot derive query parameters from {other}"
                )));
            }
        };
        let mut entries = Vec::new();
        if let serde_json::Value::Object(fields) = json {
            for (name, value) in fields {
                flatten(name, value, &mut entries);
            }
            Ok(entries)
        } else {
            Err(EncodeError::new("query map object must have fields"))
        }
    }
}

fn flatten(name: String, value: serde_json::Value, out: &mut Vec<(String, Value)>) {
    match value {
        serde_json::Value::Null => {}
        serde_json::Value::Object(fields) => {
            for (field, nested) in fields {
                flatten(format!("{name}.{field}"), nested, out);
            }
        }
        serde_json::Value::Array(items) => {
            let items: Vec<Value> = items
                .into_iter()
                .filter(|item| !item.is_null())
                .map(Value::Object)
                .collect();
            if !items.is_empty() {
                out.push((name, Value::List(items)));
            }
        }
        scalar => out.push((name, Value::Object(scalar))),
    }
}
