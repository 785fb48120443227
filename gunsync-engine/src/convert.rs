//! Normalization of graph-store records into indexable documents.

use gunsync_types::Did;
use serde_json::{json, Map, Value};

/// Converts a validated graph-store record into the document shape the
/// search index expects.
///
/// Stamps `oip.did` and `oip.storage = "gun"`, and re-inflates section
/// fields the store could only hold as JSON-encoded array strings (the
/// graph store cannot nest arrays natively).
///
/// Pure and idempotent: fields that are already arrays are left alone,
/// as are strings that do not parse to a JSON array, so applying the
/// transform to its own output is a no-op.
#[must_use]
pub fn convert_gun_record_for_index(record: &Value, did: &Did) -> Value {
    let mut out = match record {
        Value::Object(map) => Value::Object(map.clone()),
        // Validation upstream guarantees an object; tolerate anything
        // else by producing a bare metadata document.
        _ => json!({}),
    };

    if let Some(root) = out.as_object_mut() {
        stamp_oip(root, did);
        if let Some(data) = root.get_mut("data").and_then(Value::as_object_mut) {
            for section in data.values_mut() {
                if let Some(fields) = section.as_object_mut() {
                    inflate_array_fields(fields);
                }
            }
        }
    }

    out
}

fn stamp_oip(root: &mut Map<String, Value>, did: &Did) {
    let oip = root.entry("oip").or_insert_with(|| json!({}));
    if !oip.is_object() {
        *oip = json!({});
    }
    if let Some(oip) = oip.as_object_mut() {
        oip.insert("did".to_string(), Value::String(did.as_str().to_string()));
        oip.insert("storage".to_string(), Value::String("gun".to_string()));
    }
}

fn inflate_array_fields(fields: &mut Map<String, Value>) {
    for value in fields.values_mut() {
        let Value::String(s) = value else {
            continue;
        };
        if !s.trim_start().starts_with('[') {
            continue;
        }
        if let Ok(parsed @ Value::Array(_)) = serde_json::from_str::<Value>(s) {
            *value = parsed;
        }
    }
}
