//! Query string construction for server-side filtering

use serde_json::{Map, Value};

/// Plain string form of a value, as the appliance expects it on the wire.
/// Strings are unquoted and `null` is empty; containers fall back to JSON text.
pub fn plain_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Build `?k1=v1&k2=v2` from filter options, in the mapping's order.
///
/// A non-empty array becomes one quoted, comma-joined token: `k='a,b'`.
/// An empty mapping yields an empty string.
pub fn build_query(options: &Map<String, Value>) -> String {
    if options.is_empty() {
        return String::new();
    }

    let mut query = String::from("?");
    for (key, value) in options {
        let rendered = match value {
            Value::Array(items) if !items.is_empty() => {
                let joined: Vec<String> = items.iter().map(plain_string).collect();
                format!("'{}'", joined.join(","))
            }
            other => plain_string(other),
        };
        query.push('&');
        query.push_str(key);
        query.push('=');
        query.push_str(&rendered);
    }

    query.replacen("?&", "?", 1)
}
