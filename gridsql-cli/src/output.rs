//! JSON rendering of composed queries, pages and faults.

use gridsql::{Error, Page, QueryResult, Value};
use serde_json::{Map, Number, Value as JsonValue, json};

pub fn value(v: &Value) -> JsonValue {
    match v {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Int(n) => JsonValue::from(*n),
        Value::Float(f) => Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number),
        Value::String(s) => JsonValue::String(s.clone()),
        Value::Array(items) => items.iter().map(value).collect(),
        Value::Object(fields) => JsonValue::Object(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), value(v)))
                .collect::<Map<_, _>>(),
        ),
    }
}

pub fn query(result: &QueryResult) -> JsonValue {
    json!({
        "sql": result.sql,
        "params": result.params.iter().map(value).collect::<Vec<_>>(),
    })
}

pub fn page(page: &Page<JsonValue>) -> JsonValue {
    let info = page.page_info();
    json!({
        "rows": page.rows,
        "total": page.total,
        "has_next": info.has_next,
        "has_prev": info.has_prev,
    })
}

/// Structured body for a client fault, shaped like an HTTP error response.
pub fn fault(err: &Error) -> JsonValue {
    json!({
        "error": {
            "kind": format!("{:?}", err.kind()),
            "field": err.field(),
            "status": err.status_code(),
            "message": err.client_message(),
        }
    })
}
