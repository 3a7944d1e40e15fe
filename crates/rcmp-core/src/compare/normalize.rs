//! Body normalization applied before diffing.
//!
//! Render endpoints may answer with a bare array or scalar, while the diff
//! operates on an object root. Every body is therefore parsed and placed under
//! a single synthetic key, `{"response": <body>}`. The same wrapping is applied
//! to both sides, so it never shows up as a difference on its own.
//!
//! Callers hand raw bodies to the comparator and must not wrap them first.

use serde_json::{Map, Value};

/// The synthetic key every body is nested under.
pub const RESPONSE_KEY: &str = "response";

/// Nest `value` under [`RESPONSE_KEY`].
pub fn wrap(value: Value) -> Value {
    let mut root = Map::new();
    root.insert(RESPONSE_KEY.to_string(), value);
    Value::Object(root)
}

/// Parse a raw response body and wrap it for diffing.
pub fn normalize(body: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str::<Value>(body).map(wrap)
}
