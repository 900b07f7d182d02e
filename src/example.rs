//! Example selection.
//!
//! Picks the payload an operation answers with: the declared
//! `200`/`application/json` example, or a synthesized default.

use crate::openapi::{Operation, JSON_MEDIA_TYPE};
use serde_json::{json, Value};
use std::sync::Arc;

/// Status whose example is served.
pub const SUCCESS_STATUS: &str = "200";

/// Resolve the example for `operation`, synthesizing a JSON default when none is declared.
pub fn resolve_example(operation: &Operation) -> Arc<Value> {
    resolve_example_for(operation, JSON_MEDIA_TYPE)
}

/// Resolve the example for `operation`.
///
/// A declared `200`/`application/json` example is shared with the document,
/// never copied; `media_type` only shapes the synthesized default.
pub fn resolve_example_for(operation: &Operation, media_type: &str) -> Arc<Value> {
    let declared = operation
        .responses
        .get(SUCCESS_STATUS)
        .and_then(|response| response.content.as_ref())
        .and_then(|content| content.get(JSON_MEDIA_TYPE))
        .and_then(|media| media.example.as_ref());

    match declared {
        Some(example) => Arc::clone(example),
        None => Arc::new(default_example(200, media_type)),
    }
}

/// Default payload for operations without an example.
pub fn default_example(status: u16, media_type: &str) -> Value {
    if media_type == JSON_MEDIA_TYPE {
        json!({"status": status, "message": "Default response"})
    } else {
        Value::String(format!("Default response with status {}", status))
    }
}
