//! Mock request handling.
//!
//! Each registered operation is described by a [`RouteDescriptor`] built once
//! at startup. [`handle`] turns a descriptor and an incoming request into a
//! response without touching any shared state.

use crate::openapi::{Operation, JSON_MEDIA_TYPE};
use axum::body::Bytes;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Key under which GET handlers report declared query parameters.
pub const QUERY_PARAMS_KEY: &str = "query_params";

/// The methods a mock handler knows how to simulate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockMethod {
    Get,
    Post,
    Put,
    Delete,
    /// Anything else; answered with 405
    Unsupported(String),
}

impl MockMethod {
    /// Parse a method name, ignoring case.
    pub fn parse(method: &str) -> Self {
        match method.to_ascii_uppercase().as_str() {
            "GET" => MockMethod::Get,
            "POST" => MockMethod::Post,
            "PUT" => MockMethod::Put,
            "DELETE" => MockMethod::Delete,
            _ => MockMethod::Unsupported(method.to_string()),
        }
    }
}

impl fmt::Display for MockMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MockMethod::Get => f.write_str("GET"),
            MockMethod::Post => f.write_str("POST"),
            MockMethod::Put => f.write_str("PUT"),
            MockMethod::Delete => f.write_str("DELETE"),
            MockMethod::Unsupported(other) => f.write_str(&other.to_ascii_uppercase()),
        }
    }
}

/// Everything a handler needs to answer requests for one operation.
#[derive(Debug, Clone)]
pub struct RouteDescriptor {
    pub method: MockMethod,
    /// Declared query parameter names
    pub query_params: Vec<String>,
    /// Base example, shared read-only by every request
    pub example: Arc<Value>,
}

impl RouteDescriptor {
    /// Build the descriptor for `operation` answered under `method`.
    pub fn build(operation: &Operation, example: Arc<Value>, method: &str) -> Self {
        Self {
            method: MockMethod::parse(method),
            query_params: operation.query_parameter_names(),
            example,
        }
    }
}

/// The parts of an HTTP request the handlers look at.
#[derive(Debug, Clone, Default)]
pub struct MockRequest {
    /// Decoded query string, first value per key
    pub query: HashMap<String, String>,
    /// Raw `Content-Type` header value
    pub content_type: Option<String>,
    pub body: Bytes,
}

/// Status and JSON body produced by a handler.
#[derive(Debug, Clone, PartialEq)]
pub struct MockResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl MockResponse {
    fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    fn error(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            body: json!({ "error": message }),
        }
    }
}

impl IntoResponse for MockResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Answer `request` for the operation described by `descriptor`.
pub fn handle(descriptor: &RouteDescriptor, request: &MockRequest) -> MockResponse {
    let example = descriptor.example.as_ref();
    match &descriptor.method {
        MockMethod::Get => handle_get(example, &descriptor.query_params, request),
        MockMethod::Post => handle_post(example, request),
        MockMethod::Put => handle_put(example, request),
        MockMethod::Delete => MockResponse {
            status: StatusCode::NO_CONTENT,
            body: json!({ "message": "Resource deleted" }),
        },
        MockMethod::Unsupported(_) => {
            MockResponse::error(StatusCode::METHOD_NOT_ALLOWED, "Method not supported")
        }
    }
}

fn handle_get(example: &Value, declared: &[String], request: &MockRequest) -> MockResponse {
    if declared.is_empty() {
        return MockResponse::ok(example.clone());
    }

    let query_params: Map<String, Value> = declared
        .iter()
        .map(|name| {
            let value = request
                .query
                .get(name)
                .map_or(Value::Null, |v| Value::String(v.clone()));
            (name.clone(), value)
        })
        .collect();

    match example {
        Value::Object(base) => {
            let mut merged = base.clone();
            merged.insert(QUERY_PARAMS_KEY.to_string(), Value::Object(query_params));
            MockResponse::ok(Value::Object(merged))
        }
        // nothing to attach query_params to
        other => MockResponse::ok(other.clone()),
    }
}

fn handle_post(example: &Value, request: &MockRequest) -> MockResponse {
    if request.content_type.as_deref() != Some(JSON_MEDIA_TYPE) {
        return MockResponse::error(StatusCode::UNSUPPORTED_MEDIA_TYPE, "Unsupported Media Type");
    }
    match serde_json::from_slice::<Value>(&request.body) {
        Ok(body) => MockResponse::ok(merge_body(example, body)),
        Err(_) => MockResponse::error(StatusCode::BAD_REQUEST, "Invalid request body"),
    }
}

fn handle_put(example: &Value, request: &MockRequest) -> MockResponse {
    match serde_json::from_slice::<Value>(&request.body) {
        Ok(body) => MockResponse::ok(merge_body(example, body)),
        Err(_) => MockResponse::error(StatusCode::BAD_REQUEST, "Invalid request body"),
    }
}

/// Shallow merge with body keys taking precedence.
///
/// When either side is not an object the body is ignored and the example is
/// returned unchanged.
pub fn merge_body(example: &Value, body: Value) -> Value {
    match (example, body) {
        (Value::Object(base), Value::Object(overlay)) => {
            let mut merged = base.clone();
            merged.extend(overlay);
            Value::Object(merged)
        }
        _ => example.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(method: &str, operation: Value, example: Value) -> RouteDescriptor {
        let operation: Operation = serde_json::from_value(operation).unwrap();
        RouteDescriptor::build(&operation, Arc::new(example), method)
    }

    fn json_request(body: &str) -> MockRequest {
        MockRequest {
            content_type: Some("application/json".to_string()),
            body: Bytes::from(body.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_method() {
        assert_eq!(MockMethod::parse("get"), MockMethod::Get);
        assert_eq!(MockMethod::parse("Post"), MockMethod::Post);
        assert_eq!(MockMethod::parse("PUT"), MockMethod::Put);
        assert_eq!(MockMethod::parse("delete"), MockMethod::Delete);
        assert_eq!(
            MockMethod::parse("patch"),
            MockMethod::Unsupported("patch".to_string())
        );
        assert_eq!(MockMethod::parse("patch").to_string(), "PATCH");
    }

    #[test]
    fn test_get_without_query_params() {
        let d = descriptor("get", json!({}), json!({"message": "test"}));
        let resp = handle(&d, &MockRequest::default());
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.body, json!({"message": "test"}));
    }

    #[test]
    fn test_get_with_query_params() {
        let d = descriptor(
            "get",
            json!({"parameters": [{"name": "param1", "in": "query"}]}),
            json!({"message": "test"}),
        );
        let request = MockRequest {
            query: HashMap::from([("param1".to_string(), "value1".to_string())]),
            ..Default::default()
        };
        let resp = handle(&d, &request);
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(
            resp.body,
            json!({"message": "test", "query_params": {"param1": "value1"}})
        );
    }

    #[test]
    fn test_get_missing_query_param_is_null() {
        let d = descriptor(
            "get",
            json!({"parameters": [
                {"name": "page", "in": "query"},
                {"name": "id", "in": "path"},
                {"name": "X-Trace", "in": "header"}
            ]}),
            json!({"items": []}),
        );
        let resp = handle(&d, &MockRequest::default());
        assert_eq!(
            resp.body,
            json!({"items": [], "query_params": {"page": null}})
        );
    }

    #[test]
    fn test_get_undeclared_query_values_are_ignored() {
        let d = descriptor(
            "get",
            json!({"parameters": [{"name": "page", "in": "query"}]}),
            json!({}),
        );
        let request = MockRequest {
            query: HashMap::from([
                ("page".to_string(), "2".to_string()),
                ("extra".to_string(), "x".to_string()),
            ]),
            ..Default::default()
        };
        let resp = handle(&d, &request);
        assert_eq!(resp.body, json!({"query_params": {"page": "2"}}));
    }

    #[test]
    fn test_get_overwrites_existing_query_params_key() {
        let d = descriptor(
            "get",
            json!({"parameters": [{"name": "q", "in": "query"}]}),
            json!({"query_params": "original", "keep": true}),
        );
        let resp = handle(&d, &MockRequest::default());
        assert_eq!(resp.body, json!({"query_params": {"q": null}, "keep": true}));
    }

    #[test]
    fn test_get_non_object_example_with_query_params() {
        let d = descriptor(
            "get",
            json!({"parameters": [{"name": "q", "in": "query"}]}),
            json!([1, 2, 3]),
        );
        let resp = handle(&d, &MockRequest::default());
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.body, json!([1, 2, 3]));
    }

    #[test]
    fn test_post_merges_body() {
        let d = descriptor("post", json!({}), json!({"message": "test"}));
        let resp = handle(&d, &json_request(r#"{"key": "value"}"#));
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.body, json!({"message": "test", "key": "value"}));
    }

    #[test]
    fn test_post_body_wins_and_merge_is_shallow() {
        let d = descriptor(
            "post",
            json!({}),
            json!({"message": "test", "nested": {"a": 1, "b": 2}}),
        );
        let resp = handle(&d, &json_request(r#"{"message": "mine", "nested": {"c": 3}}"#));
        assert_eq!(resp.body, json!({"message": "mine", "nested": {"c": 3}}));
    }

    #[test]
    fn test_post_non_object_body_is_ignored() {
        let d = descriptor("post", json!({}), json!({"message": "test"}));
        let resp = handle(&d, &json_request("[1, 2]"));
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.body, json!({"message": "test"}));

        let d = descriptor("post", json!({}), json!("plain"));
        let resp = handle(&d, &json_request(r#"{"key": "value"}"#));
        assert_eq!(resp.body, json!("plain"));
    }

    #[test]
    fn test_post_invalid_json() {
        let d = descriptor("post", json!({}), json!({"message": "test"}));
        let resp = handle(&d, &json_request("{not json"));
        assert_eq!(resp.status, StatusCode::BAD_REQUEST);
        assert_eq!(resp.body, json!({"error": "Invalid request body"}));

        let resp = handle(&d, &json_request(""));
        assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_post_unsupported_media_type() {
        let d = descriptor("post", json!({}), json!({"message": "test"}));
        let request = MockRequest {
            content_type: Some("text/plain".to_string()),
            body: Bytes::from_static(b"{\"key\": \"value\"}"),
            ..Default::default()
        };
        let resp = handle(&d, &request);
        assert_eq!(resp.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(resp.body, json!({"error": "Unsupported Media Type"}));

        let resp = handle(&d, &MockRequest::default());
        assert_eq!(resp.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let request = MockRequest {
            content_type: Some("application/json; charset=utf-8".to_string()),
            ..Default::default()
        };
        assert_eq!(handle(&d, &request).status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[test]
    fn test_put_ignores_content_type() {
        let d = descriptor("put", json!({}), json!({"id": 1, "name": "old"}));
        let request = MockRequest {
            content_type: Some("text/plain".to_string()),
            body: Bytes::from_static(b"{\"name\": \"new\"}"),
            ..Default::default()
        };
        let resp = handle(&d, &request);
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.body, json!({"id": 1, "name": "new"}));
    }

    #[test]
    fn test_put_invalid_and_non_object_body() {
        let d = descriptor("PUT", json!({}), json!({"id": 1}));
        let resp = handle(&d, &json_request("nope"));
        assert_eq!(resp.status, StatusCode::BAD_REQUEST);
        assert_eq!(resp.body, json!({"error": "Invalid request body"}));

        let resp = handle(&d, &json_request("42"));
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.body, json!({"id": 1}));
    }

    #[test]
    fn test_delete() {
        let d = descriptor("delete", json!({}), json!({"message": "test"}));
        let resp = handle(&d, &json_request(r#"{"anything": true}"#));
        assert_eq!(resp.status, StatusCode::NO_CONTENT);
        assert_eq!(resp.body, json!({"message": "Resource deleted"}));
    }

    #[test]
    fn test_unsupported_method() {
        let d = descriptor("patch", json!({}), json!({"message": "test"}));
        let resp = handle(&d, &json_request(r#"{"key": "value"}"#));
        assert_eq!(resp.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.body, json!({"error": "Method not supported"}));
    }

    #[test]
    fn test_example_is_never_mutated() {
        let d = descriptor("post", json!({}), json!({"message": "test"}));
        handle(&d, &json_request(r#"{"message": "changed", "extra": 1}"#));
        assert_eq!(*d.example, json!({"message": "test"}));
    }
}
