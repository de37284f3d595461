//! Check serialization and error normalization against JSON test vectors
//! stored in `test-vectors/`.
//!
//! Parsed bodies are compared as `serde_json::Value` so field ordering in the
//! vector files does not matter.

use post_core::http::RawResponse;
use post_core::{serialize_obj, Headers, RequestBody, ResponseBody, RpcError};
use serde_json::Value;

/// Collapse a parsed body into the `Value` form used by the vectors.
fn body_value(body: &ResponseBody) -> Value {
    match body {
        ResponseBody::Empty => Value::Null,
        ResponseBody::Json(value) => value.clone(),
        ResponseBody::Text(text) => Value::String(text.clone()),
    }
}

// ---------------------------------------------------------------------------
// JSON bodies
// ---------------------------------------------------------------------------

#[test]
fn json_body_vectors() {
    let raw = include_str!("../../test-vectors/json_bodies.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let message = &case["message"];
        let expected = case["expected_body"].as_str().unwrap();

        let text = serialize_obj(Some(message)).unwrap();
        assert_eq!(text.as_deref(), Some(expected), "{name}: serialize_obj");

        let body = RequestBody::build(Some(message), &[], "").unwrap();
        assert_eq!(body, RequestBody::Json(Some(expected.to_string())), "{name}: body");

        // The echoed text parses back to the original message.
        let parsed = ResponseBody::parse(expected);
        assert_eq!(body_value(&parsed), *message, "{name}: round trip");
    }
}

// ---------------------------------------------------------------------------
// Error messages
// ---------------------------------------------------------------------------

#[test]
fn error_message_vectors() {
    let raw = include_str!("../../test-vectors/error_messages.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();
    let url = vectors["url"].as_str().unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let response = &case["response"];
        let status = response["status"].as_u64().unwrap() as u16;
        let status_text = response["status_text"].as_str().unwrap();

        let err = RpcError::from_response(
            RawResponse {
                url: url.to_string(),
                status,
                status_text: status_text.to_string(),
                headers: Headers::new(),
                body: response["body"].as_str().unwrap().to_string(),
            },
            case["extract"].as_bool().unwrap(),
        );

        assert_eq!(err.status_code, status, "{name}: status");
        assert_eq!(err.status_text, status_text, "{name}: status text");
        assert_eq!(err.url, url, "{name}: url");
        assert_eq!(err.message, case["expected"]["message"].as_str().unwrap(), "{name}: message");
        assert_eq!(body_value(&err.body), case["expected"]["body"], "{name}: body");
    }
}
