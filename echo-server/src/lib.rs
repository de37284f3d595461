use std::collections::BTreeMap;

use axum::{
    body::Bytes,
    extract::DefaultBodyLimit,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// A request body containing this text makes the server answer 400.
pub const ERROR_TRIGGER: &str = "trigger-error-response";

/// Message returned in the 400 body when [`ERROR_TRIGGER`] is received.
pub const ERROR_TEXT: &str = "Error response triggered by the request body";

/// What the server saw: every request header and the raw body text.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EchoResponse {
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/", post(echo).options(preflight))
        .route("/{*path}", post(echo).options(preflight))
        .layer(DefaultBodyLimit::disable())
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(headers: HeaderMap, body: Bytes) -> Response {
    let body = String::from_utf8_lossy(&body).into_owned();
    tracing::debug!(len = body.len(), "echo request");

    let mut response = if body.contains(ERROR_TRIGGER) {
        let error = ErrorResponse {
            message: ERROR_TEXT.to_string(),
        };
        (StatusCode::BAD_REQUEST, Json(error)).into_response()
    } else {
        let echo = EchoResponse {
            headers: header_map(&headers),
            body,
        };
        (StatusCode::OK, Json(echo)).into_response()
    };
    response.headers_mut().insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    response
}

async fn preflight() -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "*"),
        ],
    )
}

/// Flatten request headers; repeated names are joined with `", "`.
fn header_map(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        map.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_response_serializes_to_json() {
        let echo = EchoResponse {
            headers: BTreeMap::from([("x-test".to_string(), "1".to_string())]),
            body: "\"hello\"".to_string(),
        };
        let json = serde_json::to_value(&echo).unwrap();
        assert_eq!(json["headers"]["x-test"], "1");
        assert_eq!(json["body"], "\"hello\"");
    }

    #[test]
    fn header_map_joins_repeated_headers() {
        let mut headers = HeaderMap::new();
        headers.append("x-dup", HeaderValue::from_static("a"));
        headers.append("x-dup", HeaderValue::from_static("b"));
        headers.insert("content-type", HeaderValue::from_static("text/plain"));
        let map = header_map(&headers);
        assert_eq!(map["x-dup"], "a, b");
        assert_eq!(map["content-type"], "text/plain");
    }

    #[test]
    fn error_response_roundtrips_through_json() {
        let json = serde_json::to_string(&ErrorResponse {
            message: ERROR_TEXT.to_string(),
        })
        .unwrap();
        let back: ErrorResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(back.message, ERROR_TEXT);
    }
}
