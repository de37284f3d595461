//! Error types for the POST client.
//!
//! # Design
//! A call ends in exactly one of: a response, an [`RpcError`] (the server
//! answered with a non-2xx status), or a [`TransportError`] (there was no
//! response to normalize). Transport and serialization faults are passed
//! through unmodified; they are never dressed up as RPC errors.

use thiserror::Error;

use crate::http::{Headers, RawResponse, ResponseBody};

/// Errors returned by [`crate::PostClient::post`].
#[derive(Debug, Error)]
pub enum Error {
    /// The server answered with a non-2xx status.
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// The request never produced a response.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The message could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The response body could not be deserialized into the requested type.
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// The request description is inconsistent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl Error {
    pub fn as_rpc(&self) -> Option<&RpcError> {
        match self {
            Error::Rpc(rpc) => Some(rpc),
            _ => None,
        }
    }
}

/// Faults raised before any HTTP response existed.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("fetch transport: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("interceptor transport: {0}")]
    Interceptor(#[from] ureq::Error),

    /// The blocking task running the interceptor transport died.
    #[error("interceptor task failed: {0}")]
    Blocking(#[from] tokio::task::JoinError),
}

/// A non-2xx response, normalized the same way for every transport.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct RpcError {
    pub status_code: u16,
    pub status_text: String,
    pub url: String,
    pub headers: Headers,
    pub body: ResponseBody,
    pub message: String,
}

impl RpcError {
    /// Build from a failed response. With `extract_message` the message is a
    /// short string pulled from the body; otherwise it is the raw body text.
    pub fn from_response(raw: RawResponse, extract_message: bool) -> Self {
        let body = ResponseBody::parse(&raw.body);
        let derived = if extract_message {
            extract(&body, &raw.body, &raw.status_text)
        } else {
            non_empty(&raw.body)
        };
        let message =
            derived.unwrap_or_else(|| default_message(raw.status, &raw.status_text, &raw.url));

        Self {
            status_code: raw.status,
            status_text: raw.status_text,
            url: raw.url,
            headers: raw.headers,
            body,
            message,
        }
    }
}

pub fn default_message(status: u16, status_text: &str, url: &str) -> String {
    format!("RPC error {status} {status_text} calling {url}")
}

// Best effort; every step may come up empty and falls through to the next.
// A JSON string body is the candidate itself, so an empty one goes straight
// to the status text.
fn extract(body: &ResponseBody, raw: &str, status_text: &str) -> Option<String> {
    let candidate = match body.as_json() {
        Some(serde_json::Value::String(s)) => non_empty(s),
        Some(serde_json::Value::Object(map)) => {
            map.get("message").and_then(message_text).or_else(|| non_empty(raw))
        }
        _ => non_empty(raw),
    };
    candidate.or_else(|| non_empty(status_text))
}

// `null`, `false`, `0` and `""` carry no message.
fn message_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null | serde_json::Value::Bool(false) => None,
        serde_json::Value::Number(n) if n.as_f64() == Some(0.0) => None,
        serde_json::Value::String(s) => non_empty(s),
        other => Some(other.to_string()),
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}
