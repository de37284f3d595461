//! Plain-data request and response types shared by every transport.
//!
//! # Design
//! A caller describes a call with [`PostRequest`]; the client turns it into an
//! [`OutboundRequest`] (headers + serialized body) that any transport can
//! execute. Transports hand back a [`RawResponse`] with the body still as
//! text, and the client converts that into the public [`HttpResponse`].
//!
//! All fields use owned types so a prepared request can be moved onto a
//! blocking thread without lifetime concerns.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::body::RequestBody;
use crate::error::Error;

/// Header names to values. Case is kept as supplied on the way out and as
/// reported by the transport on the way in.
pub type Headers = BTreeMap<String, String>;

/// Which underlying client performs the network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportKind {
    /// Async `reqwest` client; non-2xx is detected by an explicit status check.
    Fetch,
    /// Blocking `ureq` agent with interceptor hooks; non-2xx surfaces as the
    /// client's own error carrying the response.
    #[default]
    Interceptor,
}

/// A file to upload as one multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub data: Vec<u8>,
    pub filename: Option<String>,
}

impl Attachment {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            filename: None,
        }
    }

    pub fn named(data: impl Into<Vec<u8>>, filename: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            filename: Some(filename.into()),
        }
    }
}

/// Everything needed to make one POST call.
///
/// `message` is serialized to JSON at call time; `None` means "no message"
/// and never serializes to a literal placeholder.
#[derive(Debug, Clone)]
pub struct PostRequest<M = Value> {
    pub url: String,
    pub headers: Headers,
    pub message: Option<M>,
    pub files: Vec<Attachment>,
    pub files_field_name: String,
    pub transport: TransportKind,
    pub extract_error_message: bool,
}

impl<M> PostRequest<M> {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Headers::new(),
            message: None,
            files: Vec::new(),
            files_field_name: String::new(),
            transport: TransportKind::default(),
            extract_error_message: false,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn message(mut self, message: M) -> Self {
        self.message = Some(message);
        self
    }

    pub fn file(mut self, attachment: Attachment) -> Self {
        self.files.push(attachment);
        self
    }

    pub fn files_field_name(mut self, name: impl Into<String>) -> Self {
        self.files_field_name = name.into();
        self
    }

    pub fn transport(mut self, transport: TransportKind) -> Self {
        self.transport = transport;
        self
    }

    /// Shorthand for picking [`TransportKind::Fetch`] (`true`) or
    /// [`TransportKind::Interceptor`] (`false`).
    pub fn fetch(self, is_fetch: bool) -> Self {
        self.transport(if is_fetch {
            TransportKind::Fetch
        } else {
            TransportKind::Interceptor
        })
    }

    pub fn extract_error_message(mut self, extract: bool) -> Self {
        self.extract_error_message = extract;
        self
    }
}

/// A request ready for a transport: URL, caller headers and the serialized
/// body. The transport adds the content type that fits the body.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub url: String,
    pub headers: Headers,
    pub body: RequestBody,
}

/// What a transport observed, before any JSON parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// The URL actually requested, after any interceptor rewrites.
    pub url: String,
    pub status: u16,
    pub status_text: String,
    pub headers: Headers,
    pub body: String,
}

/// A response body after opportunistic JSON parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// The body was empty.
    Empty,
    /// The body was valid JSON.
    Json(Value),
    /// The body was not JSON and is kept verbatim.
    Text(String),
}

impl ResponseBody {
    /// Parse `text` as JSON, falling back to the text itself. Never fails.
    pub fn parse(text: &str) -> Self {
        if text.is_empty() {
            return ResponseBody::Empty;
        }
        match serde_json::from_str(text) {
            Ok(value) => ResponseBody::Json(value),
            Err(_) => ResponseBody::Text(text.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ResponseBody::Empty)
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            _ => None,
        }
    }

    /// The body as a string: a JSON string value or unparsed text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ResponseBody::Json(Value::String(s)) => Some(s.as_str()),
            ResponseBody::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// A successful (2xx) response.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Headers,
    pub body: ResponseBody,
}

impl HttpResponse {
    pub(crate) fn from_raw(raw: RawResponse) -> Self {
        Self {
            body: ResponseBody::parse(&raw.body),
            status: raw.status,
            status_text: raw.status_text,
            headers: raw.headers,
        }
    }

    /// Deserialize the body into `T`. Unparsed text deserializes as a JSON
    /// string and an empty body as `null`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        let value = match &self.body {
            ResponseBody::Empty => Value::Null,
            ResponseBody::Json(value) => value.clone(),
            ResponseBody::Text(text) => Value::String(text.clone()),
        };
        serde_json::from_value(value).map_err(Error::Deserialization)
    }
}

/// Flatten a transport's header map. Repeated names are joined with `", "`
/// and values that are not UTF-8 are converted lossily.
pub fn normalize_headers(headers: &http::HeaderMap) -> Headers {
    let mut out = Headers::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        out.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    out
}

/// Reason phrase for a status code, empty when the code has none.
pub fn status_text(status: http::StatusCode) -> String {
    status.canonical_reason().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderMap, HeaderValue, StatusCode};
    use serde_json::json;

    #[test]
    fn parse_empty_body() {
        assert_eq!(ResponseBody::parse(""), ResponseBody::Empty);
    }

    #[test]
    fn parse_json_string_body() {
        let body = ResponseBody::parse(r#""test message""#);
        assert_eq!(body, ResponseBody::Json(json!("test message")));
        assert_eq!(body.as_str(), Some("test message"));
    }

    #[test]
    fn parse_invalid_json_keeps_text() {
        let body = ResponseBody::parse("not json {");
        assert_eq!(body, ResponseBody::Text("not json {".to_string()));
        assert_eq!(body.as_str(), Some("not json {"));
        assert!(body.as_json().is_none());
    }

    #[test]
    fn normalize_headers_joins_duplicates() {
        let mut headers = HeaderMap::new();
        headers.append("set-cookie", HeaderValue::from_static("a=1"));
        headers.append("set-cookie", HeaderValue::from_static("b=2"));
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        let normalized = normalize_headers(&headers);
        assert_eq!(normalized["set-cookie"], "a=1, b=2");
        assert_eq!(normalized["content-type"], "application/json");
        assert_eq!(normalized.len(), 2);
    }

    #[test]
    fn status_text_uses_reason_phrase() {
        assert_eq!(status_text(StatusCode::BAD_REQUEST), "Bad Request");
        assert_eq!(status_text(StatusCode::from_u16(599).unwrap()), "");
    }

    #[test]
    fn fetch_flag_selects_transport() {
        let req: PostRequest = PostRequest::new("http://localhost").fetch(true);
        assert_eq!(req.transport, TransportKind::Fetch);
        let req: PostRequest = PostRequest::new("http://localhost").fetch(false);
        assert_eq!(req.transport, TransportKind::Interceptor);
    }

    #[test]
    fn json_deserializes_parsed_body() {
        let response = HttpResponse::from_raw(RawResponse {
            url: "http://localhost".to_string(),
            status: 200,
            status_text: "OK".to_string(),
            headers: Headers::new(),
            body: "[1,2,3]".to_string(),
        });
        let numbers: Vec<u32> = response.json().unwrap();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn json_reports_type_mismatch() {
        let response = HttpResponse::from_raw(RawResponse {
            url: "http://localhost".to_string(),
            status: 200,
            status_text: "OK".to_string(),
            headers: Headers::new(),
            body: "plain text".to_string(),
        });
        let text: String = response.json().unwrap();
        assert_eq!(text, "plain text");
        let err = response.json::<u32>().unwrap_err();
        assert!(matches!(err, Error::Deserialization(_)));
    }
}
