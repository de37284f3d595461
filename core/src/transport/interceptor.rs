//! Interceptor-style transport over a blocking `ureq` agent.
//!
//! # Design
//! The inner client behaves like an interceptor-based HTTP library: hooks see
//! every outgoing request and every outcome, and a status outside 2xx is
//! raised as a [`ClientError`] that carries the response. The adapter catches
//! that error and splits it back into "server answered" (the response is
//! embedded) and "no answer" (a network fault, passed through untouched).
//!
//! `ureq` is synchronous, so each call runs on tokio's blocking pool with its
//! own clone of the request.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use super::{caller_headers, SendError, Transport};
use crate::body::{MultipartForm, RequestBody, JSON_CONTENT_TYPE};
use crate::error::TransportError;
use crate::http::{normalize_headers, status_text, Headers, OutboundRequest, RawResponse};

/// Hooks run around every call made by [`InterceptorTransport`].
pub trait Interceptor: Send + Sync {
    /// Called before the request is sent. May rewrite the URL, headers or
    /// body; the response and any [`crate::RpcError`] report the rewritten URL.
    fn on_request(&self, _request: &mut OutboundRequest) {}

    /// Called after a 2xx response has been read.
    fn on_response(&self, _request: &OutboundRequest, _response: &RawResponse) {}

    /// Called when the client raises an error, with or without a response.
    fn on_error(&self, _request: &OutboundRequest, _error: &ClientError) {}
}

/// Logs requests and outcomes through `tracing`. Header values and bodies
/// are not logged.
#[derive(Debug, Clone, Default)]
pub struct LoggingInterceptor;

impl Interceptor for LoggingInterceptor {
    fn on_request(&self, request: &mut OutboundRequest) {
        tracing::debug!(target: "post_core::http", url = %request.url, "sending request");
    }

    fn on_response(&self, request: &OutboundRequest, response: &RawResponse) {
        tracing::debug!(target: "post_core::http", url = %request.url, status = response.status, "response received");
    }

    fn on_error(&self, request: &OutboundRequest, error: &ClientError) {
        tracing::debug!(target: "post_core::http", url = %request.url, err = %error, "request error");
    }
}

/// The error raised by the inner client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a status outside 2xx.
    #[error("request failed with status code {}", .0.status)]
    Status(RawResponse),

    /// No response was received.
    #[error(transparent)]
    Network(ureq::Error),
}

impl ClientError {
    pub fn response(&self) -> Option<&RawResponse> {
        match self {
            ClientError::Status(raw) => Some(raw),
            ClientError::Network(_) => None,
        }
    }

    /// The embedded response, or the network fault when there is none.
    pub fn into_response(self) -> Result<RawResponse, ureq::Error> {
        match self {
            ClientError::Status(raw) => Ok(raw),
            ClientError::Network(err) => Err(err),
        }
    }
}

#[derive(Clone)]
pub struct InterceptorTransport {
    agent: ureq::Agent,
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl Default for InterceptorTransport {
    fn default() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self::new(agent)
    }
}

impl std::fmt::Debug for InterceptorTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptorTransport")
            .field("interceptors", &self.interceptors.len())
            .finish_non_exhaustive()
    }
}

impl InterceptorTransport {
    pub fn new(agent: ureq::Agent) -> Self {
        Self {
            agent,
            interceptors: Vec::new(),
        }
    }

    pub fn with_interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }
}

#[async_trait]
impl Transport for InterceptorTransport {
    async fn send(&self, request: &OutboundRequest) -> Result<RawResponse, SendError> {
        let agent = self.agent.clone();
        let interceptors = self.interceptors.clone();
        let request = request.clone();

        let outcome = tokio::task::spawn_blocking(move || dispatch(&agent, &interceptors, request))
            .await
            .map_err(TransportError::Blocking)?;

        outcome.map_err(|err| match err.into_response() {
            Ok(raw) => SendError::Status(raw),
            Err(err) => SendError::Transport(TransportError::Interceptor(err)),
        })
    }
}

fn dispatch(
    agent: &ureq::Agent,
    interceptors: &[Arc<dyn Interceptor>],
    mut request: OutboundRequest,
) -> Result<RawResponse, ClientError> {
    for interceptor in interceptors {
        interceptor.on_request(&mut request);
    }
    let result = execute(agent, &request);
    for interceptor in interceptors {
        match &result {
            Ok(raw) => interceptor.on_response(&request, raw),
            Err(err) => interceptor.on_error(&request, err),
        }
    }
    result
}

fn execute(agent: &ureq::Agent, request: &OutboundRequest) -> Result<RawResponse, ClientError> {
    let mut builder = agent.post(request.url.as_str());
    for (name, value) in caller_headers(request) {
        builder = builder.header(name, value);
    }

    let sent = match &request.body {
        RequestBody::Json(text) => {
            let builder = builder.header("content-type", JSON_CONTENT_TYPE);
            match text {
                Some(text) => builder.send(text.as_bytes()),
                None => builder.send_empty(),
            }
        }
        RequestBody::Multipart(form) => {
            let boundary = MultipartForm::boundary();
            builder
                .header("content-type", MultipartForm::content_type(&boundary))
                .send(&form.encode(&boundary)[..])
        }
    };

    let mut response = match sent {
        Ok(response) => response,
        // An agent configured to treat statuses as errors drops the body;
        // keep the status so the caller still sees a server answer.
        Err(ureq::Error::StatusCode(code)) => {
            return Err(ClientError::Status(RawResponse {
                url: request.url.clone(),
                status: code,
                status_text: http::StatusCode::from_u16(code)
                    .map(status_text)
                    .unwrap_or_default(),
                headers: Headers::new(),
                body: String::new(),
            }))
        }
        Err(err) => return Err(ClientError::Network(err)),
    };

    let status = response.status();
    let headers = normalize_headers(response.headers());
    // No size cap and lossy decoding, matching reqwest's `text()`.
    let bytes = response
        .body_mut()
        .with_config()
        .limit(u64::MAX)
        .read_to_vec()
        .map_err(ClientError::Network)?;
    let raw = RawResponse {
        url: request.url.clone(),
        status: status.as_u16(),
        status_text: status_text(status),
        headers,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    };

    if !status.is_success() {
        return Err(ClientError::Status(raw));
    }
    Ok(raw)
}
