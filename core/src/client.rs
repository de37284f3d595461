//! The unified POST entry point.
//!
//! # Design
//! `PostClient` holds one handle per transport and no per-call state. A call
//! serializes the body, hands an [`OutboundRequest`] to the transport picked
//! by the request, and turns the outcome into an [`HttpResponse`] or an
//! [`Error`]. No retries, no timeouts, no caching.

use std::sync::Arc;

use serde::Serialize;

use crate::body::RequestBody;
use crate::error::{Error, RpcError};
use crate::http::{HttpResponse, OutboundRequest, PostRequest, TransportKind};
use crate::transport::{FetchTransport, Interceptor, InterceptorTransport, SendError, Transport};

#[derive(Debug, Clone, Default)]
pub struct PostClient {
    fetch: FetchTransport,
    interceptor: InterceptorTransport,
}

impl PostClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> PostClientBuilder {
        PostClientBuilder::default()
    }

    fn transport(&self, kind: TransportKind) -> &dyn Transport {
        match kind {
            TransportKind::Fetch => &self.fetch,
            TransportKind::Interceptor => &self.interceptor,
        }
    }

    /// Send `request` as a POST.
    ///
    /// Returns [`Error::Rpc`] for a non-2xx answer, [`Error::Transport`] when
    /// there was no answer, and [`Error::Serialization`] when the message is
    /// not representable as JSON.
    pub async fn post<M: Serialize>(&self, request: &PostRequest<M>) -> Result<HttpResponse, Error> {
        let body = RequestBody::build(
            request.message.as_ref(),
            &request.files,
            &request.files_field_name,
        )?;
        let outbound = OutboundRequest {
            url: request.url.clone(),
            headers: request.headers.clone(),
            body,
        };

        match self.transport(request.transport).send(&outbound).await {
            Ok(raw) => {
                tracing::debug!(url = %raw.url, status = raw.status, "received response: {:?}", raw.body);
                Ok(HttpResponse::from_raw(raw))
            }
            Err(SendError::Status(raw)) => {
                let err = RpcError::from_response(raw, request.extract_error_message);
                tracing::warn!(url = %err.url, status = err.status_code, "rpc error");
                Err(err.into())
            }
            Err(SendError::Transport(err)) => Err(err.into()),
        }
    }
}

/// Configures the native clients behind each transport.
#[derive(Default)]
pub struct PostClientBuilder {
    fetch_client: Option<reqwest::Client>,
    agent: Option<ureq::Agent>,
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl PostClientBuilder {
    pub fn fetch_client(mut self, client: reqwest::Client) -> Self {
        self.fetch_client = Some(client);
        self
    }

    /// Agent for the interceptor transport. It should keep
    /// `http_status_as_error(false)`; otherwise error bodies are lost.
    pub fn agent(mut self, agent: ureq::Agent) -> Self {
        self.agent = Some(agent);
        self
    }

    pub fn interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    pub fn build(self) -> PostClient {
        let fetch = self.fetch_client.map(FetchTransport::new).unwrap_or_default();
        let interceptor = self
            .interceptors
            .into_iter()
            .fold(
                self.agent.map(InterceptorTransport::new).unwrap_or_default(),
                InterceptorTransport::with_interceptor,
            );
        PostClient { fetch, interceptor }
    }
}

/// One-shot POST with a default [`PostClient`].
pub async fn post<M: Serialize>(request: &PostRequest<M>) -> Result<HttpResponse, Error> {
    PostClient::new().post(request).await
}
