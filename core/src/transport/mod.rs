//! Transport adapters.
//!
//! # Design
//! Both adapters implement [`Transport`] and must be indistinguishable to the
//! caller: same headers in, same [`RawResponse`] out, same split between a
//! non-2xx answer ([`SendError::Status`]) and no answer at all
//! ([`SendError::Transport`]). How each one detects a failed status is its
//! own business.

mod fetch;
mod interceptor;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::http::{OutboundRequest, RawResponse};

pub use fetch::FetchTransport;
pub use interceptor::{ClientError, Interceptor, InterceptorTransport, LoggingInterceptor};

/// Why a transport did not return a successful response.
#[derive(Debug)]
pub enum SendError {
    /// The server answered with a non-2xx status.
    Status(RawResponse),
    /// No response was received.
    Transport(TransportError),
}

impl From<TransportError> for SendError {
    fn from(err: TransportError) -> Self {
        SendError::Transport(err)
    }
}

impl From<reqwest::Error> for SendError {
    fn from(err: reqwest::Error) -> Self {
        SendError::Transport(err.into())
    }
}

/// Executes one POST and reads the whole body as text.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &OutboundRequest) -> Result<RawResponse, SendError>;
}

/// Caller headers minus any content type; the transport sets its own.
pub(crate) fn caller_headers(request: &OutboundRequest) -> impl Iterator<Item = (&str, &str)> {
    request
        .headers
        .iter()
        .filter(|(name, _)| !name.eq_ignore_ascii_case("content-type"))
        .map(|(name, value)| (name.as_str(), value.as_str()))
}
