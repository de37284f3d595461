//! One POST contract over two HTTP transports.
//!
//! # Overview
//! A caller describes a call with [`PostRequest`] and gets back either an
//! [`HttpResponse`] or an [`Error`]. The request picks a transport:
//! a fetch-style `reqwest` client or an interceptor-style `ureq` agent. Both
//! produce the same response shape and the same [`RpcError`] for non-2xx
//! answers.
//!
//! # Design
//! - Body serialization (JSON text or multipart form) is transport-neutral;
//!   see [`body`].
//! - Transports implement [`transport::Transport`] and return the body as
//!   text. JSON parsing happens once, in the client, for both success and
//!   error bodies, and never fails the call.
//! - Faults with no HTTP response are passed through, not converted into
//!   RPC errors.

pub mod body;
pub mod client;
pub mod error;
pub mod http;
pub mod transport;

pub use body::{serialize_obj, RequestBody};
pub use client::{post, PostClient, PostClientBuilder};
pub use error::{Error, RpcError, TransportError};
pub use crate::http::{Attachment, Headers, HttpResponse, PostRequest, ResponseBody, TransportKind};
pub use transport::{Interceptor, LoggingInterceptor};
