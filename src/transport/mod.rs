//! Transport collaborator seam.
//!
//! The client never talks to the network directly; it hands a fully built
//! [`HttpRequest`] to a [`Transport`] and gets back a status and a body stream.

mod http;

pub use http::ReqwestTransport;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;

/// Response body as a stream of chunks. Read errors surface as `io::Error`.
pub type BodyStream = Pin<Box<dyn Stream<Item = std::io::Result<Bytes>> + Send + 'static>>;

/// A wire-ready HTTP request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: reqwest::Method,
    pub url: url::Url,
    /// Headers in send order. Repeated names are sent as repeated values.
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
    /// Ask the transport not to keep the connection alive after this request.
    pub close_connection: bool,
}

pub struct HttpResponse {
    pub status: u16,
    pub body: BodyStream,
}

impl HttpResponse {
    /// Build a response from an in-memory body.
    pub fn from_bytes(status: u16, body: impl Into<Bytes>) -> Self {
        let chunk: std::io::Result<Bytes> = Ok(body.into());
        Self {
            status,
            body: Box::pin(futures::stream::once(async move { chunk })),
        }
    }
}

impl std::fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// An HTTP-capable collaborator.
///
/// Implementations perform exactly one exchange per call and must not retry.
/// Cancellation is handled by the caller dropping the returned future.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}
