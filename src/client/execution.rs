//! Single-attempt request execution: encode, send, buffer, decode, classify.

use crate::codec::{self, JSON_MEDIA_TYPE};
use crate::request::Request;
use crate::transport::{BodyStream, HttpRequest};
use crate::{Error, Result};
use bytes::{Bytes, BytesMut};
use futures::TryStreamExt;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::core::Client;

const HTTP_OK: u16 = 200;

impl Client {
    pub(crate) async fn run_once<T>(
        &self,
        cancel: &CancellationToken,
        request: &Request,
        holder: Option<&mut T>,
    ) -> Result<()>
    where
        T: DeserializeOwned,
    {
        let request_id = Uuid::new_v4();
        let http_request = self.build_http_request(request)?;

        debug!(
            request_id = %request_id,
            endpoint = self.endpoint.as_str(),
            variables = request.variables().map_or(0, |v| v.len()),
            headers = http_request.headers.len(),
            "gql-http request started"
        );

        let start = std::time::Instant::now();
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            r = self.transport.send(http_request) => r?,
        };

        let status = response.status;
        let body = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            r = read_body(response.body) => r?,
        };

        let outcome = classify(status, codec::decode(&body, holder));

        match &outcome {
            Ok(()) => info!(
                request_id = %request_id,
                http_status = status,
                duration_ms = start.elapsed().as_millis() as u64,
                "gql-http request succeeded"
            ),
            Err(e) => warn!(
                request_id = %request_id,
                http_status = status,
                duration_ms = start.elapsed().as_millis() as u64,
                error = %e,
                "gql-http request failed"
            ),
        }

        outcome
    }

    /// Fixed JSON headers first, then the request's own headers appended in order.
    pub(crate) fn build_http_request(&self, request: &Request) -> Result<HttpRequest> {
        let body = codec::encode(request)?;

        let mut headers = Vec::with_capacity(2 + request.headers().len());
        headers.push(("Content-Type".to_string(), JSON_MEDIA_TYPE.to_string()));
        headers.push(("Accept".to_string(), JSON_MEDIA_TYPE.to_string()));
        headers.extend(request.headers().iter().cloned());

        Ok(HttpRequest {
            method: reqwest::Method::POST,
            url: self.endpoint.clone(),
            headers,
            body,
            close_connection: self.close_connection_after_request,
        })
    }
}

async fn read_body(body: BodyStream) -> std::io::Result<Bytes> {
    let buf = body
        .try_fold(BytesMut::new(), |mut acc, chunk| async move {
            acc.extend_from_slice(&chunk);
            Ok(acc)
        })
        .await?;
    Ok(buf.freeze())
}

/// Status only decides the outcome when the body failed to decode.
fn classify(status: u16, decoded: Result<crate::GraphQlErrors>) -> Result<()> {
    match decoded {
        Err(_) if status != HTTP_OK => Err(Error::NonSuccessStatus { status }),
        Err(e) => Err(e),
        Ok(errors) if !errors.is_empty() => Err(Error::Service(errors)),
        Ok(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientBuilder;
    use crate::graphql::{GraphQlError, GraphQlErrors};
    use crate::transport::{HttpResponse, Transport, TransportError};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct Unreachable;

    #[async_trait]
    impl Transport for Unreachable {
        async fn send(&self, _: HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
            Err(TransportError::Other("not used".into()))
        }
    }

    fn client(close: bool) -> Client {
        ClientBuilder::new("http://example.test/graphql")
            .transport(Arc::new(Unreachable))
            .close_connection_after_request(close)
            .build()
            .unwrap()
    }

    #[test]
    fn fixed_headers_come_first_and_request_headers_append() {
        let req = Request::builder("{ a }")
            .header("Accept", "application/graphql-response+json")
            .header("X-Test", "1")
            .build();
        let http = client(false).build_http_request(&req).unwrap();

        let pairs: Vec<(&str, &str)> = http
            .headers
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("Content-Type", JSON_MEDIA_TYPE),
                ("Accept", JSON_MEDIA_TYPE),
                ("Accept", "application/graphql-response+json"),
                ("X-Test", "1"),
            ]
        );
        assert_eq!(http.method, reqwest::Method::POST);
        assert_eq!(http.url.as_str(), "http://example.test/graphql");
        assert!(!http.close_connection);
    }

    #[test]
    fn close_flag_propagates() {
        let http = client(true).build_http_request(&Request::new("")).unwrap();
        assert!(http.close_connection);
    }

    #[test]
    fn classify_prefers_status_when_body_is_undecodable() {
        let parse = serde_json::from_slice::<serde_json::Value>(b"<html>").unwrap_err();
        let err = classify(502, Err(Error::Decoding(parse))).unwrap_err();
        assert_eq!(err.status(), Some(502));
    }

    #[test]
    fn classify_keeps_decoding_error_on_ok_status() {
        let parse = serde_json::from_slice::<serde_json::Value>(b"").unwrap_err();
        let err = classify(200, Err(Error::Decoding(parse))).unwrap_err();
        assert!(matches!(err, Error::Decoding(_)));
    }

    #[test]
    fn classify_reports_service_errors_regardless_of_status() {
        let errors = GraphQlErrors::from(vec![GraphQlError::new("denied")]);
        let err = classify(403, Ok(errors)).unwrap_err();
        assert_eq!(err.to_string(), "graphql: denied");
        assert!(classify(500, Ok(GraphQlErrors::default())).is_ok());
    }

    #[tokio::test]
    async fn read_body_concatenates_chunks() {
        let chunks: Vec<std::io::Result<Bytes>> =
            vec![Ok(Bytes::from_static(b"{\"da")), Ok(Bytes::from_static(b"ta\":1}"))];
        let body: BodyStream = Box::pin(futures::stream::iter(chunks));
        assert_eq!(read_body(body).await.unwrap(), Bytes::from_static(b"{\"data\":1}"));
    }
}
