use super::{HttpRequest, HttpResponse, Transport, TransportError};
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::header::CONNECTION;
use reqwest::Proxy;
use std::env;
use std::time::Duration;

/// Default [`Transport`] backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a client with production-friendly defaults (env-overridable).
    pub fn new() -> Result<Self> {
        let timeout_secs = env_parse::<u64>("GQL_HTTP_TIMEOUT_SECS").unwrap_or(30);

        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .pool_max_idle_per_host(env_parse::<usize>("GQL_HTTP_POOL_MAX_IDLE_PER_HOST").unwrap_or(32))
            .pool_idle_timeout(Some(Duration::from_secs(
                env_parse::<u64>("GQL_HTTP_POOL_IDLE_TIMEOUT_SECS").unwrap_or(90),
            )));

        if let Ok(proxy_url) = env::var("GQL_PROXY_URL") {
            let proxy = Proxy::all(&proxy_url).map_err(|e| {
                Error::configuration_with_context(
                    "invalid proxy url",
                    ErrorContext::new()
                        .with_field_path("GQL_PROXY_URL")
                        .with_details(e.to_string())
                        .with_source("reqwest_transport"),
                )
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().map_err(|e| {
            Error::configuration_with_context(
                "failed to build HTTP client",
                ErrorContext::new()
                    .with_details(e.to_string())
                    .with_source("reqwest_transport"),
            )
        })?;

        Ok(Self { client })
    }

    /// Wrap a caller-configured client (TLS, timeouts, pooling are its concern).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse::<T>().ok())
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        let mut req = self.client.request(request.method, request.url);

        // RequestBuilder::header appends, so repeated names stay repeated.
        for (name, value) in &request.headers {
            req = req.header(name.as_str(), value.as_str());
        }
        if request.close_connection {
            req = req.header(CONNECTION, "close");
        }

        let resp = req.body(request.body).send().await?;
        let status = resp.status().as_u16();
        let body = resp
            .bytes_stream()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e));

        Ok(HttpResponse {
            status,
            body: Box::pin(body),
        })
    }
}
