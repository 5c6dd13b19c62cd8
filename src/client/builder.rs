use crate::client::core::Client;
use crate::transport::{ReqwestTransport, Transport};
use crate::{Error, ErrorContext, Result};
use std::sync::Arc;

/// Builder for creating clients with custom configuration.
///
/// Configuration is fixed once [`ClientBuilder::build`] returns.
pub struct ClientBuilder {
    endpoint: String,
    transport: Option<Arc<dyn Transport>>,
    close_connection_after_request: bool,
}

impl ClientBuilder {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            transport: None,
            close_connection_after_request: false,
        }
    }

    /// Use a specific transport instead of the default `reqwest`-backed one.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Close the connection as soon as each response has been consumed.
    pub fn close_connection_after_request(mut self, enable: bool) -> Self {
        self.close_connection_after_request = enable;
        self
    }

    pub fn build(self) -> Result<Client> {
        let endpoint = url::Url::parse(&self.endpoint).map_err(|e| {
            Error::configuration_with_context(
                "invalid endpoint url",
                ErrorContext::new()
                    .with_field_path("client.endpoint")
                    .with_details(format!("{}: {}", self.endpoint, e))
                    .with_source("client_builder"),
            )
        })?;

        let transport: Arc<dyn Transport> = match self.transport {
            Some(t) => t,
            None => Arc::new(ReqwestTransport::new()?),
        };

        Ok(Client {
            endpoint,
            transport,
            close_connection_after_request: self.close_connection_after_request,
        })
    }
}
