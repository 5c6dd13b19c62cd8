use crate::request::Request;
use crate::transport::Transport;
use crate::Result;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Client bound to one endpoint.
///
/// Immutable after construction and cheap to clone; every call keeps its own request
/// and response buffer, so one client can serve concurrent calls.
#[derive(Clone)]
pub struct Client {
    pub(crate) endpoint: url::Url,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) close_connection_after_request: bool,
}

impl Client {
    /// Create a client with the default transport.
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        crate::client::builder::ClientBuilder::new(endpoint).build()
    }

    pub fn endpoint(&self) -> &url::Url {
        &self.endpoint
    }

    pub fn closes_connection_after_request(&self) -> bool {
        self.close_connection_after_request
    }

    /// Execute `request` and decode the `data` field into `holder`.
    ///
    /// Pass `None` to skip payload decoding. Exactly one transport attempt is made.
    /// If the service reports errors they are returned as [`crate::Error::Service`];
    /// any partial `data` has already been written to `holder` at that point.
    pub async fn run<T>(
        &self,
        cancel: &CancellationToken,
        request: &Request,
        holder: Option<&mut T>,
    ) -> Result<()>
    where
        T: DeserializeOwned,
    {
        if cancel.is_cancelled() {
            return Err(crate::Error::Cancelled);
        }
        self.run_once(cancel, request, holder).await
    }

    /// Execute `request` and return the decoded `data` payload.
    ///
    /// `None` means the envelope carried no (or a null) `data` field.
    pub async fn execute<T>(&self, cancel: &CancellationToken, request: &Request) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let mut holder: Option<T> = None;
        self.run(cancel, request, Some(&mut holder)).await?;
        Ok(holder)
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("endpoint", &self.endpoint.as_str())
            .field(
                "close_connection_after_request",
                &self.close_connection_after_request,
            )
            .finish_non_exhaustive()
    }
}
