use crate::graphql::GraphQlErrors;
use crate::transport::TransportError;
use thiserror::Error;

/// Structured error context for configuration failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Configuration key that caused the error (e.g., "client.endpoint")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., the rejected value)
    pub details: Option<String>,
    /// Source of the error (e.g., "client_builder", "reqwest_transport")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for a single request/response cycle.
///
/// Exactly one variant is produced per failed call, so callers can match on the
/// category without inspecting messages.
#[derive(Debug, Error)]
pub enum Error {
    /// The cancellation token fired before or during the call.
    #[error("request cancelled")]
    Cancelled,

    /// A variable could not be represented as JSON.
    #[error("encode body: {0}")]
    Encoding(#[source] serde_json::Error),

    /// The transport could not complete the exchange.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The response body could not be read to completion.
    #[error("reading body: {0}")]
    Io(#[from] std::io::Error),

    /// The body did not decode and the status was not 200.
    #[error("graphql: server returned a non-200 status code: {status}")]
    NonSuccessStatus { status: u16 },

    /// The body did not decode although the status was 200.
    #[error("decoding response: {0}")]
    Decoding(#[source] serde_json::Error),

    /// The service answered but reported one or more errors.
    #[error(transparent)]
    Service(#[from] GraphQlErrors),

    /// The client could not be configured (bad endpoint, HTTP client build failure).
    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } => Some(context),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// HTTP status carried by a [`Error::NonSuccessStatus`].
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::NonSuccessStatus { status } => Some(*status),
            _ => None,
        }
    }

    /// Service-reported errors, if the call failed at the domain level.
    pub fn service_errors(&self) -> Option<&GraphQlErrors> {
        match self {
            Error::Service(errors) => Some(errors),
            _ => None,
        }
    }
}
