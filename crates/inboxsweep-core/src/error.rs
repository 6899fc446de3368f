//! Error types for InboxSweep

/// Failure of a single call to the local model service
///
/// These never reach the client: the batch classifier degrades the affected
/// email to a REVIEW classification.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelServiceError {
    /// Service answered with a non-success status
    #[error("Ollama API error: {status} {body}")]
    Status { status: u16, body: String },

    /// Service answered 2xx but the body was not JSON
    #[error("Invalid JSON from Ollama: {0}")]
    InvalidBody(String),

    /// Service reported an error in an otherwise valid body
    #[error("Ollama error: {0}")]
    Service(String),

    /// Connection refused, reset, DNS failure, ...
    #[error("transport error: {0}")]
    Transport(String),

    /// No response within the configured timeout
    #[error("operation timed out")]
    Timeout,
}

impl ModelServiceError {
    /// Create a new transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a new service-level error
    pub fn service(msg: impl Into<String>) -> Self {
        Self::Service(msg.into())
    }
}

/// Errors that cross the scan boundary
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScanError {
    /// Bad client input
    #[error("{0}")]
    InvalidRequest(String),

    /// Local model service unreachable
    #[error("Ollama is not running. Please start Ollama on your local machine.")]
    ServiceUnavailable,

    /// Service reachable but nothing installed to run
    #[error("No models available. Run: ollama pull {default_model}")]
    NoModelInstalled { default_model: String },

    /// Anything unexpected
    #[error("Failed to classify emails: {0}")]
    Internal(String),
}

impl ScanError {
    /// Create a new invalid request error
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
