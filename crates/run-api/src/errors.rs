//! Error types for the run API client.
//!
//! [`TransportError`] covers everything that can go wrong between handing a
//! request to the transport and receiving a successful response.
//! [`RunApiError`] is what the high-level run operations return; it wraps
//! transport failures unchanged and adds the conditions the client itself can
//! detect (bad configuration, unusable operation names).

use thiserror::Error;

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

/// Failures produced by the HTTP transport layer.
///
/// The run client never classifies these further; callers inspect the
/// variant directly.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request never produced an HTTP response (DNS, TLS, connection
    /// reset, ...).
    #[error("Network error calling {url}: {message}")]
    Network {
        /// The URL the request was sent to.
        url: String,
        /// Description from the underlying HTTP stack.
        message: String,
    },

    /// The server answered with a status outside `200..=299`.
    #[error("HTTP {status} from {url}: {body}")]
    Status {
        /// The URL the request was sent to.
        url: String,
        /// Response status code.
        status: u16,
        /// Response body text, as received.
        body: String,
    },

    /// A structured request body could not be encoded as JSON text.
    #[error("Request body could not be serialised: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The merged request could not be turned into a valid HTTP request
    /// (unparseable URL, illegal header value).
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of the problem.
        message: String,
    },
}

impl TransportError {
    /// Returns the HTTP status for [`TransportError::Status`], `None` otherwise.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Run client errors
// ---------------------------------------------------------------------------

/// Errors returned by run client operations.
#[derive(Debug, Error)]
pub enum RunApiError {
    /// The underlying request failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The client configuration is invalid.
    ///
    /// Produced at construction time; a client never exists with an invalid
    /// configuration.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },

    /// An operation descriptor could not be normalised (e.g. empty name).
    #[error("Invalid operation: {message}")]
    InvalidOperation {
        /// Description of the problem.
        message: String,
    },

    /// A step of a serial batch failed; later steps were not issued.
    #[error("Operation '{operation}' (step {step}) failed: {source}")]
    StepFailed {
        /// Zero-based position of the failing operation in the batch.
        step: usize,
        /// Name of the failing operation.
        operation: String,
        /// The transport failure that stopped the batch.
        #[source]
        source: TransportError,
    },
}

impl RunApiError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Returns the HTTP status behind this error, if it came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(e) | Self::StepFailed { source: e, .. } => e.status(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_exposed_through_run_errors() {
        let err = RunApiError::from(TransportError::Status {
            url: "https://example.test/".into(),
            status: 404,
            body: "missing".into(),
        });
        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains("HTTP 404"));
    }

    #[test]
    fn step_failure_keeps_transport_status() {
        let err = RunApiError::StepFailed {
            step: 1,
            operation: "solve".into(),
            source: TransportError::Status {
                url: "u".into(),
                status: 500,
                body: String::new(),
            },
        };
        assert_eq!(err.status(), Some(500));
        assert!(err.to_string().starts_with("Operation 'solve' (step 1) failed"));
    }

    #[test]
    fn network_errors_have_no_status() {
        let err = TransportError::Network {
            url: "u".into(),
            message: "refused".into(),
        };
        assert_eq!(err.status(), None);
    }
}
