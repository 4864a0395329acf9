//! The single error type surfaced by the client.
//!
//! Every failure, whether a programming error (using an unconfigured client),
//! a protocol error (HTTP failure status, unusable body), a timeout or a
//! connectivity problem, is reported as a [`ClientError`]. Callers branch on the
//! variant or on [`ClientError::status_code`]; nothing is retried and nothing
//! is logged on the caller's behalf.

use std::time::Duration;

use protocol::ServerError;
use thiserror::Error;

/// Status reported for a timed-out request.
pub const TIMEOUT_STATUS: u16 = 408;

/// Status reported for a connectivity failure.
pub const NETWORK_STATUS: u16 = 500;

/// Errors returned by every client operation.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The client slot was used before [`crate::ClientSlot::configure`].
    #[error("Client has not been initialized. Call configure() first.")]
    NotInitialized,

    /// [`crate::ClientSlot::configure`] was called a second time.
    #[error("Client has already been initialized.")]
    AlreadyInitialized,

    /// The configuration was rejected while building the client.
    #[error("Invalid client configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration problem.
        message: String,
    },

    /// Caller-supplied record values could not be converted to JSON.
    ///
    /// Raised before anything is sent.
    #[error("Failed to serialize request values")]
    Serialization(#[source] serde_json::Error),

    /// The gateway reported a failure.
    ///
    /// Produced for every non-success HTTP status, and for a success status
    /// whose body carries a populated `error` member.
    #[error("{message}")]
    Server {
        /// HTTP status of the response.
        status: u16,
        /// The server's message, the HTTP reason phrase, or a generic fallback.
        message: String,
        /// The parsed error body, when the gateway sent one.
        server_error: Option<ServerError>,
    },

    /// The gateway answered with a success status but the body was unusable.
    #[error("Failed to deserialize server response.")]
    Deserialization {
        /// HTTP status of the response.
        status: u16,
        /// JSON parse failure, `None` when the body parsed but carried neither
        /// `result` nor `error`.
        #[source]
        source: Option<serde_json::Error>,
    },

    /// The fixed request timeout elapsed.
    #[error("Request Timeout: exceeded client limit of {}ms", .timeout.as_millis())]
    Timeout {
        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// The caller cancelled the request through its cancellation token.
    #[error("Request was cancelled by the caller.")]
    Cancelled,

    /// The request never produced an HTTP response (DNS, refused connection,
    /// TLS, interrupted body).
    #[error("A network error occurred.")]
    Network {
        /// The underlying transport failure.
        #[source]
        source: reqwest::Error,
    },
}

impl ClientError {
    /// HTTP-like status for this error.
    ///
    /// The response status for server and deserialization errors,
    /// [`TIMEOUT_STATUS`] for timeouts, [`NETWORK_STATUS`] for connectivity
    /// failures, and `None` for errors raised before any request was made or
    /// after the caller gave up.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } | Self::Deserialization { status, .. } => Some(*status),
            Self::Timeout { .. } => Some(TIMEOUT_STATUS),
            Self::Network { .. } => Some(NETWORK_STATUS),
            Self::NotInitialized
            | Self::AlreadyInitialized
            | Self::InvalidConfig { .. }
            | Self::Serialization(_)
            | Self::Cancelled => None,
        }
    }

    /// The error object reported by the gateway, if any.
    pub fn server_error(&self) -> Option<&ServerError> {
        match self {
            Self::Server { server_error, .. } => server_error.as_ref(),
            _ => None,
        }
    }

    /// Returns `true` for errors caused by missing, repeated or invalid
    /// configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::NotInitialized | Self::AlreadyInitialized | Self::InvalidConfig { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_names_the_configured_limit() {
        let error = ClientError::Timeout {
            timeout: Duration::from_millis(45_000),
        };
        assert_eq!(error.status_code(), Some(408));
        assert_eq!(
            error.to_string(),
            "Request Timeout: exceeded client limit of 45000ms"
        );
    }

    #[test]
    fn server_error_exposes_status_and_body() {
        let error = ClientError::Server {
            status: 404,
            message: "Model not found".to_owned(),
            server_error: Some(ServerError {
                code: 404,
                message: "Model not found".to_owned(),
                data: None,
            }),
        };
        assert_eq!(error.status_code(), Some(404));
        assert_eq!(error.server_error().unwrap().message, "Model not found");
        assert_eq!(error.to_string(), "Model not found");
        assert!(!error.is_configuration());
    }

    #[test]
    fn configuration_errors_carry_no_status() {
        for error in [ClientError::NotInitialized, ClientError::AlreadyInitialized] {
            assert!(error.is_configuration());
            assert_eq!(error.status_code(), None);
            assert!(error.server_error().is_none());
        }
        assert_eq!(ClientError::Cancelled.status_code(), None);
    }
}
