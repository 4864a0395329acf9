//! Gateway transport.
//!
//! [`Transport`] owns the long-lived HTTP client bound to the configured
//! gateway and performs exactly one POST per [`Envelope`]. It is the only
//! place where HTTP outcomes are turned into [`ClientError`] variants:
//!
//! | Outcome | Result |
//! |---------|--------|
//! | 2xx, body parses, `result` present | `Ok(ServerResponse)` |
//! | 2xx, body parses, `error` present | [`ClientError::Server`] |
//! | 2xx, body unusable, or no `result` member | [`ClientError::Deserialization`] |
//! | 2xx, `"result": null` and `T` accepts null | `Ok(ServerResponse)` |
//! | non-2xx | [`ClientError::Server`] with the parsed body when possible |
//! | fixed timeout elapsed | [`ClientError::Timeout`] (408) |
//! | caller cancelled | [`ClientError::Cancelled`] |
//! | no HTTP response | [`ClientError::Network`] (500) |
//!
//! No retries are performed.

use std::time::Duration;

use protocol::{Envelope, InstanceCredentials, ServerError, ServerResponse};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::{ClientConfig, ClientError};

/// Upper bound on one round trip, from connect to the last body byte.
pub const REQUEST_TIMEOUT: Duration = Duration::from_millis(45_000);

/// Header carrying the gateway API key.
pub const API_KEY_HEADER: &str = "x-api-key";

const USER_AGENT: &str = concat!("odxproxy-client/", env!("CARGO_PKG_VERSION"));

const UNKNOWN_ERROR: &str = "An unknown error occurred.";

/// HTTP connection to the gateway plus the instance every request targets.
///
/// Read-only after construction; share it behind an `Arc`.
#[derive(Debug)]
pub struct Transport {
    http: reqwest::Client,
    endpoint: Url,
    instance: InstanceCredentials,
    timeout: Duration,
}

impl Transport {
    /// Builds the transport for `config` with the fixed [`REQUEST_TIMEOUT`].
    ///
    /// Fails with [`ClientError::InvalidConfig`] if the gateway URL is not an
    /// absolute URL or the proxy key cannot be sent as a header value.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        Self::with_timeout(config, REQUEST_TIMEOUT)
    }

    pub(crate) fn with_timeout(
        config: ClientConfig,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let endpoint = config.endpoint()?;

        let mut api_key = HeaderValue::from_str(&config.proxy_api_key).map_err(|_| {
            ClientError::InvalidConfig {
                message: "proxy API key contains characters not allowed in an HTTP header"
                    .to_owned(),
            }
        })?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(API_KEY_HEADER, api_key);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ClientError::InvalidConfig {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        debug!(endpoint = %endpoint, "gateway transport ready");

        Ok(Self {
            http,
            endpoint,
            instance: config.instance,
            timeout,
        })
    }

    /// Credentials embedded in every envelope sent through this transport.
    pub fn instance(&self) -> &InstanceCredentials {
        &self.instance
    }

    /// Absolute URL envelopes are posted to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Round-trip timeout applied to every request.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sends `request` and returns the typed response.
    ///
    /// `cancellation` aborts the in-flight wait with [`ClientError::Cancelled`];
    /// the transport's own timeout always surfaces as [`ClientError::Timeout`].
    #[instrument(
        name = "gateway.execute",
        skip_all,
        fields(request_id = %request.id(), action = %request.action(), model = %request.model())
    )]
    pub async fn execute<T: DeserializeOwned>(
        &self,
        request: &Envelope,
        cancellation: Option<&CancellationToken>,
    ) -> Result<ServerResponse<T>, ClientError> {
        let round_trip = tokio::time::timeout(self.timeout, self.round_trip(request));

        let outcome = match cancellation {
            Some(token) => tokio::select! {
                biased;
                () = token.cancelled() => {
                    debug!("request cancelled by caller");
                    return Err(ClientError::Cancelled);
                }
                outcome = round_trip => outcome,
            },
            None => round_trip.await,
        };

        outcome.map_err(|_elapsed| {
            debug!(timeout_ms = self.timeout.as_millis() as u64, "request timed out");
            ClientError::Timeout {
                timeout: self.timeout,
            }
        })?
    }

    async fn round_trip<T: DeserializeOwned>(
        &self,
        request: &Envelope,
    ) -> Result<ServerResponse<T>, ClientError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        debug!(status = status.as_u16(), "gateway responded");

        if !status.is_success() {
            // The body is advisory here; an unreadable one only degrades the message.
            let body = response.bytes().await.ok();
            return Err(failure_status(status, body.as_deref()));
        }

        let body = response.bytes().await.map_err(|e| self.classify(e))?;
        decode_success(status, &body)
    }

    fn classify(&self, error: reqwest::Error) -> ClientError {
        if error.is_timeout() {
            ClientError::Timeout {
                timeout: self.timeout,
            }
        } else {
            ClientError::Network { source: error }
        }
    }
}

/// Builds the error for a non-success status from whatever body was received.
fn failure_status(status: StatusCode, body: Option<&[u8]>) -> ClientError {
    let server_error = body.and_then(|b| serde_json::from_slice::<ServerError>(b).ok());
    let message = server_error
        .as_ref()
        .map(|e| e.message.clone())
        .or_else(|| status.canonical_reason().map(str::to_owned))
        .unwrap_or_else(|| UNKNOWN_ERROR.to_owned());

    ClientError::Server {
        status: status.as_u16(),
        message,
        server_error,
    }
}

/// Parses a success-status body, promoting a populated `error` member to
/// [`ClientError::Server`].
fn decode_success<T: DeserializeOwned>(
    status: StatusCode,
    body: &[u8],
) -> Result<ServerResponse<T>, ClientError> {
    let mut response: ServerResponse<T> =
        serde_json::from_slice(body).map_err(|source| ClientError::Deserialization {
            status: status.as_u16(),
            source: Some(source),
        })?;

    if response.is_empty() {
        return Err(ClientError::Deserialization {
            status: status.as_u16(),
            source: None,
        });
    }

    if let Some(error) = response.error.take() {
        return Err(ClientError::Server {
            status: status.as_u16(),
            message: error.message.clone(),
            server_error: Some(error),
        });
    }

    Ok(response)
}
