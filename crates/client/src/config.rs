//! One-time client configuration.

use protocol::InstanceCredentials;
use reqwest::Url;
use serde::Deserialize;

use crate::ClientError;

/// Gateway used when [`ClientConfig::gateway_url`] is `None`.
pub const DEFAULT_GATEWAY_URL: &str = "https://gateway.odxproxy.io";

/// Path every envelope is posted to, relative to the gateway base.
pub const EXECUTE_PATH: &str = "/api/odoo/execute";

/// Everything the client needs to reach the gateway and the backend instance.
///
/// Deserializable from the same JSON shape the gateway documentation uses:
///
/// ```json
/// {
///   "instance": {
///     "url": "https://erp.example.com",
///     "user_id": 2,
///     "db": "prod",
///     "api_key": "..."
///   },
///   "odx_api_key": "...",
///   "gateway_url": "https://gateway.odxproxy.io"
/// }
/// ```
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    /// Backend instance every request targets.
    pub instance: InstanceCredentials,

    /// Key sent in the `x-api-key` header to authenticate against the gateway.
    #[serde(rename = "odx_api_key")]
    pub proxy_api_key: String,

    /// Gateway base URL. `None` selects [`DEFAULT_GATEWAY_URL`].
    #[serde(default)]
    pub gateway_url: Option<String>,
}

impl ClientConfig {
    /// Creates a configuration pointing at the default gateway.
    pub fn new(instance: InstanceCredentials, proxy_api_key: impl Into<String>) -> Self {
        Self {
            instance,
            proxy_api_key: proxy_api_key.into(),
            gateway_url: None,
        }
    }

    /// Overrides the gateway base URL.
    #[must_use]
    pub fn with_gateway_url(mut self, url: impl Into<String>) -> Self {
        self.gateway_url = Some(url.into());
        self
    }

    /// The effective gateway base, without trailing slashes.
    pub fn gateway_base(&self) -> &str {
        self.gateway_url
            .as_deref()
            .unwrap_or(DEFAULT_GATEWAY_URL)
            .trim_end_matches('/')
    }

    /// The absolute URL envelopes are posted to.
    pub fn endpoint(&self) -> Result<Url, ClientError> {
        let raw = format!("{}{EXECUTE_PATH}", self.gateway_base());
        Url::parse(&raw).map_err(|e| ClientError::InvalidConfig {
            message: format!(
                "gateway URL '{}' is not a valid absolute URL: {e}",
                self.gateway_base()
            ),
        })
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("instance", &self.instance)
            .field("proxy_api_key", &"<redacted>")
            .field("gateway_url", &self.gateway_url)
            .finish()
    }
}
