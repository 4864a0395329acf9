//! Response shapes returned by the gateway.

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error object reported by the gateway.
///
/// Appears either as the whole body of a non-success HTTP response or as the
/// `error` member of a [`ServerResponse`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerError {
    /// Numeric error code (often mirrors the HTTP status).
    pub code: i64,
    /// Human-readable message.
    pub message: String,
    /// Opaque, backend-specific detail (e.g. a traceback).
    #[serde(default)]
    pub data: Option<Value>,
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

/// JSON-RPC style response envelope.
///
/// On a successful call exactly one of `result` / `error` is populated.
///
/// A `"result": null` member is kept as `Some(..)` when `T` itself accepts
/// null (e.g. [`Value`], `Option<_>`, `()`); a missing member, or a null one
/// that `T` cannot represent, leaves `result` as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct ServerResponse<T> {
    /// Protocol version tag, normally `"2.0"`.
    pub jsonrpc: String,
    /// Echo of the request id.
    pub id: String,
    /// Verb-specific payload.
    #[serde(default, deserialize_with = "present_result")]
    pub result: Option<T>,
    /// Logical failure reported by the backend.
    pub error: Option<ServerError>,
}

impl<T> ServerResponse<T> {
    /// Borrows the payload.
    pub fn result(&self) -> Option<&T> {
        self.result.as_ref()
    }

    /// Consumes the response, returning the payload.
    pub fn into_result(self) -> Option<T> {
        self.result
    }

    /// Returns `true` if the response carries neither a result nor an error.
    pub fn is_empty(&self) -> bool {
        self.result.is_none() && self.error.is_none()
    }
}

fn present_result<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(T::deserialize(Value::Null).ok());
    }
    T::deserialize(value)
        .map(Some)
        .map_err(<D::Error as serde::de::Error>::custom)
}
