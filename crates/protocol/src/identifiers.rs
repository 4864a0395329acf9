//! Newtype identifiers carried on the wire.
//!
//! Each identifier is a distinct newtype so that, for example, a [`ModelName`]
//! can never be passed where a [`MethodName`] is expected even though both are
//! strings underneath. All of them serialize transparently as their inner value.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: String-backed
// ---------------------------------------------------------------------------

string_id! {
    /// Correlates one request with its response (`id` on both sides of the wire).
    ///
    /// Callers may supply their own; otherwise [`RequestId::generate`] produces
    /// a time-ordered UUIDv7, so ids sort by creation time in gateway logs.
    RequestId
}

impl RequestId {
    /// Generates a fresh, collision-resistant request identifier.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }
}

string_id! {
    /// Technical name of a backend model, e.g. `"res.partner"` or `"sale.order"`.
    ///
    /// Sent as `model_id` in every envelope.
    ModelName
}

string_id! {
    /// Name of a public model method invoked through `call_method`
    /// (e.g. `"action_confirm"`). Sent as `fn_name`.
    MethodName
}

// ---------------------------------------------------------------------------
// Identifiers: integer-backed
// ---------------------------------------------------------------------------

/// Database id of a single record, assigned by the backend.
///
/// Serializes as a bare JSON number so `Vec<RecordId>` is wire-identical to
/// a plain integer array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(i64);

impl RecordId {
    /// Creates a record identifier from a raw integer.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the underlying integer value.
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
