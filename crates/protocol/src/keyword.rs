//! Keyword arguments and execution context.
//!
//! [`KeywordArgs`] carries the optional result-shaping parameters (field
//! selection, ordering, pagination) together with the [`ExecutionContext`]
//! that scopes a call to companies and a timezone. Only `search_read` honours
//! the shaping parameters; every other verb sends [`KeywordArgs::cleared`].

use serde::{Deserialize, Deserializer, Serialize};

/// Timezone applied when the caller does not name one.
pub const DEFAULT_TIMEZONE: &str = "UTC";

// ---------------------------------------------------------------------------
// Execution context
// ---------------------------------------------------------------------------

/// Per-request scoping context (`keyword.context` on the wire).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionContext {
    /// Companies the call may touch. Omitted from the wire when `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_company_ids: Option<Vec<i64>>,

    /// Company used for defaults on created records. Omitted when `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_company_id: Option<i64>,

    /// IANA timezone name; never empty.
    #[serde(
        rename = "tz",
        default = "default_timezone",
        deserialize_with = "non_blank_timezone"
    )]
    timezone: String,
}

impl ExecutionContext {
    /// Creates a context in `timezone`, falling back to [`DEFAULT_TIMEZONE`]
    /// if the name is empty.
    pub fn new(timezone: impl Into<String>) -> Self {
        let timezone = timezone.into();
        Self {
            allowed_company_ids: None,
            default_company_id: None,
            timezone: if timezone.trim().is_empty() {
                DEFAULT_TIMEZONE.to_owned()
            } else {
                timezone
            },
        }
    }

    /// Restricts the call to the given companies.
    #[must_use]
    pub fn with_allowed_company_ids(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.allowed_company_ids = Some(ids.into_iter().collect());
        self
    }

    /// Sets the default company.
    #[must_use]
    pub fn with_default_company_id(mut self, id: i64) -> Self {
        self.default_company_id = Some(id);
        self
    }

    /// Returns the timezone name.
    pub fn timezone(&self) -> &str {
        &self.timezone
    }
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_owned()
}

fn non_blank_timezone<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let timezone = Option::<String>::deserialize(deserializer)?;
    Ok(timezone
        .filter(|tz| !tz.trim().is_empty())
        .unwrap_or_else(default_timezone))
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEZONE)
    }
}

// ---------------------------------------------------------------------------
// Keyword arguments
// ---------------------------------------------------------------------------

/// Optional shaping parameters plus the execution context (`keyword` on the wire).
///
/// Every shaping field is omitted from the JSON body when `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordArgs {
    /// Field names to return.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,

    /// Sort specification, e.g. `"name asc, id desc"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,

    /// Maximum number of records to return.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    /// Number of records to skip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,

    /// Scoping context; always sent.
    #[serde(default)]
    pub context: ExecutionContext,
}

impl KeywordArgs {
    /// Creates keyword arguments carrying only `context`.
    pub fn new(context: ExecutionContext) -> Self {
        Self {
            context,
            ..Self::default()
        }
    }

    /// Selects the fields to return.
    #[must_use]
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the sort specification.
    #[must_use]
    pub fn with_order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    /// Caps the number of returned records.
    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skips the first `offset` records.
    #[must_use]
    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Replaces the execution context.
    #[must_use]
    pub fn with_context(mut self, context: ExecutionContext) -> Self {
        self.context = context;
        self
    }

    /// Returns a copy with `fields`, `order`, `limit` and `offset` removed,
    /// keeping only `context`.
    pub fn cleared(&self) -> Self {
        Self::new(self.context.clone())
    }

    /// Returns `true` if any shaping parameter is set.
    pub fn has_shaping(&self) -> bool {
        self.fields.is_some()
            || self.order.is_some()
            || self.limit.is_some()
            || self.offset.is_some()
    }
}
