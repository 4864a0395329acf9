//! Backend instance credentials.

use serde::{Deserialize, Serialize};

/// Identifies which backend instance (tenant database) a request targets and
/// how the gateway authenticates against it.
///
/// Supplied once at configuration time and embedded verbatim as
/// `odoo_instance` in every envelope.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceCredentials {
    /// Base URL of the backend instance, e.g. `"https://erp.example.com"`.
    pub url: String,
    /// Numeric id of the backend user the API key belongs to.
    pub user_id: i64,
    /// Database name on the backend instance.
    #[serde(rename = "db")]
    pub database: String,
    /// Backend API key for `user_id`.
    pub api_key: String,
}

impl InstanceCredentials {
    /// Creates a new set of instance credentials.
    pub fn new(
        url: impl Into<String>,
        user_id: i64,
        database: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            user_id,
            database: database.into(),
            api_key: api_key.into(),
        }
    }
}

impl std::fmt::Debug for InstanceCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceCredentials")
            .field("url", &self.url)
            .field("user_id", &self.user_id)
            .field("database", &self.database)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_with_wire_field_names() {
        let creds = InstanceCredentials::new("https://erp.example.com", 2, "prod", "secret");
        assert_eq!(
            serde_json::to_value(&creds).unwrap(),
            json!({
                "url": "https://erp.example.com",
                "user_id": 2,
                "db": "prod",
                "api_key": "secret"
            })
        );
    }

    #[test]
    fn debug_output_hides_the_api_key() {
        let creds = InstanceCredentials::new("https://erp.example.com", 2, "prod", "secret");
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("prod"));
    }
}
