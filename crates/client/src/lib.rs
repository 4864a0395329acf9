//! ODX proxy gateway client.
//!
//! Sends typed CRUD operations to a backend instance through the ODX proxy
//! gateway: every call becomes one JSON [`protocol::Envelope`] posted to
//! `{gateway}/api/odoo/execute`, and every answer comes back as a
//! [`protocol::ServerResponse`] or a [`ClientError`].
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP transport, header handling, timeouts, cancellation
//! and error classification live here. Wire shapes come from the [`protocol`]
//! crate.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`config`] | [`ClientConfig`], gateway URL normalization |
//! | [`error`] | [`ClientError`] |
//! | [`transport`] | [`Transport`]: one round trip, outcome classification |
//! | [`operations`] | [`OdxClient`]: one method per verb, [`CallOptions`] |
//! | [`slot`] | [`ClientSlot`]: write-once configuration guard |
//!
//! ## Example
//!
//! ```no_run
//! use client::{CallOptions, ClientConfig, OdxClient};
//! use protocol::{Domain, InstanceCredentials, KeywordArgs, ModelName};
//!
//! # async fn run() -> Result<(), client::ClientError> {
//! let instance = InstanceCredentials::new("https://erp.example.com", 2, "prod", "backend-key");
//! let client = OdxClient::new(ClientConfig::new(instance, "proxy-key"))?;
//!
//! let partners = ModelName::new("res.partner").expect("non-empty");
//! let ids = client
//!     .search(
//!         &partners,
//!         Domain::new().condition("is_company", "=", true),
//!         &KeywordArgs::default(),
//!         CallOptions::new(),
//!     )
//!     .await?;
//! println!("{:?}", ids.result());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod operations;
pub mod slot;
pub mod transport;

#[cfg(test)]
mod test_gateway;

pub use config::{ClientConfig, DEFAULT_GATEWAY_URL, EXECUTE_PATH};
pub use error::{ClientError, NETWORK_STATUS, TIMEOUT_STATUS};
pub use operations::{CallOptions, OdxClient};
pub use slot::ClientSlot;
pub use transport::{Transport, REQUEST_TIMEOUT};

// Re-exported so callers can build cancellation tokens without a direct dependency.
pub use tokio_util::sync::CancellationToken;
