//! Write-once client slot.
//!
//! [`ClientSlot`] enforces the "configure exactly once, before first use"
//! lifecycle. The slot is an ordinary value: a host that wants one client for
//! the whole process puts it in a `static`; a host that does not can simply
//! construct [`OdxClient`] directly and pass it around.
//!
//! ```
//! use client::ClientSlot;
//!
//! static GATEWAY: ClientSlot = ClientSlot::new();
//!
//! assert!(GATEWAY.get().is_err());
//! ```

use std::sync::OnceLock;

use crate::{ClientConfig, ClientError, OdxClient};

/// Holds at most one configured [`OdxClient`].
#[derive(Debug, Default)]
pub struct ClientSlot {
    client: OnceLock<OdxClient>,
}

impl ClientSlot {
    /// Creates an empty slot.
    pub const fn new() -> Self {
        Self {
            client: OnceLock::new(),
        }
    }

    /// Builds the client from `config` and stores it.
    ///
    /// Fails with [`ClientError::AlreadyInitialized`] if the slot already holds
    /// a client (including when a concurrent call won the race), and with
    /// [`ClientError::InvalidConfig`] if `config` is rejected. A rejected
    /// configuration leaves the slot empty.
    pub fn configure(&self, config: ClientConfig) -> Result<&OdxClient, ClientError> {
        if self.client.get().is_some() {
            return Err(ClientError::AlreadyInitialized);
        }
        let client = OdxClient::new(config)?;
        self.client
            .set(client)
            .map_err(|_| ClientError::AlreadyInitialized)?;
        self.get()
    }

    /// The configured client, or [`ClientError::NotInitialized`].
    pub fn get(&self) -> Result<&OdxClient, ClientError> {
        self.client.get().ok_or(ClientError::NotInitialized)
    }

    /// Returns `true` once [`ClientSlot::configure`] has succeeded.
    pub fn is_configured(&self) -> bool {
        self.client.get().is_some()
    }
}
