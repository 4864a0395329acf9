//! Wire model for the ODX proxy gateway.
//!
//! This crate defines every shape that crosses the wire between the client
//! and the gateway: the request [`Envelope`] and its parts, and the
//! [`ServerResponse`] / [`ServerError`] the gateway answers with. Transport,
//! configuration and error classification live in the `client` crate.
//!
//! ## Architectural Layer
//!
//! **Data only.** This crate has no I/O dependencies. It defines *what* is
//! sent; the `client` crate decides *how* it is sent.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`RequestId`, `ModelName`, `RecordId`, etc.) |
//! | [`instance`] | Backend instance credentials |
//! | [`keyword`] | Keyword arguments and execution context |
//! | [`request`] | Actions, search domains, per-verb params, the envelope |
//! | [`response`] | Server response and server error |

pub mod identifiers;
pub mod instance;
pub mod keyword;
pub mod request;
pub mod response;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use identifiers::{MethodName, ModelName, RecordId, RequestId};
pub use instance::InstanceCredentials;
pub use keyword::{ExecutionContext, KeywordArgs, DEFAULT_TIMEZONE};
pub use request::{Action, Domain, Envelope, Params};
pub use response::{ServerError, ServerResponse};
