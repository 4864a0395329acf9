//! Typed operation facade.
//!
//! [`OdxClient`] exposes one method per verb. Each method builds the verb's
//! [`Params`], wraps them in an [`Envelope`] (which applies keyword
//! normalization) and hands the envelope to the shared [`Transport`].
//!
//! | Method | Action | Result |
//! |--------|--------|--------|
//! | [`OdxClient::search`] | `search` | `Vec<RecordId>` |
//! | [`OdxClient::search_read`] | `search_read` | `Vec<T>` |
//! | [`OdxClient::search_count`] | `search_count` | `u64` |
//! | [`OdxClient::read`] | `read` | `Vec<T>` |
//! | [`OdxClient::fields_get`] | `fields_get` | `T` |
//! | [`OdxClient::create`] | `create` | `RecordId` |
//! | [`OdxClient::write`] | `write` | `bool` |
//! | [`OdxClient::remove`] | `unlink` | `bool` |
//! | [`OdxClient::call_method`] | `call_method` | `T` |

use std::sync::Arc;

use protocol::{
    Domain, Envelope, InstanceCredentials, KeywordArgs, MethodName, ModelName, Params, RecordId,
    RequestId, ServerResponse,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::{ClientConfig, ClientError, Transport};

/// Per-call options shared by every verb.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Request id to send. A fresh [`RequestId::generate`] is used when `None`.
    pub id: Option<RequestId>,
    /// Token that aborts the call with [`ClientError::Cancelled`].
    pub cancellation: Option<CancellationToken>,
}

impl CallOptions {
    /// Options with a generated id and no cancellation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sends `id` instead of a generated one.
    #[must_use]
    pub fn with_id(mut self, id: RequestId) -> Self {
        self.id = Some(id);
        self
    }

    /// Aborts the call when `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}

/// Client for one backend instance behind the gateway.
///
/// Cheap to clone; clones share the same HTTP connection pool. Any number of
/// calls may be in flight at once.
#[derive(Debug, Clone)]
pub struct OdxClient {
    transport: Arc<Transport>,
}

impl OdxClient {
    /// Validates `config` and builds the client.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        Ok(Self::from_transport(Transport::new(config)?))
    }

    /// Wraps an existing transport.
    pub fn from_transport(transport: Transport) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    /// Credentials of the targeted instance.
    pub fn instance(&self) -> &InstanceCredentials {
        self.transport.instance()
    }

    /// Ids of the `model` records matching `domain`.
    pub async fn search(
        &self,
        model: &ModelName,
        domain: Domain,
        keyword: &KeywordArgs,
        options: CallOptions,
    ) -> Result<ServerResponse<Vec<RecordId>>, ClientError> {
        self.dispatch(model, keyword, Params::Search(domain), options)
            .await
    }

    /// Records matching `domain`, shaped by `keyword.fields`, `order`,
    /// `limit` and `offset`.
    pub async fn search_read<T: DeserializeOwned>(
        &self,
        model: &ModelName,
        domain: Domain,
        keyword: &KeywordArgs,
        options: CallOptions,
    ) -> Result<ServerResponse<Vec<T>>, ClientError> {
        self.dispatch(model, keyword, Params::SearchRead(domain), options)
            .await
    }

    /// Number of records matching `domain`.
    pub async fn search_count(
        &self,
        model: &ModelName,
        domain: Domain,
        keyword: &KeywordArgs,
        options: CallOptions,
    ) -> Result<ServerResponse<u64>, ClientError> {
        self.dispatch(model, keyword, Params::SearchCount(domain), options)
            .await
    }

    /// Records with the given ids.
    pub async fn read<T: DeserializeOwned>(
        &self,
        model: &ModelName,
        ids: &[RecordId],
        keyword: &KeywordArgs,
        options: CallOptions,
    ) -> Result<ServerResponse<Vec<T>>, ClientError> {
        self.dispatch(model, keyword, Params::Read(ids.to_vec()), options)
            .await
    }

    /// Field metadata of `model`.
    pub async fn fields_get<T: DeserializeOwned>(
        &self,
        model: &ModelName,
        keyword: &KeywordArgs,
        options: CallOptions,
    ) -> Result<ServerResponse<T>, ClientError> {
        self.dispatch(model, keyword, Params::FieldsGet, options)
            .await
    }

    /// Creates one record from `values` and returns its id.
    pub async fn create<V: Serialize + ?Sized>(
        &self,
        model: &ModelName,
        values: &V,
        keyword: &KeywordArgs,
        options: CallOptions,
    ) -> Result<ServerResponse<RecordId>, ClientError> {
        let values = to_json(values)?;
        self.dispatch(model, keyword, Params::Create(values), options)
            .await
    }

    /// Writes `values` to every record in `ids`.
    pub async fn write<V: Serialize + ?Sized>(
        &self,
        model: &ModelName,
        ids: &[RecordId],
        values: &V,
        keyword: &KeywordArgs,
        options: CallOptions,
    ) -> Result<ServerResponse<bool>, ClientError> {
        let params = Params::Write {
            ids: ids.to_vec(),
            values: to_json(values)?,
        };
        self.dispatch(model, keyword, params, options).await
    }

    /// Deletes the records in `ids` (`unlink`).
    pub async fn remove(
        &self,
        model: &ModelName,
        ids: &[RecordId],
        keyword: &KeywordArgs,
        options: CallOptions,
    ) -> Result<ServerResponse<bool>, ClientError> {
        self.dispatch(model, keyword, Params::Unlink(ids.to_vec()), options)
            .await
    }

    /// Invokes `method` on `model` with positional `args`.
    pub async fn call_method<T: DeserializeOwned>(
        &self,
        model: &ModelName,
        method: &MethodName,
        args: Vec<Value>,
        keyword: &KeywordArgs,
        options: CallOptions,
    ) -> Result<ServerResponse<T>, ClientError> {
        let params = Params::CallMethod {
            method: method.clone(),
            args,
        };
        self.dispatch(model, keyword, params, options).await
    }

    async fn dispatch<T: DeserializeOwned>(
        &self,
        model: &ModelName,
        keyword: &KeywordArgs,
        params: Params,
        options: CallOptions,
    ) -> Result<ServerResponse<T>, ClientError> {
        let CallOptions { id, cancellation } = options;
        let envelope = Envelope::new(
            id.unwrap_or_else(RequestId::generate),
            model.clone(),
            keyword,
            params,
            self.transport.instance().clone(),
        );
        self.transport
            .execute(&envelope, cancellation.as_ref())
            .await
    }
}

fn to_json<V: Serialize + ?Sized>(values: &V) -> Result<Value, ClientError> {
    serde_json::to_value(values).map_err(ClientError::Serialization)
}
