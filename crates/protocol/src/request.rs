//! Request envelope sent to the gateway.
//!
//! An [`Envelope`] is built from a [`Params`] value, which fixes both the
//! [`Action`] and the wire `params` array for one verb. Keyword normalization
//! happens in [`Envelope::new`], so no envelope can leave this crate with
//! shaping parameters attached to a verb that does not accept them.

use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::{InstanceCredentials, KeywordArgs, MethodName, ModelName, RecordId, RequestId};

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// The operation the gateway executes on the target model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Returns ids of records matching a domain.
    Search,
    /// Returns field values of records matching a domain.
    SearchRead,
    /// Returns the number of records matching a domain.
    SearchCount,
    /// Returns field values of records by id.
    Read,
    /// Returns field metadata for the model.
    FieldsGet,
    /// Creates one record and returns its id.
    Create,
    /// Updates records by id.
    Write,
    /// Deletes records by id.
    Unlink,
    /// Invokes a named public method on the model.
    CallMethod,
}

impl Action {
    /// Returns the wire name of this action.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::SearchRead => "search_read",
            Self::SearchCount => "search_count",
            Self::Read => "read",
            Self::FieldsGet => "fields_get",
            Self::Create => "create",
            Self::Write => "write",
            Self::Unlink => "unlink",
            Self::CallMethod => "call_method",
        }
    }

    /// Returns `true` if the backend accepts `fields`, `order`, `limit` and
    /// `offset` for this action. Only `search_read` does.
    pub fn keeps_shaping(self) -> bool {
        matches!(self, Self::SearchRead)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Search domain
// ---------------------------------------------------------------------------

/// A search domain: a list of `[field, operator, value]` conditions combined
/// with prefix logical operators (`"&"`, `"|"`, `"!"`). Consecutive
/// conditions are implicitly AND-ed by the backend.
///
/// ```
/// use protocol::Domain;
///
/// let domain = Domain::new()
///     .or()
///     .condition("is_company", "=", true)
///     .condition("customer_rank", ">", 0);
/// assert_eq!(domain.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Domain(Vec<Value>);

impl Domain {
    /// Creates an empty domain.
    pub fn new() -> Self {
        Self::default()
    }

    /// The empty domain, which matches every record.
    pub fn all() -> Self {
        Self::default()
    }

    /// Appends a `[field, operator, value]` condition.
    #[must_use]
    pub fn condition(
        mut self,
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.0.push(Value::Array(vec![
            Value::String(field.into()),
            Value::String(operator.into()),
            value.into(),
        ]));
        self
    }

    /// Appends the prefix AND operator (applies to the next two terms).
    #[must_use]
    pub fn and(self) -> Self {
        self.operator("&")
    }

    /// Appends the prefix OR operator (applies to the next two terms).
    #[must_use]
    pub fn or(self) -> Self {
        self.operator("|")
    }

    /// Appends the prefix NOT operator (applies to the next term).
    #[must_use]
    pub fn not(self) -> Self {
        self.operator("!")
    }

    /// Number of terms (conditions and operators).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the domain has no terms.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn operator(mut self, op: &str) -> Self {
        self.0.push(Value::String(op.to_owned()));
        self
    }
}

impl From<Vec<Value>> for Domain {
    fn from(terms: Vec<Value>) -> Self {
        Self(terms)
    }
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Positional parameters for one verb.
///
/// Each variant fixes the [`Action`] it belongs to and serializes to the
/// `params` array shape the gateway expects for that action.
#[derive(Debug, Clone, PartialEq)]
pub enum Params {
    /// `[domain]`
    Search(Domain),
    /// `[domain]`
    SearchRead(Domain),
    /// `[domain]`
    SearchCount(Domain),
    /// `[ids]`
    Read(Vec<RecordId>),
    /// `[]`
    FieldsGet,
    /// `[values]`
    Create(Value),
    /// `[ids, values]`
    Write {
        /// Records to update.
        ids: Vec<RecordId>,
        /// Field values to write.
        values: Value,
    },
    /// `[ids]`
    Unlink(Vec<RecordId>),
    /// The caller's positional arguments, verbatim.
    CallMethod {
        /// Method to invoke; sent as `fn_name`.
        method: MethodName,
        /// Positional arguments.
        args: Vec<Value>,
    },
}

impl Params {
    /// The action these parameters belong to.
    pub fn action(&self) -> Action {
        match self {
            Self::Search(_) => Action::Search,
            Self::SearchRead(_) => Action::SearchRead,
            Self::SearchCount(_) => Action::SearchCount,
            Self::Read(_) => Action::Read,
            Self::FieldsGet => Action::FieldsGet,
            Self::Create(_) => Action::Create,
            Self::Write { .. } => Action::Write,
            Self::Unlink(_) => Action::Unlink,
            Self::CallMethod { .. } => Action::CallMethod,
        }
    }

    /// The method name for `call_method`, `None` for every other action.
    pub fn method(&self) -> Option<&MethodName> {
        match self {
            Self::CallMethod { method, .. } => Some(method),
            _ => None,
        }
    }
}

impl Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Search(domain) | Self::SearchRead(domain) | Self::SearchCount(domain) => {
                [domain].serialize(serializer)
            }
            Self::Read(ids) | Self::Unlink(ids) => [ids].serialize(serializer),
            Self::FieldsGet => serializer.serialize_seq(Some(0))?.end(),
            Self::Create(values) => [values].serialize(serializer),
            Self::Write { ids, values } => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(ids)?;
                seq.serialize_element(values)?;
                seq.end()
            }
            Self::CallMethod { args, .. } => args.serialize(serializer),
        }
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// The complete request body posted to the gateway.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    id: RequestId,
    action: Action,
    model_id: ModelName,
    keyword: KeywordArgs,
    #[serde(rename = "fn_name", skip_serializing_if = "Option::is_none")]
    function_name: Option<MethodName>,
    params: Params,
    odoo_instance: InstanceCredentials,
}

impl Envelope {
    /// Builds an envelope for `params`.
    ///
    /// The action and `fn_name` are taken from `params`. `keyword` is sent as
    /// given for `search_read` and as [`KeywordArgs::cleared`] otherwise.
    pub fn new(
        id: RequestId,
        model: ModelName,
        keyword: &KeywordArgs,
        params: Params,
        instance: InstanceCredentials,
    ) -> Self {
        let action = params.action();
        let keyword = if action.keeps_shaping() {
            keyword.clone()
        } else {
            keyword.cleared()
        };
        Self {
            id,
            action,
            model_id: model,
            keyword,
            function_name: params.method().cloned(),
            params,
            odoo_instance: instance,
        }
    }

    /// Request identifier.
    pub fn id(&self) -> &RequestId {
        &self.id
    }

    /// Action the gateway executes.
    pub fn action(&self) -> Action {
        self.action
    }

    /// Target model.
    pub fn model(&self) -> &ModelName {
        &self.model_id
    }

    /// Keyword arguments after normalization.
    pub fn keyword(&self) -> &KeywordArgs {
        &self.keyword
    }

    /// Credentials of the targeted instance.
    pub fn instance(&self) -> &InstanceCredentials {
        &self.odoo_instance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExecutionContext;
    use serde_json::json;

    fn instance() -> InstanceCredentials {
        InstanceCredentials::new("https://erp.example.com", 2, "prod", "key")
    }

    fn model() -> ModelName {
        ModelName::new("res.partner").unwrap()
    }

    fn shaped_keyword() -> KeywordArgs {
        KeywordArgs::new(ExecutionContext::new("UTC").with_allowed_company_ids([1]))
            .with_fields(["name"])
            .with_order("name")
            .with_limit(5)
            .with_offset(10)
    }

    fn ids(raw: &[i64]) -> Vec<RecordId> {
        raw.iter().copied().map(RecordId::new).collect()
    }

    #[test]
    fn domain_builder_produces_odoo_terms() {
        let domain = Domain::new()
            .or()
            .condition("name", "ilike", "acme")
            .not()
            .condition("active", "=", false);
        assert_eq!(
            serde_json::to_value(&domain).unwrap(),
            json!(["|", ["name", "ilike", "acme"], "!", ["active", "=", false]])
        );
        assert!(Domain::all().is_empty());
    }

    #[test]
    fn params_serialize_to_the_per_verb_shape() {
        let domain = Domain::new().condition("id", ">", 3);
        let cases = [
            (Params::Search(domain.clone()), json!([[["id", ">", 3]]])),
            (Params::SearchCount(domain), json!([[["id", ">", 3]]])),
            (Params::Read(ids(&[1, 2])), json!([[1, 2]])),
            (Params::FieldsGet, json!([])),
            (Params::Create(json!({"name": "x"})), json!([{"name": "x"}])),
            (
                Params::Write {
                    ids: ids(&[4]),
                    values: json!({"name": "y"}),
                },
                json!([[4], {"name": "y"}]),
            ),
            (Params::Unlink(ids(&[5, 6])), json!([[5, 6]])),
            (
                Params::CallMethod {
                    method: MethodName::new("action_confirm").unwrap(),
                    args: vec![json!([7]), json!({"force": true})],
                },
                json!([[7], {"force": true}]),
            ),
        ];

        for (params, expected) in cases {
            assert_eq!(serde_json::to_value(&params).unwrap(), expected, "{:?}", params.action());
        }
    }

    #[test]
    fn envelope_uses_wire_field_names() {
        let envelope = Envelope::new(
            RequestId::new("req-1").unwrap(),
            model(),
            &KeywordArgs::default(),
            Params::Unlink(ids(&[9])),
            instance(),
        );

        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({
                "id": "req-1",
                "action": "unlink",
                "model_id": "res.partner",
                "keyword": { "context": { "tz": "UTC" } },
                "params": [[9]],
                "odoo_instance": {
                    "url": "https://erp.example.com",
                    "user_id": 2,
                    "db": "prod",
                    "api_key": "key"
                }
            })
        );
    }

    #[test]
    fn only_search_read_keeps_shaping_parameters() {
        let all_params = [
            Params::Search(Domain::all()),
            Params::SearchRead(Domain::all()),
            Params::SearchCount(Domain::all()),
            Params::Read(ids(&[1])),
            Params::FieldsGet,
            Params::Create(json!({})),
            Params::Write {
                ids: ids(&[1]),
                values: json!({}),
            },
            Params::Unlink(ids(&[1])),
            Params::CallMethod {
                method: MethodName::new("noop").unwrap(),
                args: vec![],
            },
        ];

        let keyword = shaped_keyword();
        for params in all_params {
            let action = params.action();
            let envelope = Envelope::new(
                RequestId::generate(),
                model(),
                &keyword,
                params,
                instance(),
            );
            if action == Action::SearchRead {
                assert_eq!(envelope.keyword(), &keyword);
            } else {
                assert!(!envelope.keyword().has_shaping(), "{action} kept shaping");
                assert_eq!(envelope.keyword().context, keyword.context);
            }
        }
    }

    #[test]
    fn fn_name_is_only_sent_for_call_method() {
        let call = Envelope::new(
            RequestId::generate(),
            model(),
            &KeywordArgs::default(),
            Params::CallMethod {
                method: MethodName::new("name_search").unwrap(),
                args: vec![json!("acme")],
            },
            instance(),
        );
        let value = serde_json::to_value(&call).unwrap();
        assert_eq!(value["action"], "call_method");
        assert_eq!(value["fn_name"], "name_search");

        let read = Envelope::new(
            RequestId::generate(),
            model(),
            &KeywordArgs::default(),
            Params::Read(ids(&[1])),
            instance(),
        );
        let value = serde_json::to_value(&read).unwrap();
        assert!(value.get("fn_name").is_none());
    }
}
