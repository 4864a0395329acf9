//! Subcommands and their mapping onto [`OdxClient`] operations.

use anyhow::{bail, Context, Result};
use argh::FromArgs;
use client::{CallOptions, OdxClient};
use protocol::{Domain, KeywordArgs, MethodName, ModelName, RecordId};
use serde_json::Value;

/// One gateway operation.
#[derive(Debug, PartialEq, FromArgs)]
#[argh(subcommand)]
pub(crate) enum Command {
    Search(SearchArgs),
    SearchRead(SearchReadArgs),
    Count(CountArgs),
    Read(ReadArgs),
    Fields(FieldsArgs),
    Create(CreateArgs),
    Write(WriteArgs),
    Unlink(UnlinkArgs),
    Call(CallArgs),
}

#[derive(Debug, PartialEq, FromArgs)]
#[argh(subcommand, name = "search")]
/// list ids of records matching a domain
pub(crate) struct SearchArgs {
    /// model name, e.g. res.partner
    #[argh(positional)]
    model: String,
    /// search domain as a JSON array (default: all records)
    #[argh(option)]
    domain: Option<String>,
}

#[derive(Debug, PartialEq, FromArgs)]
#[argh(subcommand, name = "search-read")]
/// read records matching a domain
pub(crate) struct SearchReadArgs {
    /// model name
    #[argh(positional)]
    model: String,
    /// search domain as a JSON array (default: all records)
    #[argh(option)]
    domain: Option<String>,
    /// field to return; repeat for several
    #[argh(option, long = "field")]
    fields: Vec<String>,
    /// sort specification, e.g. "name asc"
    #[argh(option)]
    order: Option<String>,
    /// maximum number of records
    #[argh(option)]
    limit: Option<u32>,
    /// number of records to skip
    #[argh(option)]
    offset: Option<u32>,
}

#[derive(Debug, PartialEq, FromArgs)]
#[argh(subcommand, name = "count")]
/// count records matching a domain
pub(crate) struct CountArgs {
    /// model name
    #[argh(positional)]
    model: String,
    /// search domain as a JSON array (default: all records)
    #[argh(option)]
    domain: Option<String>,
}

#[derive(Debug, PartialEq, FromArgs)]
#[argh(subcommand, name = "read")]
/// read records by id
pub(crate) struct ReadArgs {
    /// model name
    #[argh(positional)]
    model: String,
    /// record id; repeat for several
    #[argh(option, long = "id")]
    ids: Vec<i64>,
}

#[derive(Debug, PartialEq, FromArgs)]
#[argh(subcommand, name = "fields")]
/// describe the fields of a model
pub(crate) struct FieldsArgs {
    /// model name
    #[argh(positional)]
    model: String,
}

#[derive(Debug, PartialEq, FromArgs)]
#[argh(subcommand, name = "create")]
/// create one record
pub(crate) struct CreateArgs {
    /// model name
    #[argh(positional)]
    model: String,
    /// field values as a JSON object
    #[argh(positional)]
    values: String,
}

#[derive(Debug, PartialEq, FromArgs)]
#[argh(subcommand, name = "write")]
/// update records by id
pub(crate) struct WriteArgs {
    /// model name
    #[argh(positional)]
    model: String,
    /// field values as a JSON object
    #[argh(positional)]
    values: String,
    /// record id; repeat for several
    #[argh(option, long = "id")]
    ids: Vec<i64>,
}

#[derive(Debug, PartialEq, FromArgs)]
#[argh(subcommand, name = "unlink")]
/// delete records by id
pub(crate) struct UnlinkArgs {
    /// model name
    #[argh(positional)]
    model: String,
    /// record id; repeat for several
    #[argh(option, long = "id")]
    ids: Vec<i64>,
}

#[derive(Debug, PartialEq, FromArgs)]
#[argh(subcommand, name = "call")]
/// call a public model method
pub(crate) struct CallArgs {
    /// model name
    #[argh(positional)]
    model: String,
    /// method name, e.g. action_confirm
    #[argh(positional)]
    method: String,
    /// positional arguments as a JSON array (default: [])
    #[argh(positional)]
    args: Option<String>,
}

impl Command {
    /// Runs the command and returns the gateway response as JSON.
    pub(crate) async fn run(
        self,
        client: &OdxClient,
        keyword: KeywordArgs,
        options: CallOptions,
    ) -> Result<Value> {
        let response = match self {
            Self::Search(args) => to_value(
                client
                    .search(
                        &model(&args.model)?,
                        domain(args.domain.as_deref())?,
                        &keyword,
                        options,
                    )
                    .await?,
            )?,
            Self::SearchRead(args) => {
                let mut keyword = keyword;
                if !args.fields.is_empty() {
                    keyword = keyword.with_fields(args.fields);
                }
                keyword.order = args.order;
                keyword.limit = args.limit;
                keyword.offset = args.offset;
                to_value(
                    client
                        .search_read::<Value>(
                            &model(&args.model)?,
                            domain(args.domain.as_deref())?,
                            &keyword,
                            options,
                        )
                        .await?,
                )?
            }
            Self::Count(args) => to_value(
                client
                    .search_count(
                        &model(&args.model)?,
                        domain(args.domain.as_deref())?,
                        &keyword,
                        options,
                    )
                    .await?,
            )?,
            Self::Read(args) => to_value(
                client
                    .read::<Value>(&model(&args.model)?, &record_ids(&args.ids)?, &keyword, options)
                    .await?,
            )?,
            Self::Fields(args) => to_value(
                client
                    .fields_get::<Value>(&model(&args.model)?, &keyword, options)
                    .await?,
            )?,
            Self::Create(args) => {
                let values = object("values", &args.values)?;
                to_value(
                    client
                        .create(&model(&args.model)?, &values, &keyword, options)
                        .await?,
                )?
            }
            Self::Write(args) => {
                let values = object("values", &args.values)?;
                to_value(
                    client
                        .write(
                            &model(&args.model)?,
                            &record_ids(&args.ids)?,
                            &values,
                            &keyword,
                            options,
                        )
                        .await?,
                )?
            }
            Self::Unlink(args) => to_value(
                client
                    .remove(&model(&args.model)?, &record_ids(&args.ids)?, &keyword, options)
                    .await?,
            )?,
            Self::Call(args) => {
                let method = MethodName::new(args.method).context("method name must not be empty")?;
                let call_args = match args.args.as_deref() {
                    None => Vec::new(),
                    Some(raw) => array("args", raw)?,
                };
                to_value(
                    client
                        .call_method::<Value>(
                            &model(&args.model)?,
                            &method,
                            call_args,
                            &keyword,
                            options,
                        )
                        .await?,
                )?
            }
        };
        Ok(response)
    }
}

fn to_value(response: impl serde::Serialize) -> Result<Value> {
    serde_json::to_value(response).context("failed to render the gateway response")
}

fn model(raw: &str) -> Result<ModelName> {
    ModelName::new(raw).context("model name must not be empty")
}

fn record_ids(raw: &[i64]) -> Result<Vec<RecordId>> {
    if raw.is_empty() {
        bail!("at least one --id is required");
    }
    Ok(raw.iter().copied().map(RecordId::new).collect())
}

fn parse_json(label: &str, raw: &str) -> Result<Value> {
    serde_json::from_str(raw).with_context(|| format!("{label} is not valid JSON"))
}

fn array(label: &str, raw: &str) -> Result<Vec<Value>> {
    match parse_json(label, raw)? {
        Value::Array(items) => Ok(items),
        other => bail!("{label} must be a JSON array, got {other}"),
    }
}

fn object(label: &str, raw: &str) -> Result<Value> {
    let value = parse_json(label, raw)?;
    if !value.is_object() {
        bail!("{label} must be a JSON object, got {value}");
    }
    Ok(value)
}

fn domain(raw: Option<&str>) -> Result<Domain> {
    match raw {
        None => Ok(Domain::all()),
        Some(raw) => array("domain", raw).map(Domain::from),
    }
}
