//! ODX proxy CLI entry point.
//!
//! This binary is the composition root for the workspace. Responsibilities:
//!
//! 1. **Parse configuration**: load the JSON client configuration (default
//!    `odx.json`) and apply the `ODX_API_KEY` override.
//! 2. **Wire observability**: install a `tracing-subscriber` fmt layer (plain
//!    or JSON) filtered by `RUST_LOG`. Every `tracing` span and event emitted by
//!    the `client` crate flows through it.
//! 3. **Run one operation**: build an [`client::OdxClient`], issue the
//!    selected subcommand, and print the gateway response as JSON on stdout.
//!    `Ctrl-C` cancels the in-flight request.
//!
//! ## Usage
//!
//! ```bash
//! odx search res.partner --domain '[["is_company", "=", true]]'
//! odx --company 1 search-read res.partner --field name --field email --limit 10
//! odx call sale.order action_confirm '[[42]]'
//! ```

mod commands;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use argh::FromArgs;
use client::{CallOptions, CancellationToken, ClientConfig, OdxClient};
use protocol::{ExecutionContext, KeywordArgs};
use tracing_subscriber::EnvFilter;

use crate::commands::Command;

/// Environment variable that overrides `odx_api_key` from the configuration file.
const API_KEY_ENV: &str = "ODX_API_KEY";

#[derive(Debug, PartialEq, FromArgs)]
/// run one operation against a backend instance through the ODX proxy gateway
struct Cli {
    /// path to the JSON client configuration (default: odx.json)
    #[argh(option, default = "PathBuf::from(\"odx.json\")")]
    config: PathBuf,

    /// write logs to stderr as JSON
    #[argh(switch)]
    json_logs: bool,

    /// timezone for the execution context (default: UTC)
    #[argh(option, default = "String::from(\"UTC\")")]
    tz: String,

    /// company the call may touch; repeat for several, the first is the default
    #[argh(option, long = "company")]
    companies: Vec<i64>,

    #[argh(subcommand)]
    command: Command,
}

impl Cli {
    fn keyword(&self) -> KeywordArgs {
        let mut context = ExecutionContext::new(self.tz.clone());
        if let Some(&first) = self.companies.first() {
            context = context
                .with_allowed_company_ids(self.companies.iter().copied())
                .with_default_company_id(first);
        }
        KeywordArgs::new(context)
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(path: &Path) -> Result<ClientConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration file {}", path.display()))?;
    let config: ClientConfig = serde_json::from_str(&raw)
        .with_context(|| format!("invalid configuration in {}", path.display()))?;
    Ok(apply_api_key_override(config, std::env::var(API_KEY_ENV).ok()))
}

fn apply_api_key_override(mut config: ClientConfig, key: Option<String>) -> ClientConfig {
    if let Some(key) = key.filter(|k| !k.is_empty()) {
        config.proxy_api_key = key;
    }
    config
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli.config)?;
    let client = OdxClient::new(config).context("failed to set up the gateway client")?;
    let keyword = cli.keyword();

    let token = CancellationToken::new();
    let on_interrupt = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::debug!("interrupt received, cancelling request");
            on_interrupt.cancel();
        }
    });

    let options = CallOptions::new().with_cancellation(token);
    let response = cli.command.run(&client, keyword, options).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli: Cli = argh::from_env();
    init_tracing(cli.json_logs);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use protocol::InstanceCredentials;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::from_args(&["odx"], args).unwrap()
    }

    #[test]
    fn global_options_have_defaults() {
        let cli = parse(&["fields", "res.partner"]);
        assert_eq!(cli.config, PathBuf::from("odx.json"));
        assert!(!cli.json_logs);
        assert_eq!(cli.keyword(), KeywordArgs::default());
    }

    #[test]
    fn companies_populate_the_execution_context() {
        let cli = parse(&[
            "--tz",
            "Europe/Brussels",
            "--company",
            "3",
            "--company",
            "1",
            "count",
            "res.partner",
        ]);
        let keyword = cli.keyword();
        assert_eq!(keyword.context.allowed_company_ids, Some(vec![3, 1]));
        assert_eq!(keyword.context.default_company_id, Some(3));
        assert_eq!(keyword.context.timezone(), "Europe/Brussels");
    }

    #[test]
    fn subcommands_parse() {
        let cli = parse(&["unlink", "res.partner", "--id", "4", "--id", "5"]);
        assert!(matches!(cli.command, Command::Unlink(_)));

        let cli = parse(&["call", "sale.order", "action_confirm", "[[42]]"]);
        assert!(matches!(cli.command, Command::Call(_)));

        assert!(Cli::from_args(&["odx"], &["search"]).is_err());
    }

    #[test]
    fn environment_key_overrides_file_key() {
        let config = ClientConfig::new(
            InstanceCredentials::new("https://erp.example.com", 2, "prod", "backend-key"),
            "from-file",
        );

        let kept = apply_api_key_override(config.clone(), None);
        assert_eq!(kept.proxy_api_key, "from-file");

        let kept = apply_api_key_override(config.clone(), Some(String::new()));
        assert_eq!(kept.proxy_api_key, "from-file");

        let replaced = apply_api_key_override(config, Some("from-env".to_owned()));
        assert_eq!(replaced.proxy_api_key, "from-env");
    }

    #[test]
    fn missing_configuration_file_is_reported() {
        let err = load_config(Path::new("/nonexistent/odx.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/odx.json"));
    }
}
