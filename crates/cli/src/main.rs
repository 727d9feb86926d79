//! Shop Agent CLI - run the product tools from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # List the available tools
//! shop-agent list-tools
//!
//! # Print a tool's input schema
//! shop-agent schema update_product
//!
//! # Run a tool
//! shop-agent run get_product --input '{"product_identifier": "632910392"}'
//!
//! # Tools that delete or change many products need --yes
//! shop-agent run delete_product --input '{"product_id": "632910392"}' --yes
//! ```
//!
//! Tool output goes to stdout; logs go to stderr. Set `LOG_FORMAT=json`
//! for structured logs and `SENTRY_DSN` to report failures to Sentry.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::Write;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use shop_agent_tools::config::ToolsConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "shop-agent")]
#[command(author, version, about = "Shopify product tools with AI-generated fields")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available tools
    ListTools,
    /// Print the JSON input schema of a tool
    Schema {
        /// Tool name
        name: String,
    },
    /// Run a tool against the configured store
    Run {
        /// Tool name
        name: String,

        /// Tool input as a JSON object
        #[arg(short, long, default_value = "{}")]
        input: String,

        /// Confirm tools that delete or change many products
        #[arg(short, long)]
        yes: bool,
    },
}

impl Commands {
    const fn needs_config(&self) -> bool {
        matches!(self, Self::Run { .. })
    }
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ToolsConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Logs go to stderr so stdout carries only tool output.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shop_agent_tools=info,shop_agent_cli=info".into());

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer =
        (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env before reading LOG_FORMAT and RUST_LOG
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match cli
        .command
        .needs_config()
        .then(ToolsConfig::from_env)
        .transpose()
    {
        Ok(config) => config,
        Err(e) => {
            let _ = writeln!(std::io::stderr(), "Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = config.as_ref().and_then(init_sentry);
    init_tracing();

    match run(cli.command, config).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, config: Option<ToolsConfig>) -> Result<ExitCode, CliError> {
    let mut out = std::io::stdout().lock();
    match command {
        Commands::ListTools => commands::catalog::list_tools(&mut out)?,
        Commands::Schema { name } => commands::catalog::schema(&name, &mut out)?,
        Commands::Run { name, input, yes } => {
            let config = config.ok_or(CliError::MissingConfig)?;
            let input = commands::run::parse_tool_input(&input)?;
            let response = commands::run::run_tool(&config, &name, &input, yes).await?;
            writeln!(out, "{}", response.content)?;
            if response.is_error {
                return Ok(ExitCode::FAILURE);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
