mod config;
mod error;

use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use assistant::{Actions, AnthropicBackend, PipelineSummaryTool, ToolRegistry};
use chrono::{Local, TimeZone};
use clap::{Parser, Subcommand};
use pipeline::{EntityKind, PipelineRecord, PipelineStore, Stage};
use tracing_subscriber::EnvFilter;

use config::{Config, ConfigError, LogFormat, LoggingConfig};
use error::{Error, Result};

#[derive(Parser)]
#[command(name = "crm-assistant")]
#[command(about = "Sales pipeline assistant and lead scoring", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the config file (default: ./crm-assistant.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask the assistant a question; starts an interactive prompt when no message is given
    Ask {
        message: Vec<String>,
    },
    /// Score a lead read as JSON from a file or stdin
    Score {
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Print the pipeline summary the assistant sees
    Summary,
    /// Add a lead, opportunity or contract
    Add {
        #[arg(short, long)]
        kind: EntityKind,
        #[arg(short, long)]
        stage: Stage,
        #[arg(short, long)]
        name: String,
        /// Value in currency units, e.g. 1200 or 1200.50
        #[arg(short, long, default_value = "0")]
        value: String,
    },
    /// List stored records
    List {
        #[arg(short, long)]
        kind: Option<EntityKind>,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Load config and initialize logging before any other operations
    let config = Config::discover(cli.config.as_deref())?;
    init_logging(&config.logging);

    match cli.command {
        Commands::Ask { message } => cmd_ask(&config, &message.join(" ")).await,
        Commands::Score { file } => cmd_score(&config, file.as_deref()).await,
        Commands::Summary => cmd_summary(&config).await,
        Commands::Add {
            kind,
            stage,
            name,
            value,
        } => cmd_add(&config, kind, stage, &name, &value),
        Commands::List { kind } => cmd_list(&config, kind),
    }
}

fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr);

    match config.format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn open_store(config: &Config) -> Result<Arc<PipelineStore>> {
    Ok(Arc::new(PipelineStore::open(&config.store.path)?))
}

fn build_backend(config: &Config) -> Result<AnthropicBackend> {
    if config.backend.provider != "anthropic" {
        return Err(ConfigError::UnsupportedProvider(config.backend.provider.clone()).into());
    }
    let mut builder = AnthropicBackend::builder(config.api_key()?, &config.backend.model)
        .max_tokens(config.backend.max_tokens);
    if let Some(base_url) = &config.backend.base_url {
        builder = builder.base_url(base_url);
    }
    Ok(builder.build())
}

fn build_actions(config: &Config) -> Result<Actions<AnthropicBackend>> {
    let backend = build_backend(config)?;
    tracing::info!(
        event_name = "cli.backend.ready",
        backend = %backend,
        "model backend configured"
    );

    let tools = ToolRegistry::crm(open_store(config)?)?;
    Ok(Actions::new(Arc::new(backend), Arc::new(tools)).with_scoring_delay(config.scoring.delay()))
}

async fn cmd_ask(config: &Config, message: &str) -> Result<()> {
    let actions = build_actions(config)?;

    if !message.trim().is_empty() {
        println!("{}", actions.get_assistant_response(message).await);
        return Ok(());
    }

    println!("crm-assistant v{}", env!("CARGO_PKG_VERSION"));
    println!("Model: {}", config.backend.model);
    println!("Type 'quit' or Ctrl+D to exit.\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            // EOF
            break;
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "quit" || input == "exit" {
            break;
        }

        println!("\n{}\n", actions.get_assistant_response(input).await);
    }

    Ok(())
}

async fn cmd_score(config: &Config, file: Option<&Path>) -> Result<()> {
    let (source_name, raw) = match file {
        Some(path) => {
            let raw = std::fs::read_to_string(path).map_err(|e| Error::LeadFile {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
            (path.display().to_string(), raw)
        }
        None => {
            let mut raw = String::new();
            io::stdin().read_to_string(&mut raw)?;
            ("stdin".to_string(), raw)
        }
    };

    let lead: serde_json::Value = serde_json::from_str(&raw).map_err(|e| Error::InvalidLead {
        source_name,
        reason: e.to_string(),
    })?;

    let actions = build_actions(config)?;
    let output = actions.score_lead_json(&lead).await;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn cmd_summary(config: &Config) -> Result<()> {
    let tool = PipelineSummaryTool::new(open_store(config)?);
    let summary = tool.summary().await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn cmd_add(config: &Config, kind: EntityKind, stage: Stage, name: &str, value: &str) -> Result<()> {
    let value_cents = parse_amount(value)?;
    let store = open_store(config)?;

    let record = PipelineRecord::new(kind, name, stage, value_cents);
    store.insert(&record)?;
    println!("Added {} {} ({})", record.kind, record.id, format_cents(value_cents));
    Ok(())
}

fn cmd_list(config: &Config, kind: Option<EntityKind>) -> Result<()> {
    let store = open_store(config)?;
    let records = store.list(kind)?;

    if records.is_empty() {
        println!("No records found.");
        return Ok(());
    }

    println!(
        "{:<36}  {:<12}  {:<12}  {:>14}  {:<16}  NAME",
        "ID", "KIND", "STAGE", "VALUE", "CREATED"
    );
    println!("{}", "-".repeat(110));

    for record in records {
        let created = Local
            .from_utc_datetime(&record.created_at.naive_utc())
            .format("%Y-%m-%d %H:%M");
        println!(
            "{:<36}  {:<12}  {:<12}  {:>14}  {:<16}  {}",
            record.id,
            record.kind,
            record.stage,
            format_cents(record.value_cents),
            created,
            record.name
        );
    }

    Ok(())
}

/// Parse a decimal currency amount like `1200` or `1200.5` into cents.
fn parse_amount(input: &str) -> Result<i64> {
    let invalid = || Error::InvalidAmount(input.to_string());
    let trimmed = input.trim();

    let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if whole.is_empty() || !all_digits(whole) || !all_digits(fraction) || fraction.len() > 2 {
        return Err(invalid());
    }
    if trimmed.ends_with('.') {
        return Err(invalid());
    }

    let whole: i64 = whole.parse().map_err(|_| invalid())?;
    let cents = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
        _ => fraction.parse::<i64>().map_err(|_| invalid())?,
    };

    whole
        .checked_mul(100)
        .and_then(|v| v.checked_add(cents))
        .ok_or_else(invalid)
}

fn format_cents(cents: i64) -> String {
    format!("{}.{:02}", cents / 100, (cents % 100).abs())
}
