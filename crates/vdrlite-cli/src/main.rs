//! vdrlite - analyze a data room archive and write a due-diligence summary.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

use vdrlite::config::{load_config, validate_config};
use vdrlite::{
    render_markdown, resolve_api_key, AnalysisConfig, GeminiProvider, LlmProvider,
    LoggingProgress, Pipeline,
};

#[derive(Parser, Debug)]
#[command(name = "vdrlite", version, about = "Analyze a virtual data room archive")]
struct Cli {
    /// ZIP archive with the data room documents
    archive: PathBuf,

    /// JSON config file (defaults are used when omitted)
    #[arg(short, long, env = "VDRLITE_CONFIG")]
    config: Option<PathBuf>,

    /// Where to write the markdown report
    #[arg(long, default_value = "vdr_summary.md")]
    report: PathBuf,

    /// Also write the raw analysis result as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Maximum documents analyzed at once
    #[arg(long)]
    concurrency: Option<usize>,

    /// Override the model name from the config
    #[arg(long)]
    model: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json)?;

    let mut config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    if let Some(concurrency) = cli.concurrency {
        config.max_concurrent_documents = concurrency;
    }
    if let Some(model) = cli.model {
        config.llm.model = model;
    }
    validate_config(&config)?;

    let api_key = resolve_api_key(&config.llm).context("Failed to resolve the Gemini API key")?;
    let provider: Arc<dyn LlmProvider> = Arc::new(GeminiProvider::from_config(&config.llm, api_key)?);
    info!(
        "Using model {} with up to {} concurrent documents",
        provider.name(),
        config.max_concurrent_documents
    );
    let pipeline = Pipeline::from_config(&config, provider);

    let archive = tokio::fs::read(&cli.archive)
        .await
        .with_context(|| format!("Failed to read archive {}", cli.archive.display()))?;
    let result = pipeline.analyze(archive, &LoggingProgress).await?;

    let report = render_markdown(&result, Utc::now());
    tokio::fs::write(&cli.report, report)
        .await
        .with_context(|| format!("Failed to write report to {}", cli.report.display()))?;

    if let Some(path) = &cli.json {
        let json = serde_json::to_string_pretty(&result)?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write JSON result to {}", path.display()))?;
    }

    println!(
        "Analyzed {} documents ({} failed): {} facts, {} red flags. Report: {}",
        result.docs.len(),
        result.errors.len(),
        result.aggregate.total_facts(),
        result.aggregate.total_red_flags(),
        cli.report.display()
    );
    Ok(())
}

/// Logs go to stderr so the summary line stays clean on stdout.
fn init_tracing(json: bool) -> anyhow::Result<()> {
    tracing_log::LogTracer::init().context("Failed to bridge log records")?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        tracing::subscriber::set_global_default(
            registry.with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            ),
        )?;
    } else {
        tracing::subscriber::set_global_default(
            registry.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
        )?;
    }
    Ok(())
}
