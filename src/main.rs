//! serpsum CLI - batch summarisation of search-engine results
//!
//! The application logic is contained in lib.rs, and this file is responsible
//! for parsing arguments and handling top-level errors.

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use serpsum::batch::{BatchRunner, TokioPause, Workflow};
use serpsum::mailer;
use serpsum::scraper::HttpFetcher;
use serpsum::search::DuckDuckGoProvider;
use serpsum::sink::{self, CsvSink, RESULT_FILE};
use serpsum::summarizer::{HostedSummarizer, ModelKind};
use serpsum::Config;

#[derive(Parser)]
#[command(name = "serpsum")]
#[command(author, version, about = "Batch pipeline for summarising search-engine results", long_about = None)]
struct Cli {
    /// Path to the configuration file (defaults to serpsum.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the search workflow over one query or a CSV of queries
    Query {
        /// A single query to process
        query: Option<String>,
        /// CSV file whose first column holds the queries
        #[arg(long, conflicts_with = "query")]
        file: Option<PathBuf>,
    },
    /// Summarise one URL directly, skipping the search engine
    Url {
        /// URL to fetch and summarise
        url: String,
    },
    /// Summarise raw text from a file
    Text {
        /// File containing the text to summarise
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if ModelKind::from_name(&config.pipeline.model).is_none() {
        eprintln!(
            "{} unknown model \"{}\" (expected one of: {})",
            "warning:".yellow(),
            config.pipeline.model,
            ModelKind::names().join(", ")
        );
    }

    let workflow = match cli.command {
        Commands::Query { query, file } => {
            let queries = match (query, file) {
                (Some(q), _) => vec![q],
                (None, Some(path)) => sink::read_queries(&path)
                    .with_context(|| format!("failed to read queries from {}", path.display()))?,
                (None, None) => anyhow::bail!("provide a query or --file"),
            };
            Workflow::Query(queries)
        }
        Commands::Url { url } => Workflow::Url(url),
        Commands::Text { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            Workflow::Text(text)
        }
    };

    let fetcher = HttpFetcher::new()?;
    let summarizer = HostedSummarizer::new(config.api.hf_token.clone())?;
    let search = DuckDuckGoProvider::new()?;
    let sink = CsvSink::new(&config.storage.path);
    let pause = TokioPause;

    let runner = BatchRunner::new(&fetcher, &summarizer, &search, &sink, &pause, &config);
    let report = runner.run(&workflow).await;

    for warning in &report.warnings {
        eprintln!("{} {}", "note:".yellow(), warning);
    }

    for record in report.result.records() {
        println!("{}", record.source_url.cyan());
        println!("  {}\n", record.summary);
    }

    println!(
        "{} {} record(s). {}",
        "Done:".green(),
        report.result.len(),
        report.status
    );

    // Package and notify only when the search workflow produced a table.
    if matches!(workflow, Workflow::Query(_)) && !report.result.is_empty() {
        let zip_path = sink
            .zip_results(&[RESULT_FILE])
            .context("failed to package result files")?;
        println!("Archive written to {}", zip_path.display());

        if mailer::mail_enabled(&config.email) {
            mailer::send_notification(&config.email, &config.storage.path, &zip_path)
                .context("failed to send notification email")?;
            println!("{}", "Notification email sent.".green());
        }
    }

    Ok(())
}
