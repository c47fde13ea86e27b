//! Command line interface.
//!
//! The CLI is a thin caller: it builds the renderer and pipeline, runs
//! the search on a worker task while printing per-source progress, and
//! hands the aggregate to the export sink.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use console::style;
use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::export;
use crate::llm::{LlmClient, PageAnalyzer};
use crate::models::SearchQuery;
use crate::pipeline::Pipeline;
use crate::render::{ChromeRenderer, PageRenderer};

#[derive(Parser)]
#[command(name = "jobscout")]
#[command(about = "Multi-source job and internship listing scraper")]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Search all boards for a designation in a city and export the
    /// results to a spreadsheet
    Scrape {
        /// Role or position to search for
        #[arg(short, long)]
        designation: String,

        /// City or location to search in
        #[arg(short, long)]
        city: String,

        /// Output spreadsheet file
        #[arg(short, long, default_value = "job_listings.csv")]
        output: PathBuf,

        /// Show the browser window while scraping
        #[arg(long)]
        headed: bool,
    },

    /// Analyze an arbitrary page with the AI-assisted extractor
    Analyze {
        /// Page URL to analyze
        url: String,

        /// Target language for the extracted fields
        #[arg(short, long, default_value = "English")]
        language: String,
    },
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Scrape {
            designation,
            city,
            output,
            headed,
        } => scrape(config, &designation, &city, output, headed).await,
        Commands::Analyze { url, language } => analyze(config, &url, &language).await,
    }
}

async fn scrape(
    config: AppConfig,
    designation: &str,
    city: &str,
    output: PathBuf,
    headed: bool,
) -> anyhow::Result<()> {
    let query = SearchQuery::new(designation, city)?;

    let mut browser_config = config.browser.clone();
    if headed {
        browser_config.headless = false;
    }

    let renderer: Arc<dyn PageRenderer> = Arc::new(ChromeRenderer::new(browser_config));
    let pipeline = Arc::new(Pipeline::new(renderer.clone(), config.scrape.clone()));

    println!(
        "Searching for {} in {}",
        style(&query.designation).cyan(),
        style(&query.city).cyan()
    );

    // The long-running pass stays off the interactive task; progress
    // arrives here as each source completes.
    let (tx, mut rx) = mpsc::channel(4);
    let worker = tokio::spawn({
        let pipeline = pipeline.clone();
        let query = query.clone();
        async move { pipeline.run_with_progress(&query, Some(tx)).await }
    });

    while let Some(report) = rx.recv().await {
        println!(
            "  {} {} records",
            style(&report.source).green(),
            report.records
        );
    }

    let records = worker.await??;
    renderer.close().await;

    if export::write_spreadsheet(&records, &output) {
        println!(
            "Saved {} records to {}",
            style(records.len()).bold(),
            output.display()
        );
    } else {
        println!("{}", style("No records exported").yellow());
    }

    Ok(())
}

async fn analyze(config: AppConfig, url: &str, language: &str) -> anyhow::Result<()> {
    let renderer: Arc<dyn PageRenderer> = Arc::new(ChromeRenderer::new(config.browser.clone()));

    let client = LlmClient::configured(config.llm.clone());
    if client.is_none() {
        println!(
            "{}",
            style("AI capability not configured; set OPENAI_API_KEY to enable it").yellow()
        );
    }

    let analyzer = PageAnalyzer::new(client);
    let result = analyzer.analyze(renderer.as_ref(), url, language).await;
    renderer.close().await;

    let fields = result?;
    if fields.is_empty() {
        println!("No fields extracted");
    } else {
        for (key, value) in &fields {
            println!("{}: {}", style(key).bold(), value);
        }
    }

    Ok(())
}
