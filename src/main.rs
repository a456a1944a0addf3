//! Spider-Crawl main entry point
//!
//! This is the command-line interface for the Spider-Crawl single-domain crawler.

use anyhow::Context;
use clap::Parser;
use spider_crawl::config::{load_config, validate, Config};
use spider_crawl::crawler::Spider;
use spider_crawl::output::{print_statistics, render_event, CrawlStatistics};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// Spider-Crawl: a single-domain web crawler
///
/// Visits every page reachable from the seed URL without leaving its host, and
/// prints each visited page with the same-domain links found on it.
#[derive(Parser, Debug)]
#[command(name = "spider-crawl")]
#[command(version)]
#[command(about = "Crawls every page of a single domain", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// URL to crawl
    #[arg(short, long)]
    url: Option<String>,

    /// Max number of URLs visited concurrently
    #[arg(long)]
    concurrency: Option<usize>,

    /// HTTP request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Print crawl statistics once the crawl ends
    #[arg(long)]
    summary: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error logs
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;
    let seed = config.seed_or_default().to_string();

    let (tx, rx) = mpsc::channel(config.crawler.event_buffer);
    let spider = Spider::new(config.crawler, tx);
    let crawl = tokio::spawn(async move { spider.crawl(&seed).await });

    let stats = run_event_loop(rx).await;

    let visited = crawl.await.context("crawl task failed")??;
    tracing::debug!("Crawl returned {} visited URLs", visited);

    if cli.summary {
        print_statistics(&stats);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so the event stream on stdout stays clean.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("spider_crawl=warn,warn"),
            1 => EnvFilter::new("spider_crawl=info,warn"),
            2 => EnvFilter::new("spider_crawl=debug,info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file, if any, and applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(url) = &cli.url {
        // the seed is checked by the crawl itself and reported as an event
        config.seed = Some(url.clone());
    }
    if let Some(concurrency) = cli.concurrency {
        config.crawler.concurrency = concurrency;
    }
    if let Some(timeout) = cli.timeout {
        config.crawler.timeout_secs = timeout;
    }

    spider_crawl::config::validate_crawler_config(&config.crawler)
        .context("invalid crawler settings")?;
    if cli.url.is_none() {
        validate(&config).context("invalid configuration")?;
    }

    Ok(config)
}

/// Prints every event as it arrives until the crawl drops its sender
async fn run_event_loop(mut rx: mpsc::Receiver<spider_crawl::CrawlEvent>) -> CrawlStatistics {
    let mut stats = CrawlStatistics::new();

    while let Some(event) = rx.recv().await {
        println!("\n{}", render_event(&event));
        stats.record(&event);
    }

    stats
}
