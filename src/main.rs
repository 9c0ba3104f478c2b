//! Sumi-Harvest main entry point
//!
//! This is the command-line interface for the Sumi-Harvest artifact harvester.

use anyhow::Context;
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use sumi_harvest::config::{load_config_with_hash, Config};
use sumi_harvest::crawler::{Engine, HarvestMode};
use sumi_harvest::output::{build_sink, print_report};
use sumi_harvest::url::parse_seed;
use tracing_subscriber::EnvFilter;

/// Sumi-Harvest: a bounded same-origin artifact harvester
///
/// Sumi-Harvest crawls one site breadth-first to a fixed depth and collects
/// data-file URLs, email addresses or API endpoints found in the site's
/// scripts, writing them to deduplicated files.
#[derive(Parser, Debug)]
#[command(name = "sumi-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A bounded same-origin artifact harvester", long_about = None)]
struct Cli {
    /// Seed URL (prompted for when omitted)
    #[arg(value_name = "URL")]
    seed: Option<String>,

    /// What to harvest: files, emails or apis
    #[arg(short, long, default_value = "files")]
    mode: HarvestMode,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Override the configured maximum crawl depth
    #[arg(long)]
    max_depth: Option<u32>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    cfg
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => Config::default(),
    };

    if let Some(max_depth) = cli.max_depth {
        config.crawler.max_depth = max_depth;
    }

    let raw_seed = match cli.seed {
        Some(seed) => seed,
        None => prompt_seed()?,
    };

    let seed = match parse_seed(&raw_seed) {
        Ok(seed) => seed,
        Err(e) => {
            tracing::error!("Invalid seed URL {:?}: {}", raw_seed, e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config, cli.mode, seed.as_str());
        return Ok(());
    }

    handle_harvest(config, cli.mode, seed).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_harvest=info,warn"),
            1 => EnvFilter::new("sumi_harvest=debug,info"),
            2 => EnvFilter::new("sumi_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Reads the seed URL from stdin
fn prompt_seed() -> anyhow::Result<String> {
    print!("Enter the URL to crawl: ");
    io::stdout().flush().context("failed to flush prompt")?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read seed URL from stdin")?;

    Ok(line.trim().to_string())
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config, mode: HarvestMode, seed: &str) {
    println!("=== Sumi-Harvest Dry Run ===\n");

    println!("Seed: {}", seed);
    println!("Mode: {} ({})", mode, mode.artifact_name());

    println!("\nCrawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!(
        "  Max concurrent fetches: {}",
        config.crawler.max_concurrent_fetches
    );
    println!("  Request timeout: {}ms", config.crawler.request_timeout_ms);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.value);

    println!("\nExtraction:");
    println!(
        "  File extensions: {}",
        config.extraction.file_extensions.join(", ")
    );

    println!("\nOutput:");
    match mode {
        HarvestMode::DataFiles => println!("  Data files: {}", config.output.data_files_path),
        HarvestMode::Emails => println!("  Emails dir: {}", config.output.emails_dir),
        HarvestMode::Apis => println!("  APIs dir: {}", config.output.apis_dir),
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main harvest operation
async fn handle_harvest(
    config: Config,
    mode: HarvestMode,
    seed: url::Url,
) -> Result<(), Box<dyn std::error::Error>> {
    let sink = build_sink(mode, &config.output)?;
    let mut engine = Engine::new(&config, mode, sink)?;

    let token = engine.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight fetches");
            token.cancel();
        }
    });

    match engine.run(&seed).await {
        Ok(report) => {
            tracing::info!("Harvest completed successfully");
            print_report(&report);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
