//! Sitelint main entry point
//!
//! This is the command-line interface for the Sitelint job service.

use chrono::{Duration as ChronoDuration, Utc};
use clap::{Parser, Subcommand};
use sitelint::config::{load_config_with_hash, Config};
use sitelint::output::{load_statistics, print_statistics};
use sitelint::storage::{RecordStore, SqliteStore};
use sitelint::{JobError, JobService};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Sitelint: link extraction and grammar checking for web pages
///
/// Jobs are dispatched to a worker pool (in-process or Scrapyd), polled until
/// they finish, and their records are read back from a SQLite store.
#[derive(Parser, Debug)]
#[command(name = "sitelint")]
#[command(version = "1.0.0")]
#[command(about = "Link extraction and grammar checking jobs", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server
    Serve,

    /// Extract the links on a page
    Links {
        url: String,

        /// Print the task and job ids instead of waiting for results
        #[arg(long)]
        detach: bool,
    },

    /// Grammar-check a page
    Check {
        url: String,

        /// Language code (defaults to the configured default language)
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Show the state of a dispatched task
    Status { task_id: String },

    /// Show record store statistics
    Stats,

    /// Delete records older than the retention window
    Purge {
        /// Overrides `retention-hours` from the config
        #[arg(long)]
        older_than_hours: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    match cli.command {
        Command::Serve => handle_serve(&config).await?,
        Command::Links { url, detach } => handle_links(&config, &url, detach).await?,
        Command::Check { url, language } => handle_check(&config, &url, language.as_deref()).await?,
        Command::Status { task_id } => handle_status(&config, &task_id).await?,
        Command::Stats => handle_stats(&config)?,
        Command::Purge { older_than_hours } => handle_purge(&config, older_than_hours)?,
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitelint=info,warn"),
            1 => EnvFilter::new("sitelint=debug,tower_http=debug,info"),
            2 => EnvFilter::new("sitelint=trace,debug"),
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

async fn handle_serve(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr: SocketAddr = config.server.bind.parse()?;
    let service = Arc::new(JobService::from_config(config)?);
    sitelint::server::serve(addr, service).await?;
    Ok(())
}

async fn handle_links(
    config: &Config,
    url: &str,
    detach: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let service = JobService::from_config(config)?;

    if detach {
        let submission = service.submit_links(url).await?;
        println!("task_id: {}", submission.handle.task_id);
        println!("job_id: {}", submission.job_id);
        return Ok(());
    }

    let report = service.extract_links(url).await?;
    println!("{}", report.to_json_pretty()?);
    Ok(())
}

async fn handle_check(
    config: &Config,
    url: &str,
    language: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let service = JobService::from_config(config)?;

    match service.check_page(url, language).await {
        Ok(report) => {
            println!("{}", report.to_json_pretty()?);
            Ok(())
        }
        Err(JobError::WorkerFailure { task_id, job_id }) => {
            let report = service
                .aggregator()
                .error_report(job_id, sitelint::TaskState::Failed)?;
            println!("{}", report.to_json_pretty()?);
            Err(JobError::WorkerFailure { task_id, job_id }.into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Only meaningful for the Scrapyd backend; local tasks die with the process
async fn handle_status(config: &Config, task_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let service = JobService::from_config(config)?;
    let state = service.status(task_id).await?;
    println!("{}", state);
    Ok(())
}

fn open_store(config: &Config) -> Result<SqliteStore, Box<dyn std::error::Error>> {
    let path = Path::new(&config.output.database_path);
    if !path.exists() {
        tracing::error!("Database not found: {}", path.display());
        return Err(format!("Database not found: {}", path.display()).into());
    }
    Ok(SqliteStore::new(path)?)
}

fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(config)?;
    let stats = load_statistics(&store)?;
    print_statistics(&stats);
    Ok(())
}

fn handle_purge(
    config: &Config,
    older_than_hours: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let hours = older_than_hours
        .or(config.output.retention_hours)
        .ok_or("No retention window: pass --older-than-hours or set output.retention-hours")?;
    // Past roughly a century the cutoff stops meaning anything
    if hours > 1_000_000 {
        return Err(format!("Retention window too large: {} hours", hours).into());
    }
    let hours = i64::try_from(hours)?;

    let store = open_store(config)?;
    let cutoff = Utc::now() - ChronoDuration::hours(hours);
    let removed = store.purge_before(cutoff)?;

    tracing::info!("Purged {} records older than {}", removed, cutoff);
    println!("Removed {} records", removed);
    Ok(())
}
