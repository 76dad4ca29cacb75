//! Ringtone Fetcher main entry point
//!
//! Command-line launcher for the ringtone download service.

use anyhow::Context;
use clap::Parser;
use ringtone_fetcher::config::{load_config_with_hash, validate, Config};
use ringtone_fetcher::server::serve;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Ringtone Fetcher: a policy-gated bulk file fetcher
///
/// Serves an HTTP API that downloads whitelisted, robots.txt-permitted
/// files concurrently and returns them as a single zip archive.
#[derive(Parser, Debug)]
#[command(name = "ringtone-fetcher")]
#[command(version)]
#[command(about = "A policy-gated bulk ringtone fetcher", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on, overriding the configuration
    #[arg(short, long, value_name = "ADDR")]
    bind: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate the configuration, print it and exit
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }
    validate(&config).context("Invalid configuration")?;

    if cli.dry_run {
        print_config(&config);
        return Ok(());
    }

    serve(config).await.context("Server failed")?;

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("ringtone_fetcher=info,tower_http=info,warn"),
            1 => EnvFilter::new("ringtone_fetcher=debug,tower_http=debug,info"),
            2 => EnvFilter::new("ringtone_fetcher=trace,tower_http=trace,debug"),
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

/// Prints the effective configuration for --dry-run
fn print_config(config: &Config) {
    println!("=== Ringtone Fetcher Dry Run ===\n");

    println!("Server:");
    println!("  Bind: {}", config.server.bind);

    println!("\nFetch:");
    println!("  Default limit: {}", config.fetch.default_limit);
    println!("  Default concurrency: {}", config.fetch.default_concurrency);
    println!("  Max concurrency: {}", config.fetch.max_concurrency);
    println!("  robots.txt timeout: {}ms", config.fetch.robots_timeout_ms);
    println!(
        "  robots.txt cache TTL: {}s",
        config.fetch.robots_cache_ttl_secs
    );
    println!("  Connect timeout: {}s", config.fetch.connect_timeout_secs);
    println!("  Request timeout: {}s", config.fetch.request_timeout_secs);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Header: {}", config.user_agent.header_value());

    println!("\n✓ Configuration is valid");
}
