//! Subreddit-Harvest main entry point
//!
//! This is the command-line interface for the Subreddit-Harvest scraper.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use subreddit_harvest::config::{load_config_with_hash, Config, TransportStrategy};
use subreddit_harvest::harvest;
use subreddit_harvest::output::{print_statistics, write_digest, write_posts_json};
use tracing_subscriber::EnvFilter;

/// Subreddit-Harvest: a resilient subreddit scraper
///
/// Subreddit-Harvest walks subreddit listings, collects each post's top
/// comments, and prints a shuffled digest ready for a summarizer.
#[derive(Parser, Debug)]
#[command(name = "subreddit-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A resilient subreddit scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be fetched without fetching
    #[arg(long)]
    dry_run: bool,

    /// Also write all harvested posts as JSON to this path
    #[arg(long, value_name = "PATH")]
    json: Option<PathBuf>,

    /// Where to write the summarizer digest ("-" for stdout)
    #[arg(long, value_name = "PATH", default_value = "-")]
    digest: PathBuf,

    /// Number of posts in the digest (overrides output.digest-posts)
    #[arg(long, value_name = "N")]
    max_posts: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_harvest(config, &cli).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so the digest can be piped from stdout.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("subreddit_harvest=info,warn"),
            1 => EnvFilter::new("subreddit_harvest=debug,info"),
            2 => EnvFilter::new("subreddit_harvest=trace,debug"),
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

/// Handles the --dry-run mode: shows the resolved configuration
fn handle_dry_run(config: &Config) {
    println!("=== Subreddit-Harvest Dry Run ===\n");

    println!("Harvest:");
    println!("  Category: {}", config.harvest.category);
    if config.harvest.category.uses_time_window() {
        println!("  Time window: {}", config.harvest.time_window);
    }
    println!("  Posts per subreddit: {}", config.harvest.posts_per_subreddit);
    if config.harvest.include_comments {
        println!(
            "  Comments per post: {}",
            config.harvest.max_comments_per_post
        );
    } else {
        println!("  Comments: disabled");
    }

    println!("\nTransport:");
    match config.transport.strategy {
        TransportStrategy::Direct => println!("  Strategy: direct"),
        TransportStrategy::Proxy => println!(
            "  Strategy: proxy ({})",
            config.transport.proxy_url.as_deref().unwrap_or_default()
        ),
        TransportStrategy::Relay => {
            if let Some(relay) = &config.transport.relay {
                println!("  Strategy: relay ({}, zone {})", relay.endpoint, relay.zone);
            }
        }
    }
    println!("  Base URL: {}", config.transport.base_url);
    println!("  Verify TLS: {}", config.transport.verify_tls);
    println!("  Timeout: {}s", config.transport.timeout_secs);
    println!(
        "  Retry: {} attempts, {}ms base backoff",
        config.transport.max_attempts, config.transport.backoff_base_ms
    );

    println!("\nPacing:");
    println!(
        "  Between pages: {}-{}ms",
        config.pacing.page_delay_min_ms, config.pacing.page_delay_max_ms
    );
    println!(
        "  Between subreddits: {}-{}ms",
        config.pacing.subreddit_delay_min_ms, config.pacing.subreddit_delay_max_ms
    );
    println!(
        "  Concurrent detail fetches: {}",
        config.pacing.max_concurrent_details
    );

    println!("\nSubreddits ({}):", config.harvest.subreddits.len());
    for subreddit in &config.harvest.subreddits {
        println!("  - r/{}", subreddit);
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would fetch up to {} posts",
        config.harvest.subreddits.len() * config.harvest.posts_per_subreddit
    );
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config, cli: &Cli) -> anyhow::Result<()> {
    let max_posts = cli.max_posts.unwrap_or(config.output.digest_posts);
    let max_comments = config.output.digest_comments;

    let result = harvest(config).await.context("Harvest could not start")?;

    if result.posts.is_empty() {
        tracing::warn!("No posts were harvested");
    }

    write_digest(&result.posts, max_posts, max_comments, &cli.digest)
        .with_context(|| format!("Failed to write digest to {}", describe(&cli.digest)))?;

    if let Some(json_path) = &cli.json {
        write_posts_json(&result.posts, json_path)
            .with_context(|| format!("Failed to write JSON to {}", describe(json_path)))?;
        tracing::info!("Wrote {} posts to {}", result.posts.len(), describe(json_path));
    }

    if !cli.quiet {
        print_statistics(&result.stats);
    }

    Ok(())
}

fn describe(path: &Path) -> String {
    if path.as_os_str() == "-" {
        "stdout".to_string()
    } else {
        path.display().to_string()
    }
}
