//! Swarmfetch main entry point
//!
//! This is the command-line interface for the Swarmfetch crawler and load generator.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use swarmfetch::config::{load_config_with_hash, validate_for_crawl, validate_for_load, Config};
use swarmfetch::crawler::crawl;
use swarmfetch::loadgen::{run_load, StopSignal};
use swarmfetch::output::{
    open_visit_sink, print_crawl_report, print_pool_summary, LineSink, SharedLineSink, VisitSink,
};
use tracing_subscriber::EnvFilter;

/// Swarmfetch: a concurrent HTTP crawler and load generator
///
/// Crawl mode follows links from a seed URL without leaving its host. Load
/// mode cycles a list of URLs from many worker threads until interrupted.
#[derive(Parser, Debug)]
#[command(name = "swarmfetch")]
#[command(version)]
#[command(about = "A concurrent HTTP crawler and load generator", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

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
    /// Crawl a site starting from a seed URL
    Crawl(CrawlArgs),

    /// Generate load against a fixed list of URLs
    Load(LoadArgs),
}

#[derive(Args, Debug)]
struct CrawlArgs {
    /// Seed URL; its host bounds the crawl
    #[arg(value_name = "URL")]
    seed: Option<String>,

    /// Skip URLs matching this regex (repeatable, first match wins)
    #[arg(long = "exclude", value_name = "REGEX")]
    exclude: Vec<String>,

    /// Maximum concurrent transfers
    #[arg(short = 'e', long = "events", value_name = "N")]
    max_concurrent: Option<usize>,

    /// Write visited URLs to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct LoadArgs {
    /// File with one URL per line
    #[arg(short = 'f', long = "url-file", value_name = "FILE")]
    url_file: Option<PathBuf>,

    /// Number of worker threads
    #[arg(short = 'j', long = "jobs", value_name = "N")]
    workers: Option<usize>,

    /// Maximum concurrent transfers per worker
    #[arg(short = 'e', long = "events", value_name = "N")]
    max_concurrent: Option<usize>,

    /// Directory for per-worker stats files
    #[arg(long, value_name = "DIR")]
    stats_dir: Option<PathBuf>,

    /// Stop after this many seconds
    #[arg(long, value_name = "SECS")]
    duration: Option<u64>,

    /// Write visited URLs to this file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load configuration, or start from defaults
    let config = match &cli.config {
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

    match cli.command {
        Command::Crawl(args) => handle_crawl(config, args).await,
        Command::Load(args) => handle_load(config, args).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("swarmfetch=info,warn"),
            1 => EnvFilter::new("swarmfetch=debug,info"),
            2 => EnvFilter::new("swarmfetch=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Logs go to stderr so visited URLs on stdout stay clean
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles crawl mode
async fn handle_crawl(mut config: Config, args: CrawlArgs) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(seed) = args.seed {
        config.crawl.seed = Some(seed);
    }
    config.crawl.exclude.extend(args.exclude);
    if let Some(n) = args.max_concurrent {
        config.engine.max_concurrent = n;
    }
    if let Some(path) = args.output {
        config.output.visited_path = Some(path);
    }

    if let Err(e) = validate_for_crawl(&config) {
        tracing::error!("Invalid configuration: {}", e);
        return Err(e.into());
    }

    let sink = open_visit_sink(config.output.visited_path.as_deref())?;

    match crawl(&config, sink).await {
        Ok(report) => {
            print_crawl_report(&report);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}

/// Handles load mode
async fn handle_load(mut config: Config, args: LoadArgs) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = args.url_file {
        config.load.url_file = Some(path);
    }
    if let Some(n) = args.workers {
        config.load.workers = n;
    }
    if let Some(n) = args.max_concurrent {
        config.engine.max_concurrent = n;
    }
    if let Some(dir) = args.stats_dir {
        config.load.stats_dir = Some(dir);
    }
    if let Some(secs) = args.duration {
        config.load.duration_secs = Some(secs);
    }
    if let Some(path) = args.output {
        config.output.visited_path = Some(path);
    }

    if let Err(e) = validate_for_load(&config) {
        tracing::error!("Invalid configuration: {}", e);
        return Err(e.into());
    }

    // Load mode only records visits when asked to
    let sink = match &config.output.visited_path {
        Some(path) => Some(SharedLineSink::new(LineSink::create(path)?)),
        None => None,
    };

    tracing::info!("Press Ctrl-C to stop");
    match run_load(&config, StopSignal::new(), sink.clone()).await {
        Ok(summary) => {
            if let Some(mut sink) = sink {
                sink.flush()?;
            }
            print_pool_summary(&summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Load run failed: {}", e);
            Err(e.into())
        }
    }
}
