//! Locus Search CLI - query topic data sources from the command line.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use locus_search::{
    sources::{DuckDuckGo, Wikipedia},
    Registry, Topic,
};

/// Locus Search - topic data sources CLI
#[derive(Parser)]
#[command(name = "locus-search")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Search a source for topics
    Topics(TopicsArgs),

    /// Expand a topic into detail records
    Data(DataArgs),

    /// Check availability of every source
    Check,

    /// List available sources
    Sources,
}

#[derive(Parser)]
struct TopicsArgs {
    /// Search query
    query: String,

    /// Source to query (ddg, wiki)
    #[arg(short, long, default_value = "ddg")]
    source: String,

    /// Maximum number of topics (0 uses the source default)
    #[arg(short, long, default_value = "0")]
    limit: usize,

    /// Restrict results to a host, e.g. docs.rs or site:docs.rs
    #[arg(long)]
    site: Option<String>,

    /// Request timeout in seconds
    #[arg(short, long, default_value = "8")]
    timeout: u64,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,
}

#[derive(Parser)]
struct DataArgs {
    /// Source to query (ddg, wiki)
    source: String,

    /// Topic identifier returned by `topics`
    topic_id: i64,

    /// Maximum number of records
    #[arg(short, long, default_value = "1")]
    limit: usize,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output
    Json,
    /// Compact single-line output
    Compact,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Topics(args) => run_topics(args).await,
        Commands::Data(args) => run_data(args).await,
        Commands::Check => run_check().await,
        Commands::Sources => list_sources(),
    }
}

fn list_sources() -> Result<()> {
    println!("Available sources:\n");
    println!("    ddg      - DuckDuckGo (HTML results, supports --site)");
    println!("    wiki     - Wikipedia (MediaWiki API, supports topic data)");
    println!();
    println!("Usage: locus-search topics \"query\" -s ddg --site docs.rs");
    Ok(())
}

fn build_registry(site: Option<String>, timeout: Option<u64>) -> Result<Registry> {
    let mut ddg = DuckDuckGo::new();
    let mut wiki = Wikipedia::new();
    if let Some(timeout) = timeout {
        ddg = ddg.with_timeout(timeout);
        wiki = wiki.with_timeout(timeout);
    }
    if let Some(site) = site {
        ddg = ddg.with_site_filter(site);
    }

    let mut registry = Registry::new();
    registry.register(ddg)?;
    registry.register(wiki)?;
    Ok(registry)
}

async fn run_topics(args: TopicsArgs) -> Result<()> {
    let registry = build_registry(args.site, Some(args.timeout))?;
    let Some(source) = registry.get(&args.source) else {
        anyhow::bail!("Unknown source '{}'", args.source);
    };

    let topics = source.fetch_topics(args.limit, &args.query).await?;
    print_topics(&args.query, &topics, args.format)
}

fn print_topics(query: &str, topics: &[Topic], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            if topics.is_empty() {
                println!("No topics found for \"{}\"", query);
                return Ok(());
            }
            println!("\nTopics for \"{}\" ({} results):\n", query, topics.len());
            for (i, topic) in topics.iter().enumerate() {
                println!("{}. {}", i + 1, topic.title);
                println!("   URL: {}", topic.source_url);
                println!("   ID: {} | Site: {}", topic.topic_id, topic.site);
                println!();
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(topics)?);
        }
        OutputFormat::Compact => {
            for topic in topics {
                println!("{}\t{}\t{}", topic.topic_id, topic.title, topic.source_url);
            }
        }
    }
    Ok(())
}

async fn run_data(args: DataArgs) -> Result<()> {
    let registry = build_registry(None, None)?;
    let Some(source) = registry.get(&args.source) else {
        anyhow::bail!("Unknown source '{}'", args.source);
    };

    let records = source.fetch_data(args.limit, args.topic_id).await?;
    if records.is_empty() {
        println!("No data available for topic {}", args.topic_id);
    }
    for record in records {
        println!("{}\n", record.text);
        println!("Source: {}", record.source_url);
    }
    Ok(())
}

async fn run_check() -> Result<()> {
    let registry = build_registry(None, None)?;
    for (shortcut, available) in registry.check_all().await {
        let status = if available { "available" } else { "unavailable" };
        println!("{:<8} {}", shortcut, status);
    }
    Ok(())
}
