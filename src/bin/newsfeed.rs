//! Inspect a news dataset through the same operations the feed API serves.
//!
//! ```bash
//! newsfeed --data data/news_dataset.csv filters
//! newsfeed --config newsfeed.toml posts --label false --page 2 --limit 5
//! NEWSFEED_LOG_FORMAT=json RUST_LOG=newsfeed_engine=debug newsfeed trends
//! ```
//!
//! No model is attached, so every `ai_prediction` is `UNKNOWN`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use newsfeed_engine::config::FeedConfig;
use newsfeed_engine::feed::{Feed, PostsRequest};
use newsfeed_engine::ingestion::SourceEncoding;
use newsfeed_engine::processing::QueryFilters;
use newsfeed_engine::FeedResult;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML config file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Dataset path (overrides the config).
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Source encoding (overrides the config).
    #[arg(long, value_enum)]
    encoding: Option<EncodingArg>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EncodingArg {
    Utf8,
    Windows1252,
}

impl From<EncodingArg> for SourceEncoding {
    fn from(e: EncodingArg) -> Self {
        match e {
            EncodingArg::Utf8 => SourceEncoding::Utf8,
            EncodingArg::Windows1252 => SourceEncoding::Windows1252,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Filtered, paginated posts.
    Posts {
        #[arg(long)]
        platform: Option<String>,
        #[arg(long)]
        region: Option<String>,
        #[arg(long)]
        label: Option<String>,
        #[arg(long)]
        search: Option<String>,
        /// 1-indexed; non-numeric or < 1 is treated as 1.
        #[arg(long)]
        page: Option<String>,
        /// Page size; non-numeric falls back to the configured default, < 1 is treated as 1.
        #[arg(long)]
        limit: Option<String>,
    },
    /// Label, platform and region counts.
    Trends,
    /// Prediction counts.
    AiTrends,
    /// Distinct platform, region and language values.
    Filters,
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "newsfeed failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "newsfeed_engine=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so stdout stays machine-readable JSON.
    match std::env::var("NEWSFEED_LOG_FORMAT").as_deref() {
        Ok("json") => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        _ => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

fn run(cli: Cli) -> FeedResult<()> {
    let mut config = match &cli.config {
        Some(path) => FeedConfig::load(path)?,
        None => FeedConfig::default(),
    };
    if let Some(path) = cli.data {
        config.dataset.path = path;
    }
    if let Some(encoding) = cli.encoding {
        config.dataset.encoding = encoding.into();
    }

    let (feed, _stats) = Feed::load(&config, None)?;

    match cli.command {
        Command::Posts {
            platform,
            region,
            label,
            search,
            page,
            limit,
        } => print_json(&feed.posts(&PostsRequest {
            filters: QueryFilters {
                platform,
                region,
                label,
                search,
            },
            page,
            limit,
        })),
        Command::Trends => print_json(&feed.trends()),
        Command::AiTrends => print_json(&feed.ai_trends()),
        Command::Filters => print_json(&feed.filters()),
    }
}

fn print_json<T: Serialize>(value: &T) -> FeedResult<()> {
    let text = serde_json::to_string_pretty(value).map_err(std::io::Error::from)?;
    println!("{text}");
    Ok(())
}
