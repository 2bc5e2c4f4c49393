use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use m3u_subscribe::{
    utils::format_channel_name, Config, ProgressCallback, SubscribeIngestor, SubscribeMode,
    SubscribeOptions, SubscribeSource,
};

#[derive(Parser)]
#[command(name = "m3u-subscribe")]
#[command(version = "0.1.0")]
#[command(about = "Aggregate M3U/TXT subscription playlists into one channel catalog")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// JSON file with the source list (URL strings or {url, region, type} objects)
    #[arg(short, long)]
    sources: String,

    /// Catalog mode
    #[arg(short, long, value_enum, default_value = "plain")]
    mode: ModeArg,

    /// Comma-separated channel names to keep; everything else is dropped
    #[arg(long)]
    filter: Option<String>,

    /// File with whitelisted source URLs, one per line
    #[arg(long)]
    whitelist: Option<String>,

    /// Disable fetch retries
    #[arg(long)]
    no_retry: bool,

    /// Write the merged catalog to this file instead of stdout
    #[arg(short, long)]
    output: Option<String>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[derive(clap::ValueEnum, Clone, Copy)]
enum ModeArg {
    Plain,
    Multicast,
    Hotel,
}

impl From<ModeArg> for SubscribeMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Plain => SubscribeMode::Plain,
            ModeArg::Multicast => SubscribeMode::Multicast,
            ModeArg::Hotel => SubscribeMode::Hotel,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("m3u_subscribe={}", cli.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting m3u-subscribe v{}", env!("CARGO_PKG_VERSION"));

    std::env::set_var("CONFIG_FILE", &cli.config);
    let config = Config::load()?;

    let sources: Vec<SubscribeSource> = serde_json::from_str(
        &std::fs::read_to_string(&cli.sources)
            .with_context(|| format!("failed to read source list {}", cli.sources))?,
    )
    .with_context(|| format!("failed to parse source list {}", cli.sources))?;
    info!("Loaded {} sources from {}", sources.len(), cli.sources);

    let whitelist = match &cli.whitelist {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read whitelist {}", path))?
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect(),
        None => Vec::new(),
    };

    let filter_names: Option<HashSet<String>> = cli.filter.as_deref().map(|filter| {
        filter
            .split(',')
            .map(format_channel_name)
            .filter(|name| !name.is_empty())
            .collect()
    });

    let progress: ProgressCallback = Arc::new(|message: &str, percent: u8| {
        info!("[{:>3}%] {}", percent, message);
    });

    let options = SubscribeOptions {
        mode: cli.mode.into(),
        filter_names,
        retry_enabled: !cli.no_retry,
        error_print: true,
        whitelist,
        progress: Some(progress),
    };

    let ingestor = SubscribeIngestor::new(config);
    let catalog = ingestor.ingest(sources, options).await;

    let rendered = serde_json::to_string_pretty(&catalog)?;
    match &cli.output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("failed to write catalog to {}", path))?;
            info!("Catalog written to {}", path);
        }
        None => println!("{}", rendered),
    }

    Ok(())
}
