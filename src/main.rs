//! coupang-reviews - Collects Coupang product reviews into an Excel workbook.

use anyhow::Result;
use clap::Parser;
use coupang_reviews::commands::CollectCommand;
use coupang_reviews::config::Config;
use std::path::PathBuf;
use tracing::{error, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "coupang-reviews",
    version,
    about = "Collects Coupang product reviews into an Excel workbook",
    long_about = "Paginates the Coupang review API for each product ID, throttling requests to avoid blocks, and writes one combined sheet plus one sheet per product."
)]
struct Cli {
    /// Product IDs to collect (defaults to the `products` list in the config file)
    product_ids: Vec<String>,

    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory the workbook is written to
    #[arg(short, long, env = "COUPANG_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Delay between requests in milliseconds
    #[arg(long, env = "COUPANG_DELAY_MS")]
    delay: Option<u64>,

    /// Number of products collected at the same time
    #[arg(long)]
    concurrency: Option<usize>,

    /// Connect directly instead of through the configured proxy
    #[arg(long)]
    no_proxy: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    if !cli.product_ids.is_empty() {
        config.products = cli.product_ids;
    }
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }
    if let Some(delay) = cli.delay {
        config.delay_ms = delay;
    }
    if let Some(concurrency) = cli.concurrency {
        config.concurrency = concurrency;
    }
    if cli.no_proxy {
        config.proxy_enabled = false;
    }

    let cmd = CollectCommand::new(config);
    match cmd.execute().await {
        Ok(report) => {
            println!("{}", report.summary);
            println!("Workbook written to {}", report.workbook.display());
            Ok(())
        }
        Err(e) => {
            error!("Run failed: {:#}", e);
            Err(e)
        }
    }
}
