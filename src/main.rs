//! hotel-compare - Compare hotel prices for one stay from the command line

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use hotel_compare::commands::{CompareCommand, RateCommand};
use hotel_compare::config::{Config, OutputFormat};
use hotel_compare::serp::SearchContext;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "hotel-compare",
    version,
    about = "Compare hotel prices for one stay",
    long_about = "Searches several hotels concurrently through SerpAPI Google Hotels, converts prices into a second currency and shows the cheapest."
)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Maximum searches in flight
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    /// Delay before each search in milliseconds
    #[arg(long, global = true, env = "HOTEL_COMPARE_DELAY")]
    delay: Option<u64>,

    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true, env = "HOTEL_COMPARE_PROXY")]
    proxy: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare prices for several hotels
    #[command(alias = "c")]
    Compare {
        /// Hotel names to compare
        #[arg(required = true)]
        hotels: Vec<String>,

        /// City or area appended to each search
        #[arg(short, long)]
        location: String,

        /// Check-in date (YYYY-MM-DD)
        #[arg(long)]
        check_in: NaiveDate,

        /// Check-out date (YYYY-MM-DD)
        #[arg(long)]
        check_out: NaiveDate,

        /// Number of adults
        #[arg(short, long)]
        adults: Option<u32>,
    },

    /// Show the exchange rate used for conversion
    Rate {
        /// Source currency code
        #[arg(long)]
        from: Option<String>,

        /// Target currency code
        #[arg(long)]
        to: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    if let Some(format) = cli.format {
        config.format = format;
    }
    if let Some(concurrency) = cli.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(delay) = cli.delay {
        config.delay_ms = delay;
    }
    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }

    match cli.command {
        Commands::Compare { hotels, location, check_in, check_out, adults } => {
            if let Some(adults) = adults {
                config.adults = adults;
            }

            let ctx = SearchContext::new(location, check_in, check_out, config.adults);
            let cmd = CompareCommand::new(config)?;
            let output = cmd.execute(&hotels, &ctx).await?;
            println!("{}", output);
        }

        Commands::Rate { from, to } => {
            if let Some(from) = from {
                config.source_currency = from;
            }
            if let Some(to) = to {
                config.target_currency = to;
            }

            let cmd = RateCommand::new(config)?;
            let output = cmd.execute().await?;
            println!("{}", output);
        }
    }

    Ok(())
}
