//! Configurator command-line front end
//!
//! Reads a selection as JSON, runs it through the pricing or rules engine and
//! prints the response JSON.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use configurator_common::{Selection, VERSION};
use configurator_service::{ConfiguratorConfig, Services};

/// Kitchen configurator pricing and rules CLI
#[derive(Parser)]
#[command(name = "configurator")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Print compact JSON instead of pretty JSON
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Price a selection
    Estimate {
        /// Selection JSON file ("-" for stdin)
        #[arg(short, long, default_value = "-")]
        file: PathBuf,
    },

    /// Check a selection against the configuration rules
    Validate {
        /// Selection JSON file ("-" for stdin)
        #[arg(short, long, default_value = "-")]
        file: PathBuf,
    },

    /// Replace an option's add-on price, then price a selection with it
    UpdateOption {
        /// Option id
        #[arg(long)]
        id: String,

        /// New add-on price
        #[arg(long)]
        price: Decimal,

        /// Selection JSON file ("-" for stdin)
        #[arg(short, long, default_value = "-")]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    info!("Starting configurator v{}", VERSION);

    let config = ConfiguratorConfig::load()?;
    info!(
        redis = config.cache.redis_url.is_some(),
        pricing_ttl_secs = config.cache.pricing_ttl_secs,
        rules_ttl_secs = config.cache.rules_ttl_secs,
        "Loaded configuration"
    );

    let services = Services::from_config(&config).await;

    match cli.command {
        Commands::Estimate { file } => {
            let selection = read_selection(&file)?;
            let estimate = services.pricing.estimate(&services.context(), selection).await?;
            print_json(&estimate, cli.compact)?;
        }
        Commands::Validate { file } => {
            let selection = read_selection(&file)?;
            let report = services.rules.validate(&services.context(), selection).await?;
            print_json(&report, cli.compact)?;
        }
        Commands::UpdateOption { id, price, file } => {
            let selection = read_selection(&file)?;
            services.matrix.update_option(id, price)?;
            let estimate = services.pricing.estimate(&services.context(), selection).await?;
            print_json(&estimate, cli.compact)?;
        }
    }

    Ok(())
}

fn read_selection(path: &Path) -> Result<Selection> {
    let raw = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read selection from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read selection from {}", path.display()))?
    };

    serde_json::from_str(&raw).context("Selection is not valid JSON")
}

fn print_json<T: Serialize>(value: &T, compact: bool) -> Result<()> {
    let out = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{out}");
    Ok(())
}
