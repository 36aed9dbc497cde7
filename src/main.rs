use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use pickup_watcher::catalog::{self, Catalog};
use pickup_watcher::catalog_seeder::CatalogSeeder;
use pickup_watcher::fetcher::AvailabilityFetcher;
use pickup_watcher::plugins::notifiers::{Credential, LineNotifier};
use pickup_watcher::{AppConfig, Monitor, MonitorSettings, TracingSink, WatchList};

#[derive(Debug, Parser)]
#[command(
    name = "pickup-watcher",
    version,
    about = "Watch in-store pickup availability and get notified"
)]
struct Cli {
    /// Extra configuration file layered over config/default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List catalog models of a family, sorted by color
    Models {
        #[arg(long)]
        family: String,
    },
    /// List the families present in the catalog
    Families,
    /// Poll availability until interrupted
    Watch {
        #[arg(long)]
        family: String,
        /// Part numbers to watch; defaults to the whole family
        #[arg(long = "code")]
        codes: Vec<String>,
        /// Notification token, overrides notifier.token
        #[arg(long)]
        token: Option<String>,
    },
    /// Scrape a product-selection page into the catalog
    SeedCatalog {
        #[arg(long)]
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).context("invalid configuration")?;
    let _guard = pickup_watcher::utils::logger::init_logger(&config.logging, cli.verbose)?;

    if config.metrics.enabled {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(([0, 0, 0, 0], config.metrics.port))
            .install()
            .context("failed to start metrics exporter")?;
        info!("Serving metrics on port {}", config.metrics.port);
    }

    match cli.command {
        Command::Models { family } => {
            for model in catalog::load_family(&config.catalog.path, &family)? {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    model.display_name(),
                    model.formatted_price(),
                    model.color(),
                    model.capacity(),
                    model.code()
                );
            }
        }
        Command::Families => {
            let catalog = Catalog::load(&config.catalog.path)?;
            if catalog.is_empty() {
                warn!("Catalog {} has no models, run seed-catalog first", config.catalog.path);
            }
            for family in catalog.families() {
                println!("{}", family);
            }
        }
        Command::Watch { family, codes, token } => {
            watch(&config, &family, codes, token).await?;
        }
        Command::SeedCatalog { url } => {
            let seeder = CatalogSeeder::new(&config.fetcher)?;
            let found = seeder.seed(&url, &config.catalog.path).await?;
            info!("Catalog updated with {} models", found);
        }
    }

    Ok(())
}

async fn watch(
    config: &AppConfig,
    family: &str,
    codes: Vec<String>,
    token: Option<String>,
) -> Result<()> {
    let token = token
        .or_else(|| config.notifier.token.clone())
        .context("a notification token is required (--token or notifier.token)")?;
    let credential = Credential::new(token)?;

    let models = catalog::load_family(&config.catalog.path, family)?;
    let watch_list = if codes.is_empty() {
        WatchList::new(models)
    } else {
        WatchList::select(models, &codes)?
    };

    let source = Arc::new(AvailabilityFetcher::new(&config.fetcher)?);
    let notifier = Arc::new(LineNotifier::from_config(&config.notifier, credential));
    let monitor = Monitor::new(
        source,
        notifier,
        Arc::new(TracingSink),
        MonitorSettings::from(&config.monitor),
    );

    info!("Starting Pickup Watcher...");
    let handle = monitor.spawn(watch_list);

    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");

    let stats = handle.stop().await?;
    info!(
        "Finished {} pass(es): {} in stock, {} fetch failures, {} notifications sent",
        stats.passes, stats.in_stock, stats.fetch_failures, stats.notifications_sent
    );
    Ok(())
}
