use anyhow::Result;
use clap::Parser;
use log::info;
use std::sync::Arc;

use coincap_wallet::api::{CoinCapClient, PricingService};
use coincap_wallet::cli::Cli;
use coincap_wallet::config::Config;
use coincap_wallet::logging;
use coincap_wallet::resolver::FuzzyResolver;
use coincap_wallet::wallet::Wallet;
use coincap_wallet::web::WebServer;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli.config.unwrap_or_else(|| "config/config.toml".into());
    let config = match Config::load_or_default(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration from {:?}: {}", config_path, e);
            return Err(anyhow::anyhow!("Configuration loading failed: {}", e));
        }
    };
    logging::init(&config.logging, cli.debug)?;
    info!("Configuration loaded from {:?}", config_path);

    let pricing: Arc<dyn PricingService> = Arc::new(CoinCapClient::from_config(&config.api)?);
    info!("Using CoinCap API at {}", config.api.base_url);

    // A catalog we cannot load is fatal at startup.
    let resolver = FuzzyResolver::new(config.wallet.similarity_threshold);
    let wallet = Wallet::connect(pricing, resolver).await?;
    info!("Wallet ready with {} known assets", wallet.catalog().await.len());

    WebServer::new(wallet)
        .start(&config.server.host, config.server.port)
        .await?;
    Ok(())
}
