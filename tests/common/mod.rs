#![allow(dead_code)]

use async_trait::async_trait;
use coincap_wallet::api::{AssetDetails, AssetSummary, PricingService};
use coincap_wallet::catalog::AssetCatalog;
use coincap_wallet::config::Config;
use coincap_wallet::error::{Error, Result};
use coincap_wallet::resolver::FuzzyResolver;
use coincap_wallet::wallet::Wallet;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const BTC_RATE: f64 = 42000.0;
pub const ETH_RATE: f64 = 3000.0;

/// Canned upstream answers shaped like CoinCap's fixtures.
#[derive(Debug, Default)]
pub struct FixturePricing {
    pub assets: Vec<AssetDetails>,
    pub rates: HashMap<String, f64>,
    pub list_calls: AtomicUsize,
}

impl FixturePricing {
    pub fn new() -> Self {
        let assets = vec![
            details("bitcoin", "1", "BTC", "Bitcoin", Some("https://blockchain.info/")),
            details("ethereum", "2", "ETH", "Ethereum", Some("https://etherscan.io/")),
            details("bitcoin-cash", "3", "BCH", "Bitcoin Cash", Some("https://blockchair.com/bitcoin-cash/blocks")),
            details("tether", "4", "USDT", "Tether", None),
        ];
        let rates = HashMap::from([
            ("bitcoin".to_string(), BTC_RATE),
            ("ethereum".to_string(), ETH_RATE),
            ("tether".to_string(), 1.0),
        ]);
        Self {
            assets,
            rates,
            list_calls: AtomicUsize::new(0),
        }
    }
}

pub fn details(id: &str, rank: &str, symbol: &str, name: &str, explorer: Option<&str>) -> AssetDetails {
    AssetDetails {
        id: id.to_string(),
        rank: Some(rank.to_string()),
        symbol: symbol.to_string(),
        name: name.to_string(),
        supply: Some("1000000.0000000000000000".to_string()),
        max_supply: None,
        market_cap_usd: Some("1000000000.00".to_string()),
        volume_usd24_hr: Some("50000000.00".to_string()),
        price_usd: Some("1000.00".to_string()),
        change_percent24_hr: Some("0.50".to_string()),
        vwap24_hr: Some("990.00".to_string()),
        explorer: explorer.map(str::to_string),
    }
}

#[async_trait]
impl PricingService for FixturePricing {
    async fn list_assets(&self) -> Result<Vec<AssetSummary>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.assets.iter().map(AssetSummary::from).collect())
    }

    async fn asset_details(&self, id: &str) -> Result<AssetDetails> {
        self.assets
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| Error::UpstreamFailure(format!("{} not found", id)))
    }

    async fn usd_rate(&self, id: &str) -> Result<f64> {
        self.rates
            .get(id)
            .copied()
            .ok_or_else(|| Error::UpstreamFailure(format!("no rate for {}", id)))
    }
}

pub async fn create_test_wallet() -> (Wallet, Arc<FixturePricing>) {
    let pricing = Arc::new(FixturePricing::new());
    let config = Config::default();
    let wallet = Wallet::connect(
        pricing.clone(),
        FuzzyResolver::new(config.wallet.similarity_threshold),
    )
    .await
    .expect("fixture catalog loads");
    (wallet, pricing)
}

pub fn create_test_catalog() -> AssetCatalog {
    AssetCatalog::from_assets(FixturePricing::new().assets.iter().map(AssetSummary::from))
}
