use async_trait::async_trait;
use crate::error::Result;

pub mod coincap;
pub mod types;

pub use coincap::CoinCapClient;
pub use types::{AssetDetails, AssetSummary};

/// Upstream source of the asset catalog and USD exchange rates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PricingService: Send + Sync {
    /// Every asset the upstream currently lists.
    async fn list_assets(&self) -> Result<Vec<AssetSummary>>;

    async fn asset_details(&self, id: &str) -> Result<AssetDetails>;

    /// Value of one unit of `id` in USD.
    async fn usd_rate(&self, id: &str) -> Result<f64>;
}
