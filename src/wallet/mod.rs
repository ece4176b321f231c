use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use crate::api::PricingService;
use crate::catalog::AssetCatalog;
use crate::error::{Error, Result};
use crate::resolver::FuzzyResolver;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsdBalance {
    pub id: String,
    pub balance: f64,
    pub rate_usd: f64,
    pub amount_usd: f64,
}

/// In-memory per-asset balances, validated against the asset catalog.
///
/// Cloning is cheap and every clone shares the same ledger.
#[derive(Clone)]
pub struct Wallet {
    balances: Arc<Mutex<HashMap<String, f64>>>,
    catalog: Arc<RwLock<Arc<AssetCatalog>>>,
    resolver: Arc<FuzzyResolver>,
    pricing: Arc<dyn PricingService>,
}

impl Wallet {
    pub fn new(
        pricing: Arc<dyn PricingService>,
        catalog: AssetCatalog,
        resolver: FuzzyResolver,
    ) -> Self {
        Self {
            balances: Arc::new(Mutex::new(HashMap::new())),
            catalog: Arc::new(RwLock::new(Arc::new(catalog))),
            resolver: Arc::new(resolver),
            pricing,
        }
    }

    /// Loads the catalog from `pricing` and builds an empty wallet over it.
    pub async fn connect(pricing: Arc<dyn PricingService>, resolver: FuzzyResolver) -> Result<Self> {
        let catalog = AssetCatalog::load(pricing.as_ref()).await?;
        Ok(Self::new(pricing, catalog, resolver))
    }

    pub fn pricing(&self) -> &Arc<dyn PricingService> {
        &self.pricing
    }

    pub async fn catalog(&self) -> Arc<AssetCatalog> {
        self.catalog.read().await.clone()
    }

    /// Rebuilds the catalog from upstream. Balances are kept and the old
    /// catalog stays in place if the reload fails.
    pub async fn reload_catalog(&self) -> Result<usize> {
        let fresh = AssetCatalog::load(self.pricing.as_ref()).await?;
        let count = fresh.len();
        *self.catalog.write().await = Arc::new(fresh);
        info!("Asset catalog reloaded with {} assets", count);
        Ok(count)
    }

    /// Exact name lookup first, then the fuzzy resolver.
    pub async fn resolve_name(&self, name: &str) -> Result<String> {
        let catalog = self.catalog().await;
        if let Some(id) = catalog.lookup_name(name) {
            return Ok(id.to_string());
        }
        let matched = self
            .resolver
            .resolve(name, catalog.names())
            .ok_or_else(|| {
                warn!("Could not match asset name {:?}", name);
                Error::NoFuzzyMatch(name.to_string())
            })?;
        catalog
            .lookup_name(matched)
            .map(str::to_string)
            .ok_or_else(|| Error::NoFuzzyMatch(name.to_string()))
    }

    async fn ensure_known(&self, id: &str) -> Result<()> {
        if self.catalog.read().await.contains_id(id) {
            Ok(())
        } else {
            Err(Error::InvalidIdentifier(id.to_string()))
        }
    }

    pub async fn add_by_id(&self, id: &str, amount: f64) -> Result<f64> {
        self.ensure_known(id).await?;
        let mut balances = self.balances.lock().await;
        let balance = balances.entry(id.to_string()).or_insert(0.0);
        let updated = *balance + amount;
        if !updated.is_finite() {
            return Err(Error::InvalidNumericInput(format!(
                "adding {} to {} overflows its balance",
                amount, id
            )));
        }
        *balance = updated;
        info!("Added {} to {}, balance now {}", amount, id, updated);
        Ok(updated)
    }

    pub async fn add_by_name(&self, name: &str, amount: f64) -> Result<f64> {
        let id = self.resolve_name(name).await?;
        self.add_by_id(&id, amount).await
    }

    pub async fn set_by_id(&self, id: &str, amount: f64) -> Result<f64> {
        self.ensure_known(id).await?;
        if !amount.is_finite() {
            return Err(Error::InvalidNumericInput(amount.to_string()));
        }
        let mut balances = self.balances.lock().await;
        balances.insert(id.to_string(), amount);
        info!("Set {} balance to {}", id, amount);
        Ok(amount)
    }

    pub async fn set_by_name(&self, name: &str, amount: f64) -> Result<f64> {
        let id = self.resolve_name(name).await?;
        self.set_by_id(&id, amount).await
    }

    /// Zero for anything never stored. The id is not checked against the
    /// catalog here, unlike the write paths.
    pub async fn balance_by_id(&self, id: &str) -> f64 {
        self.balances.lock().await.get(id).copied().unwrap_or(0.0)
    }

    pub async fn balance_by_name(&self, name: &str) -> Result<f64> {
        let id = self.resolve_name(name).await?;
        Ok(self.balance_by_id(&id).await)
    }

    /// Values an arbitrary `amount` of `id` at the current USD rate.
    pub async fn convert_to_usd(&self, id: &str, amount: f64) -> Result<UsdBalance> {
        let rate_usd = self.pricing.usd_rate(id).await?;
        Ok(UsdBalance {
            id: id.to_string(),
            balance: amount,
            rate_usd,
            amount_usd: amount * rate_usd,
        })
    }

    pub async fn balance_in_usd_by_id(&self, id: &str) -> Result<UsdBalance> {
        let balance = self.balance_by_id(id).await;
        self.convert_to_usd(id, balance).await
    }

    pub async fn total_balance_in_usd(&self) -> Result<f64> {
        let mut total = 0.0;
        for (id, balance) in self.contents().await {
            total += self.convert_to_usd(&id, balance).await?.amount_usd;
        }
        Ok(total)
    }

    /// Sorted snapshot of every stored balance.
    pub async fn contents(&self) -> BTreeMap<String, f64> {
        self.balances
            .lock()
            .await
            .iter()
            .map(|(id, balance)| (id.clone(), *balance))
            .collect()
    }
}
