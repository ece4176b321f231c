use chrono::{DateTime, Utc};
use log::{info, warn};
use std::collections::{HashMap, HashSet};
use crate::api::{AssetSummary, PricingService};
use crate::error::{Error, Result};

/// Known asset identifiers plus a case-sensitive display name index.
/// Immutable once built; replace it wholesale to pick up upstream changes.
#[derive(Debug, Clone)]
pub struct AssetCatalog {
    ids: HashSet<String>,
    names: HashMap<String, String>,
    loaded_at: DateTime<Utc>,
}

impl AssetCatalog {
    /// Builds the catalog from a single upstream listing. Any upstream
    /// failure is returned as-is; there is no partial catalog.
    pub async fn load(pricing: &dyn PricingService) -> Result<Self> {
        let assets = pricing.list_assets().await?;
        if assets.is_empty() {
            return Err(Error::UpstreamFailure("Asset listing was empty".to_string()));
        }
        let catalog = Self::from_assets(assets);
        info!("Loaded asset catalog with {} assets", catalog.len());
        Ok(catalog)
    }

    /// Later entries win when two assets share a display name.
    pub fn from_assets<I>(assets: I) -> Self
    where
        I: IntoIterator<Item = AssetSummary>,
    {
        let mut ids = HashSet::new();
        let mut names = HashMap::new();
        for asset in assets {
            if let Some(previous) = names.insert(asset.name.clone(), asset.id.clone()) {
                warn!("Display name {:?} maps to both {} and {}", asset.name, previous, asset.id);
            }
            ids.insert(asset.id);
        }
        Self {
            ids,
            names,
            loaded_at: Utc::now(),
        }
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Exact, case-sensitive name lookup.
    pub fn lookup_name(&self, name: &str) -> Option<&str> {
        self.names.get(name).map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}
