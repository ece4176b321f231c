use async_trait::async_trait;
use log::{debug, error, warn};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use crate::api::types::{AssetDetails, AssetSummary, CoinCapResponse, Rate};
use crate::api::PricingService;
use crate::config::ApiConfig;
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct CoinCapClient {
    client: Client,
    base_url: String,
}

impl CoinCapClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::new(
            config.base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    async fn make_request<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = self.url(endpoint);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            error!("Request to {} failed: {}", url, e);
            Error::UpstreamFailure(format!("Request to {} failed: {}", endpoint, e))
        })?;

        match response.status() {
            status if status.is_success() => {
                let body: CoinCapResponse<T> = match response.json().await {
                    Ok(body) => body,
                    Err(e) => {
                        error!("Failed to parse response from {}: {}", endpoint, e);
                        return Err(Error::UpstreamFailure(format!(
                            "Malformed response from {}: {}",
                            endpoint, e
                        )));
                    }
                };
                Ok(body.data)
            }
            StatusCode::TOO_MANY_REQUESTS => {
                warn!("CoinCap rate limit hit on {}", endpoint);
                Err(Error::UpstreamFailure("CoinCap API rate limit exceeded".to_string()))
            }
            StatusCode::NOT_FOUND => Err(Error::UpstreamFailure(format!(
                "CoinCap has no resource at {}",
                endpoint
            ))),
            status => {
                let error_msg = format!("CoinCap request to {} failed with status: {}", endpoint, status);
                error!("{}", error_msg);
                Err(Error::UpstreamFailure(error_msg))
            }
        }
    }
}

#[async_trait]
impl PricingService for CoinCapClient {
    async fn list_assets(&self) -> Result<Vec<AssetSummary>> {
        let assets: Vec<AssetSummary> = self.make_request("assets").await?;
        debug!("CoinCap listed {} assets", assets.len());
        Ok(assets)
    }

    async fn asset_details(&self, id: &str) -> Result<AssetDetails> {
        self.make_request(&format!("assets/{}", urlencoding::encode(id))).await
    }

    async fn usd_rate(&self, id: &str) -> Result<f64> {
        let rate: Rate = self.make_request(&format!("rates/{}", urlencoding::encode(id))).await?;
        rate.usd()
    }
}
