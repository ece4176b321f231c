use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};

/// Every CoinCap payload is wrapped in a `data` envelope.
#[derive(Debug, Deserialize)]
pub struct CoinCapResponse<T> {
    pub data: T,
}

/// The subset of an asset listing entry the catalog needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub symbol: String,
}

/// Full asset record as returned by `GET /assets/{id}`. CoinCap encodes
/// numeric fields as strings and sends `null` for unknown values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDetails {
    pub id: String,
    pub rank: Option<String>,
    pub symbol: String,
    pub name: String,
    pub supply: Option<String>,
    pub max_supply: Option<String>,
    pub market_cap_usd: Option<String>,
    pub volume_usd24_hr: Option<String>,
    pub price_usd: Option<String>,
    pub change_percent24_hr: Option<String>,
    pub vwap24_hr: Option<String>,
    pub explorer: Option<String>,
}

impl From<&AssetDetails> for AssetSummary {
    fn from(details: &AssetDetails) -> Self {
        Self {
            id: details.id.clone(),
            name: details.name.clone(),
            symbol: details.symbol.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rate {
    pub id: String,
    pub symbol: Option<String>,
    pub currency_symbol: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub rate_usd: String,
}

impl Rate {
    pub fn usd(&self) -> Result<f64> {
        let rate: f64 = self.rate_usd.trim().parse().map_err(|_| {
            Error::UpstreamFailure(format!("Malformed rateUsd for {}: {:?}", self.id, self.rate_usd))
        })?;
        if !rate.is_finite() {
            return Err(Error::UpstreamFailure(format!("Non-finite rateUsd for {}", self.id)));
        }
        Ok(rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BITCOIN: &str = r#"{
        "data": {
            "id": "bitcoin",
            "rank": "1",
            "symbol": "BTC",
            "name": "Bitcoin",
            "supply": "19000000.0000000000000000",
            "maxSupply": "21000000.0000000000000000",
            "marketCapUsd": "800000000000.00",
            "volumeUsd24Hr": "10000000000.00",
            "priceUsd": "42000.12",
            "changePercent24Hr": "-1.25",
            "vwap24Hr": "41900.50",
            "explorer": "https://blockchain.info/"
        },
        "timestamp": 1649000000000
    }"#;

    #[test]
    fn test_asset_details_keeps_all_twelve_fields() {
        let response: CoinCapResponse<AssetDetails> = serde_json::from_str(BITCOIN).unwrap();
        assert_eq!(response.data.symbol, "BTC");
        assert_eq!(response.data.explorer.as_deref(), Some("https://blockchain.info/"));

        let value = serde_json::to_value(&response.data).unwrap();
        let fields = value.as_object().unwrap();
        assert_eq!(fields.len(), 12);
        assert!(fields.contains_key("volumeUsd24Hr"));
        assert!(fields.contains_key("changePercent24Hr"));
        assert!(fields.contains_key("vwap24Hr"));
    }

    #[test]
    fn test_summary_ignores_extra_fields() {
        let response: CoinCapResponse<AssetSummary> = serde_json::from_str(BITCOIN).unwrap();
        assert_eq!(response.data.id, "bitcoin");
        assert_eq!(response.data.name, "Bitcoin");
    }

    #[test]
    fn test_rate_parsing() {
        let rate: Rate = serde_json::from_str(
            r#"{"id":"bitcoin","symbol":"BTC","currencySymbol":"₿","type":"crypto","rateUsd":"42000.5"}"#,
        )
        .unwrap();
        assert_eq!(rate.usd().unwrap(), 42000.5);

        let bad = Rate { rate_usd: "n/a".to_string(), ..rate };
        assert!(matches!(bad.usd(), Err(Error::UpstreamFailure(_))));
    }

    #[test]
    fn test_missing_data_envelope_is_rejected() {
        let result: std::result::Result<CoinCapResponse<AssetSummary>, _> =
            serde_json::from_str(r#"{"error":"bitcoin2 not found"}"#);
        assert!(result.is_err());
    }
}
