use crate::api::PricingService;
use crate::error::Error;
use crate::wallet::Wallet;
use log::{error, warn};
use serde_json::json;
use std::convert::Infallible;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

/// Every route served, in the order `/` lists them.
pub const ROUTES: &[&str] = &[
    "/GetAssetNames",
    "/GetAssetDetails/{id}",
    "/GetUSDConversionRate/{id}",
    "/GetBalanceConvertedToUSD/{id}/{amount}",
    "/AddCurrency/{id}/{amount}",
    "/AddCurrencyByName/{name}/{amount}",
    "/SetCurrency/{id}/{amount}",
    "/SetCurrencyByName/{name}/{amount}",
    "/GetCurrencyBalance/{id}",
    "/GetCurrencyBalanceByName/{name}",
    "/GetCurrencyBalanceInUSD/{id}",
    "/GetTotalBalanceInUSD",
    "/GetWalletContents",
    "/ReloadCatalog",
];

#[derive(Debug)]
pub struct ApiRejection(pub Error);

impl warp::reject::Reject for ApiRejection {}

fn reject(err: Error) -> Rejection {
    warp::reject::custom(ApiRejection(err))
}

fn with_wallet(wallet: Wallet) -> impl Filter<Extract = (Wallet,), Error = Infallible> + Clone {
    warp::any().map(move || wallet.clone())
}

fn decode_segment(segment: &str) -> Result<String, Rejection> {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .map_err(|e| reject(Error::InvalidIdentifier(format!("{}: {}", segment, e))))
}

pub fn parse_amount(raw: &str) -> crate::error::Result<f64> {
    let amount: f64 = raw
        .trim()
        .parse()
        .map_err(|_| Error::InvalidNumericInput(raw.to_string()))?;
    if !amount.is_finite() {
        return Err(Error::InvalidNumericInput(raw.to_string()));
    }
    Ok(amount)
}

/// Percent-decodes then parses an amount path segment.
pub fn decode_amount(raw: &str) -> crate::error::Result<f64> {
    let decoded = urlencoding::decode(raw)
        .map_err(|_| Error::InvalidNumericInput(raw.to_string()))?;
    parse_amount(&decoded)
}

fn amount_from(raw: &str) -> Result<f64, Rejection> {
    decode_amount(raw).map_err(reject)
}

/// All wallet and catalog routes, with errors rendered as JSON.
pub fn routes(wallet: Wallet) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let index = warp::path::end().map(|| warp::reply::json(&json!({ "routes": ROUTES })));

    let asset_names = warp::path!("GetAssetNames")
        .and(with_wallet(wallet.clone()))
        .and_then(get_asset_names);
    let asset_details = warp::path!("GetAssetDetails" / String)
        .and(with_wallet(wallet.clone()))
        .and_then(get_asset_details);
    let conversion_rate = warp::path!("GetUSDConversionRate" / String)
        .and(with_wallet(wallet.clone()))
        .and_then(get_usd_conversion_rate);
    let convert = warp::path!("GetBalanceConvertedToUSD" / String / String)
        .and(with_wallet(wallet.clone()))
        .and_then(convert_balance_to_usd);

    let add = warp::path!("AddCurrency" / String / String)
        .and(with_wallet(wallet.clone()))
        .and_then(add_currency);
    let add_by_name = warp::path!("AddCurrencyByName" / String / String)
        .and(with_wallet(wallet.clone()))
        .and_then(add_currency_by_name);
    let set = warp::path!("SetCurrency" / String / String)
        .and(with_wallet(wallet.clone()))
        .and_then(set_currency);
    let set_by_name = warp::path!("SetCurrencyByName" / String / String)
        .and(with_wallet(wallet.clone()))
        .and_then(set_currency_by_name);

    let balance = warp::path!("GetCurrencyBalance" / String)
        .and(with_wallet(wallet.clone()))
        .and_then(get_currency_balance);
    let balance_by_name = warp::path!("GetCurrencyBalanceByName" / String)
        .and(with_wallet(wallet.clone()))
        .and_then(get_currency_balance_by_name);
    let balance_in_usd = warp::path!("GetCurrencyBalanceInUSD" / String)
        .and(with_wallet(wallet.clone()))
        .and_then(get_currency_balance_in_usd);
    let total = warp::path!("GetTotalBalanceInUSD")
        .and(with_wallet(wallet.clone()))
        .and_then(get_total_balance_in_usd);
    let contents = warp::path!("GetWalletContents")
        .and(with_wallet(wallet.clone()))
        .and_then(get_wallet_contents);
    let reload = warp::path!("ReloadCatalog")
        .and(with_wallet(wallet))
        .and_then(reload_catalog);

    warp::get()
        .and(
            index
                .or(asset_names)
                .or(asset_details)
                .or(conversion_rate)
                .or(convert)
                .or(add)
                .or(add_by_name)
                .or(set)
                .or(set_by_name)
                .or(balance)
                .or(balance_by_name)
                .or(balance_in_usd)
                .or(total)
                .or(contents)
                .or(reload),
        )
        .recover(handle_rejection)
        .with(warp::log("coincap_wallet::web"))
}

async fn get_asset_names(wallet: Wallet) -> Result<impl Reply, Rejection> {
    let assets = wallet.pricing().list_assets().await.map_err(reject)?;
    let names: Vec<String> = assets.into_iter().map(|a| a.name).collect();
    Ok(warp::reply::json(&json!({ "AssetNames": names })))
}

async fn get_asset_details(id: String, wallet: Wallet) -> Result<impl Reply, Rejection> {
    let id = decode_segment(&id)?;
    let details = wallet.pricing().asset_details(&id).await.map_err(reject)?;
    Ok(warp::reply::json(&details))
}

async fn get_usd_conversion_rate(id: String, wallet: Wallet) -> Result<impl Reply, Rejection> {
    let id = decode_segment(&id)?;
    let rate = wallet.pricing().usd_rate(&id).await.map_err(reject)?;
    Ok(warp::reply::json(&json!({ "RateUSD": rate })))
}

async fn convert_balance_to_usd(id: String, amount: String, wallet: Wallet) -> Result<impl Reply, Rejection> {
    let id = decode_segment(&id)?;
    let amount = amount_from(&amount)?;
    let converted = wallet.convert_to_usd(&id, amount).await.map_err(reject)?;
    Ok(warp::reply::json(&json!({ "BalanceInUSD": converted.amount_usd })))
}

fn balance_reply(balance: f64) -> warp::reply::Json {
    warp::reply::json(&json!({ "Balance": balance }))
}

async fn add_currency(id: String, amount: String, wallet: Wallet) -> Result<impl Reply, Rejection> {
    let id = decode_segment(&id)?;
    let amount = amount_from(&amount)?;
    let balance = wallet.add_by_id(&id, amount).await.map_err(reject)?;
    Ok(balance_reply(balance))
}

async fn add_currency_by_name(name: String, amount: String, wallet: Wallet) -> Result<impl Reply, Rejection> {
    let name = decode_segment(&name)?;
    let amount = amount_from(&amount)?;
    let balance = wallet.add_by_name(&name, amount).await.map_err(reject)?;
    Ok(balance_reply(balance))
}

async fn set_currency(id: String, amount: String, wallet: Wallet) -> Result<impl Reply, Rejection> {
    let id = decode_segment(&id)?;
    let amount = amount_from(&amount)?;
    let balance = wallet.set_by_id(&id, amount).await.map_err(reject)?;
    Ok(balance_reply(balance))
}

async fn set_currency_by_name(name: String, amount: String, wallet: Wallet) -> Result<impl Reply, Rejection> {
    let name = decode_segment(&name)?;
    let amount = amount_from(&amount)?;
    let balance = wallet.set_by_name(&name, amount).await.map_err(reject)?;
    Ok(balance_reply(balance))
}

async fn get_currency_balance(id: String, wallet: Wallet) -> Result<impl Reply, Rejection> {
    let id = decode_segment(&id)?;
    Ok(balance_reply(wallet.balance_by_id(&id).await))
}

async fn get_currency_balance_by_name(name: String, wallet: Wallet) -> Result<impl Reply, Rejection> {
    let name = decode_segment(&name)?;
    let balance = wallet.balance_by_name(&name).await.map_err(reject)?;
    Ok(balance_reply(balance))
}

async fn get_currency_balance_in_usd(id: String, wallet: Wallet) -> Result<impl Reply, Rejection> {
    let id = decode_segment(&id)?;
    let converted = wallet.balance_in_usd_by_id(&id).await.map_err(reject)?;
    Ok(warp::reply::json(&json!({ "BalanceInUSD": converted.amount_usd })))
}

async fn get_total_balance_in_usd(wallet: Wallet) -> Result<impl Reply, Rejection> {
    let total = wallet.total_balance_in_usd().await.map_err(reject)?;
    Ok(warp::reply::json(&json!({ "TotalBalanceInUSD": total })))
}

async fn get_wallet_contents(wallet: Wallet) -> Result<impl Reply, Rejection> {
    Ok(warp::reply::json(&wallet.contents().await))
}

async fn reload_catalog(wallet: Wallet) -> Result<impl Reply, Rejection> {
    let count = wallet.reload_catalog().await.map_err(reject)?;
    Ok(warp::reply::json(&json!({ "AssetCount": count })))
}

async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message) = if let Some(ApiRejection(e)) = err.find::<ApiRejection>() {
        if e.is_client_error() {
            warn!("Rejected request: {}", e);
            (StatusCode::BAD_REQUEST, e.to_string())
        } else {
            error!("Request failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
    } else {
        error!("Unhandled rejection: {:?}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&json!({ "error": message })),
        status,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("2").unwrap(), 2.0);
        assert_eq!(parse_amount(" 0.25 ").unwrap(), 0.25);
        assert_eq!(parse_amount("-1.5").unwrap(), -1.5);
        assert!(matches!(parse_amount("two"), Err(Error::InvalidNumericInput(_))));
        assert!(parse_amount("inf").is_err());
        assert!(parse_amount("NaN").is_err());
    }

    #[test]
    fn test_decode_amount() {
        assert_eq!(decode_amount("2.5").unwrap(), 2.5);
        assert_eq!(decode_amount("%2D1").unwrap(), -1.0);
        assert!(matches!(decode_amount("%FF"), Err(Error::InvalidNumericInput(_))));
        assert!(matches!(decode_amount("1%20e"), Err(Error::InvalidNumericInput(_))));
    }

    #[test]
    fn test_decode_segment() {
        assert_eq!(decode_segment("Bitcoin%20Cash").unwrap(), "Bitcoin Cash");
        assert_eq!(decode_segment("bitcoin").unwrap(), "bitcoin");
    }
}
