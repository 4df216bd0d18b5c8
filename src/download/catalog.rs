/// Remote photo catalog download
///
/// The catalog is fetched once at startup. Any failure leaves the
/// application with an empty catalog; the reason is logged.

use crate::state::data::CatalogRecord;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server answered with status {0}")]
    Status(reqwest::StatusCode),
    #[error("error deserializing json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse the catalog JSON (an array of records)
pub fn parse_catalog(json: &str) -> Result<Vec<CatalogRecord>, CatalogError> {
    Ok(serde_json::from_str(json)?)
}

async fn download_catalog(url: &str) -> Result<Vec<CatalogRecord>, CatalogError> {
    let response = reqwest::get(url).await?;
    if !response.status().is_success() {
        return Err(CatalogError::Status(response.status()));
    }
    let body = response.text().await?;
    parse_catalog(&body)
}

/// Download the catalog, falling back to an empty list on any error
pub async fn fetch_catalog(url: String) -> Vec<CatalogRecord> {
    log::info!("🔍 Downloading catalog from {}", url);
    catalog_or_empty(download_catalog(&url).await)
}

/// Turn a download outcome into the records to show; errors are logged
fn catalog_or_empty(result: Result<Vec<CatalogRecord>, CatalogError>) -> Vec<CatalogRecord> {
    match result {
        Ok(records) => {
            log::info!("✅ Catalog downloaded: {} records", records.len());
            records
        }
        Err(e) => {
            log::error!("❌ Catalog unavailable: {}", e);
            Vec::new()
        }
    }
}
