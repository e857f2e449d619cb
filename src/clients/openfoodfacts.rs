use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::clients::traits::{ClientError, ProductInfo, ProductLookup, validate_barcode};
use crate::config::ProductsConfig;

const UNKNOWN_PRODUCT: &str = "Unknown Product";

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    status: i64,
    product: Option<ProductFields>,
}

#[derive(Debug, Deserialize)]
struct ProductFields {
    product_name: Option<String>,
    ingredients_text_en: Option<String>,
}

/// Barcode lookups against the Open Food Facts v2 product API.
#[derive(Debug, Clone)]
pub struct OpenFoodFactsClient {
    client: reqwest::Client,
    endpoint: String,
    timeout_ms: u64,
}

impl OpenFoodFactsClient {
    pub fn from_config(config: &ProductsConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(concat!("skin-routine/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Http(format!("failed to build http client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            timeout_ms: config.timeout_ms,
        })
    }
}

fn into_product_info(barcode: &str, response: LookupResponse) -> Option<ProductInfo> {
    if response.status == 0 {
        return None;
    }
    let product = response.product?;
    let ingredients = product
        .ingredients_text_en
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())?;
    let product_name = product
        .product_name
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNKNOWN_PRODUCT.to_string());
    Some(ProductInfo {
        barcode: barcode.to_string(),
        product_name,
        ingredients,
    })
}

#[async_trait]
impl ProductLookup for OpenFoodFactsClient {
    async fn lookup(&self, barcode: &str) -> Result<Option<ProductInfo>, ClientError> {
        let barcode = validate_barcode(barcode)?;
        let url = format!("{}/product/{}", self.endpoint, barcode);
        debug!(%url, "looking up product");

        let response = self
            .client
            .get(&url)
            .query(&[("fields", "product_name,ingredients_text_en")])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClientError::Timeout {
                        timeout_ms: self.timeout_ms,
                    }
                } else {
                    ClientError::Http(e.to_string())
                }
            })?;

        // The API answers unknown barcodes with 404 and a status-0 body.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }

        let parsed: LookupResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Format(format!("invalid product response: {}", e)))?;
        Ok(into_product_info(barcode, parsed))
    }
}
