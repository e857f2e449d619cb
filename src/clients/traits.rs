use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("api key is not configured")]
    MissingApiKey,
    #[error("request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    #[error("http error: {0}")]
    Http(String),
    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response format: {0}")]
    Format(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<ClientError> for crate::error::SkinRoutineError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::MissingApiKey => crate::error::SkinRoutineError::Config {
                message: err.to_string(),
            },
            ClientError::InvalidRequest(message) => {
                crate::error::SkinRoutineError::Validation { message }
            }
            other => crate::error::SkinRoutineError::Upstream {
                message: other.to_string(),
            },
        }
    }
}

/// A hosted text-generation model.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Generate a completion for `prompt`. With `json_mode` the model is asked
    /// to respond with a JSON document only.
    async fn generate(&self, prompt: &str, json_mode: bool) -> Result<String, ClientError>;
}

/// Product name and ingredient list for a scanned barcode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInfo {
    pub barcode: String,
    pub product_name: String,
    pub ingredients: String,
}

/// A public product database keyed by barcode.
#[async_trait]
pub trait ProductLookup: Send + Sync {
    /// `Ok(None)` when the product is unknown or has no ingredient list.
    async fn lookup(&self, barcode: &str) -> Result<Option<ProductInfo>, ClientError>;
}

/// EAN-8 through GTIN-14: 8 to 14 ASCII digits.
pub fn validate_barcode(barcode: &str) -> Result<&str, ClientError> {
    let trimmed = barcode.trim();
    if (8..=14).contains(&trimmed.len()) && trimmed.chars().all(|c| c.is_ascii_digit()) {
        Ok(trimmed)
    } else {
        Err(ClientError::InvalidRequest(format!(
            "'{}' is not a valid barcode (expected 8-14 digits)",
            barcode
        )))
    }
}
