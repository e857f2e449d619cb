use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::clients::traits::{ClientError, GenerativeModel};
use crate::config::AiConfig;

const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_TIMEOUT_MS: u64 = 20_000;
const BACKOFF_BASE_MS: u64 = 200;

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize, Serialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize, Serialize)]
struct Part {
    text: Option<String>,
}

/// Client for the hosted Gemini `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    timeout: Duration,
    retries: u32,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>) -> Result<Self, ClientError> {
        Self::from_config(&AiConfig::default(), api_key)
    }

    pub fn from_config(config: &AiConfig, api_key: Option<String>) -> Result<Self, ClientError> {
        let timeout = Duration::from_millis(if config.timeout_ms == 0 {
            DEFAULT_TIMEOUT_MS
        } else {
            config.timeout_ms
        });
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Http(format!("failed to build http client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: if config.endpoint.is_empty() {
                DEFAULT_ENDPOINT.to_string()
            } else {
                config.endpoint.trim_end_matches('/').to_string()
            },
            model: if config.model.is_empty() {
                DEFAULT_MODEL.to_string()
            } else {
                config.model.clone()
            },
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            timeout,
            retries: config.retries.clamp(1, 5),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    async fn send_once(&self, api_key: &str, body: &serde_json::Value) -> Result<String, ClientError> {
        let response = self
            .client
            .post(self.url())
            .query(&[("key", api_key)])
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClientError::Timeout {
                        timeout_ms: self.timeout.as_millis() as u64,
                    }
                } else {
                    ClientError::Http(e.without_url().to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Format(format!("invalid response body: {}", e)))?;
        extract_text(parsed)
    }
}

fn request_body(prompt: &str, json_mode: bool) -> serde_json::Value {
    let mut body = json!({
        "contents": [{ "parts": [{ "text": prompt }] }]
    });
    if json_mode {
        body["generationConfig"] = json!({ "responseMimeType": "application/json" });
    }
    body
}

fn extract_text(response: GenerateResponse) -> Result<String, ClientError> {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .ok_or_else(|| ClientError::Format("no candidate text in response".to_string()))
}

// Client errors other than rate limiting will not improve on retry.
fn is_retryable(err: &ClientError) -> bool {
    match err {
        ClientError::Status { status, .. } => *status == 429 || *status >= 500,
        ClientError::Timeout { .. } | ClientError::Http(_) => true,
        _ => false,
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(&self, prompt: &str, json_mode: bool) -> Result<String, ClientError> {
        let api_key = self.api_key.as_deref().ok_or(ClientError::MissingApiKey)?;
        let body = request_body(prompt, json_mode);
        debug!(
            model = %self.model,
            chars = prompt.len(),
            json_mode,
            "sending generateContent request"
        );

        let mut last_err = None;
        for attempt in 0..self.retries {
            match self.send_once(api_key, &body).await {
                Ok(text) => return Ok(text),
                Err(e) if is_retryable(&e) && attempt + 1 < self.retries => {
                    let delay_ms = BACKOFF_BASE_MS * (1u64 << attempt);
                    warn!(attempt, delay_ms, error = %e, "gemini request failed, retrying");
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    last_err = Some(e);
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_err.unwrap_or_else(|| ClientError::Http("no attempts made".to_string())))
    }
}
