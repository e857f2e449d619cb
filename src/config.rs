use crate::catalog::{Catalog, Product};
use crate::error::{Result, SkinRoutineError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Main configuration structure loaded from skin_routine.toml and environment variables
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub ai: AiConfig,
    pub products: ProductsConfig,
    pub storage: StorageConfig,
    /// Per-slot product overrides keyed by slot name (e.g. `vitamin_c`)
    pub catalog: HashMap<String, Product>,
    /// Runtime configuration loaded from environment variables
    #[serde(skip)]
    pub runtime: RuntimeConfig,
}

/// Generative model endpoint settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AiConfig {
    pub model: String,
    pub endpoint: String,
    pub timeout_ms: u64,
    pub retries: u32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_ms: 20_000,
            retries: 3,
        }
    }
}

/// Product database (barcode lookup) settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProductsConfig {
    pub endpoint: String,
    pub timeout_ms: u64,
}

impl Default for ProductsConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://world.openfoodfacts.org/api/v2".to_string(),
            timeout_ms: 15_000,
        }
    }
}

/// Local document storage
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Defaults to the platform data directory when unset
    pub data_dir: Option<PathBuf>,
}

/// Runtime configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub gemini_api_key: Option<String>,
    pub log_level: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            log_level: "skin_routine=info".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Load runtime configuration from environment variables
    pub fn load_from_env() -> Self {
        Self {
            gemini_api_key: std::env::var("GEMINI_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            log_level: std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "skin_routine=info".to_string()),
        }
    }
}

impl Config {
    /// Load configuration from TOML file and environment variables.
    /// Uses SKIN_ROUTINE_CONFIG or defaults to "skin_routine.toml".
    pub fn load() -> Result<Self> {
        // 1) SKIN_ENV_FILE if set, 2) ./.env, 3) ../.env
        if let Ok(env_path) = std::env::var("SKIN_ENV_FILE") {
            let _ = dotenvy::from_path(env_path);
        } else {
            let _ = dotenvy::from_path(".env");
            if std::env::var("GEMINI_API_KEY").is_err() {
                let _ = dotenvy::from_path("../.env");
            }
        }

        let config_path = std::env::var("SKIN_ROUTINE_CONFIG")
            .unwrap_or_else(|_| "skin_routine.toml".to_string());

        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(content) => Self::from_toml(&content)?,
            Err(_) => {
                tracing::debug!("Config file {} not found, using defaults", config_path);
                Self::default()
            }
        };

        config.apply_env_overrides();
        config.runtime = RuntimeConfig::load_from_env();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(model) = std::env::var("SKIN_AI_MODEL") {
            tracing::debug!("SKIN_AI_MODEL env override applied");
            self.ai.model = model;
        }
        if let Some(retries) = std::env::var("SKIN_AI_RETRIES")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
        {
            self.ai.retries = retries;
        }
        if let Ok(dir) = std::env::var("SKIN_DATA_DIR") {
            tracing::debug!("SKIN_DATA_DIR env override applied");
            self.storage.data_dir = Some(PathBuf::from(dir));
        }
    }

    /// Validate and clamp settings
    pub fn validate(&mut self) -> Result<()> {
        if self.ai.model.trim().is_empty() {
            return Err(SkinRoutineError::Config {
                message: "ai.model must not be empty".into(),
            });
        }
        for (name, endpoint) in [
            ("ai.endpoint", &self.ai.endpoint),
            ("products.endpoint", &self.products.endpoint),
        ] {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(SkinRoutineError::Config {
                    message: format!("{} must be an http(s) URL, got '{}'", name, endpoint),
                });
            }
        }
        if self.ai.timeout_ms == 0 || self.products.timeout_ms == 0 {
            return Err(SkinRoutineError::Config {
                message: "timeouts must be greater than zero".into(),
            });
        }
        if self.ai.retries == 0 {
            self.ai.retries = 1;
        } else if self.ai.retries > 5 {
            tracing::warn!("ai.retries {} exceeds max 5, clamping to 5", self.ai.retries);
            self.ai.retries = 5;
        }
        // Surface bad catalog overrides at startup rather than at first use.
        self.catalog()?;
        Ok(())
    }

    /// Built-in catalog with any configured overrides applied
    pub fn catalog(&self) -> Result<Arc<Catalog>> {
        if self.catalog.is_empty() {
            return Ok(Catalog::builtin());
        }
        Ok(Arc::new(Catalog::builtin().with_overrides(&self.catalog)?))
    }

    pub fn data_dir(&self) -> PathBuf {
        self.storage.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join("skin-routine"))
                .unwrap_or_else(|| PathBuf::from(".skin-routine"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ProductSlot;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml("[ai]\nmodel = \"gemini-test\"\n").unwrap();
        assert_eq!(config.ai.model, "gemini-test");
        assert_eq!(config.ai.retries, 3);
        assert_eq!(config.products.timeout_ms, 15_000);
        assert!(config.catalog.is_empty());
    }

    #[test]
    fn test_catalog_overrides_from_toml() {
        let toml = r#"
[catalog.spf50]
id = "s1"
name = "Mineral SPF 50"
tip = "Reapply every two hours."
"#;
        let mut config = Config::from_toml(toml).unwrap();
        config.validate().unwrap();
        let catalog = config.catalog().unwrap();
        assert_eq!(catalog.get(ProductSlot::Spf50).name, "Mineral SPF 50");
    }

    #[test]
    fn test_unknown_catalog_slot_rejected() {
        let toml = "[catalog.sunscreen]\nid = \"s1\"\nname = \"SPF\"\n";
        let mut config = Config::from_toml(toml).unwrap();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("sunscreen"));
    }

    #[test]
    fn test_validation_clamps_and_rejects() {
        let mut config = Config::default();
        config.ai.retries = 0;
        config.validate().unwrap();
        assert_eq!(config.ai.retries, 1);

        config.ai.retries = 50;
        config.validate().unwrap();
        assert_eq!(config.ai.retries, 5);

        config.products.endpoint = "ftp://example.org".into();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.ai.timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = Config::from_toml("[ai\nmodel=").unwrap_err();
        assert_eq!(err.kind(), "config");
    }

    #[test]
    fn test_explicit_data_dir() {
        let mut config = Config::default();
        config.storage.data_dir = Some(PathBuf::from("/tmp/skin"));
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/skin"));
    }
}
