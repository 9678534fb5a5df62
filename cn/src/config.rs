//! Configuration types and loading
//!
//! YAML config with the same lookup order as the store crate: explicit
//! path, `$XDG_CONFIG_HOME/conceptnote/config.yml`, `conceptnote.yml`
//! in the working directory, then built-in defaults.

use std::path::{Path, PathBuf};

use eyre::{Result, eyre};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How many characters of supporting text flow into the preview prompt
const DEFAULT_SUPPORTING_TEXT_LIMIT: usize = 4000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the SQLite database holding project records
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Path to the internal capability catalogue manifest
    #[serde(default = "default_catalogue_path")]
    pub catalogue_path: PathBuf,

    /// Truncation limit for supporting text in the preview prompt
    #[serde(default = "default_supporting_text_limit")]
    pub supporting_text_limit: usize,

    /// Generation capability settings
    #[serde(default)]
    pub llm: LlmConfig,
}

fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("conceptnote")
        .join("projects.db")
}

fn default_catalogue_path() -> PathBuf {
    PathBuf::from("catalogue.yml")
}

fn default_supporting_text_limit() -> usize {
    DEFAULT_SUPPORTING_TEXT_LIMIT
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            catalogue_path: default_catalogue_path(),
            supporting_text_limit: default_supporting_text_limit(),
            llm: LlmConfig::default(),
        }
    }
}

impl Config {
    /// Load config from file, or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            return Ok(config);
        }

        let default_paths = [
            dirs::config_dir().map(|p| p.join("conceptnote").join("config.yml")),
            Some(PathBuf::from("conceptnote.yml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let config: Config = serde_yaml::from_str(&content)?;
                return Ok(config);
            }
        }

        Ok(Config::default())
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Generation capability settings as written in the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider name: "gemini" or "openai"
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model name; empty means the provider default
    #[serde(default)]
    pub model: String,

    /// API key written directly in the config (discouraged; prefer env)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Environment variable holding the API key
    #[serde(default)]
    pub api_key_env: Option<String>,

    /// Base URL override (self-hosted proxies)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Hard cap on generated tokens per call
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_provider() -> String {
    "gemini".to_string()
}

fn default_timeout_ms() -> u64 {
    120_000
}

fn default_max_tokens() -> u32 {
    8192
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: String::new(),
            api_key: None,
            api_key_env: None,
            base_url: None,
            timeout_ms: default_timeout_ms(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl LlmConfig {
    /// Fill in provider-specific defaults
    pub fn resolve(&self) -> Result<ResolvedLlmConfig> {
        debug!(provider = %self.provider, "LlmConfig::resolve: called");
        let (default_model, default_base_url, default_key_env) = match self.provider.as_str() {
            "gemini" => (
                "gemini-2.0-flash",
                "https://generativelanguage.googleapis.com",
                "GEMINI_API_KEY",
            ),
            "openai" => ("gpt-4o-mini", "https://api.openai.com", "OPENAI_API_KEY"),
            other => return Err(eyre!("Unknown LLM provider: '{}'", other)),
        };

        Ok(ResolvedLlmConfig {
            provider: self.provider.clone(),
            model: if self.model.is_empty() {
                default_model.to_string()
            } else {
                self.model.clone()
            },
            api_key: self.api_key.clone(),
            api_key_env: self
                .api_key_env
                .clone()
                .unwrap_or_else(|| default_key_env.to_string()),
            base_url: self
                .base_url
                .clone()
                .unwrap_or_else(|| default_base_url.to_string()),
            timeout_ms: self.timeout_ms,
            max_tokens: self.max_tokens,
        })
    }
}

/// Fully-resolved generation capability settings
#[derive(Debug, Clone)]
pub struct ResolvedLlmConfig {
    pub provider: String,
    pub model: String,
    pub api_key: Option<String>,
    pub api_key_env: String,
    pub base_url: String,
    pub timeout_ms: u64,
    pub max_tokens: u32,
}

impl ResolvedLlmConfig {
    /// Resolve the API key: inline config first, then the environment
    pub fn get_api_key(&self) -> Result<String> {
        if let Some(ref key) = self.api_key {
            return Ok(key.clone());
        }
        std::env::var(&self.api_key_env)
            .map_err(|_| eyre!("API key not found: set {} or llm.api_key", self.api_key_env))
    }
}
