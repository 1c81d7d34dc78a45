use genre_core::CompletionParams;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable that overrides `providers.openai.api_key`.
pub const API_KEY_ENV: &str = "GENRE_OPENAI_API_KEY";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub agents: AgentsConfig,
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub suggestions: SuggestionsConfig,
    #[serde(default)]
    pub wallet: WalletConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AgentsConfig {
    pub defaults: AgentDefaults,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AgentDefaults {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assistant_name: Option<String>,
}

impl AgentDefaults {
    /// Sampling parameters for the configured (or overridden) model.
    #[must_use]
    pub fn completion_params(&self, model_override: Option<String>) -> CompletionParams {
        CompletionParams::new(model_override.unwrap_or_else(|| self.model.clone()))
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub openai: ProviderConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    #[serde(default = "RetryConfig::default_max_attempts")]
    pub max_attempts: usize,
    #[serde(default)]
    pub delays_secs: Vec<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: Self::default_max_attempts(),
            delays_secs: Vec::new(),
        }
    }
}

impl RetryConfig {
    const fn default_max_attempts() -> usize {
        1
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DispatchConfig {
    #[serde(default = "DispatchConfig::default_slippage_percent")]
    pub slippage_percent: f64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            slippage_percent: Self::default_slippage_percent(),
        }
    }
}

impl DispatchConfig {
    const fn default_slippage_percent() -> f64 {
        1.0
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct SuggestionsConfig {
    /// Replaces the built-in baseline prompts when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct WalletConfig {
    #[serde(default = "WalletConfig::default_address")]
    pub address: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            address: Self::default_address(),
        }
    }
}

impl WalletConfig {
    fn default_address() -> String {
        "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY".to_string()
    }
}

const CONFIG_TEMPLATE: &str = r#"{
  "agents": {
    "defaults": {
      "model": "gpt-4",
      "max_tokens": 500,
      "temperature": 0.7,
      "history_limit": 10,
      "assistant_name": "Genre AI"
    }
  },
  "providers": {
    "openai": {
      "api_key": "your-openai-api-key-here",
      "base_url": "https://api.openai.com/v1"
    }
  },
  "retry": {
    "max_attempts": 1,
    "delays_secs": []
  },
  "dispatch": {
    "slippage_percent": 1.0
  },
  "wallet": {
    "address": "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY"
  }
}"#;

impl Config {
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("genre"))
    }

    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_dir()?.join("config.json");

        if !config_path.exists() {
            anyhow::bail!(
                "Config file not found at: {}. Please run 'genre init' to create config.",
                config_path.display()
            );
        }

        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(std::env::var(API_KEY_ENV).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// A non-empty key from the environment wins over the file.
    pub fn apply_env_overrides(&mut self, api_key: Option<String>) {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            info!("Using API key from {API_KEY_ENV}");
            self.providers.openai.api_key = key;
        }
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<PathBuf> {
        let config_path = Self::ensure_config_dir()?.join("config.json");

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        std::fs::write(&config_path, CONFIG_TEMPLATE)?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Edit the config file and add your OpenAI API key (or set {API_KEY_ENV})");
        println!("   2. Run 'genre chat' to talk to the copilot");
        println!();
        println!("🔧 Configuration options:");
        println!("   - model: completion model to use (gpt-4, gpt-4o, ...)");
        println!("   - retry.max_attempts: attempts per completion request (transient failures only)");
        println!("   - dispatch.slippage_percent: tolerance applied to swap and liquidity floors");
        println!();
        Ok(config_path)
    }
}
