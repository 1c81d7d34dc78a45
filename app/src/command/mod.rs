//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy type with its own input, dispatched
//! statically from `main`.

use anyhow::Context;
use genre_chain::DemoChain;
use genre_config::Config;
use genre_copilot::{
    BASELINE_SUGGESTIONS, CopilotConfig, DEFAULT_HISTORY_LIMIT, MAX_SUGGESTIONS, SuggestionGenerator,
};
use genre_providers::{OpenAiProvider, RetryPolicy};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod chat;
mod info;
mod init;
mod version;

pub use chat::{ChatInput, ChatStrategy};
pub use info::InfoStrategy;
pub use init::InitStrategy;
pub use version::VersionStrategy;

/// Core trait defining the contract for all command strategies.
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

/// Collaborators shared by commands that talk to the model.
pub struct CommonComponents {
    pub config: Config,
    pub provider: Arc<OpenAiProvider>,
    pub chain: Arc<DemoChain>,
}

pub fn init_common_components() -> anyhow::Result<CommonComponents> {
    let config = Config::load()?;

    let provider_config = &config.providers.openai;
    let mut provider = OpenAiProvider::new(provider_config.api_key.clone())
        .with_retry_policy(build_retry_policy(&config));
    if let Some(base_url) = &provider_config.base_url {
        provider = provider.with_base_url(base_url.clone());
    }

    Ok(CommonComponents {
        config,
        provider: Arc::new(provider),
        chain: Arc::new(DemoChain::new()),
    })
}

fn build_retry_policy(config: &Config) -> RetryPolicy {
    let delays = config
        .retry
        .delays_secs
        .iter()
        .copied()
        .map(Duration::from_secs)
        .collect();
    RetryPolicy::new(config.retry.max_attempts, delays)
}

/// Map file configuration onto the copilot's runtime settings.
pub fn build_copilot_config(
    config: &Config,
    model: Option<String>,
) -> anyhow::Result<CopilotConfig> {
    let defaults = &config.agents.defaults;

    let slippage = Decimal::try_from(config.dispatch.slippage_percent)
        .context("dispatch.slippage_percent is not a valid percentage")?;
    anyhow::ensure!(
        slippage >= Decimal::ZERO && slippage < Decimal::ONE_HUNDRED,
        "dispatch.slippage_percent must be in [0, 100), got {slippage}"
    );

    let mut copilot_config = CopilotConfig::default()
        .with_params(defaults.completion_params(model))
        .with_history_limit(defaults.history_limit.unwrap_or(DEFAULT_HISTORY_LIMIT))
        .with_slippage_percent(slippage);

    if let Some(name) = &defaults.assistant_name {
        copilot_config = copilot_config.with_assistant_name(name.clone());
    }

    let suggestions = &config.suggestions;
    if suggestions.baseline.is_some() || suggestions.limit.is_some() {
        let generator = SuggestionGenerator::new(
            suggestions.baseline.clone().unwrap_or_else(|| {
                BASELINE_SUGGESTIONS
                    .iter()
                    .map(ToString::to_string)
                    .collect()
            }),
            suggestions.limit.unwrap_or(MAX_SUGGESTIONS),
        );
        info!(
            "Using configured suggestions (limit {})",
            suggestions.limit.unwrap_or(MAX_SUGGESTIONS)
        );
        copilot_config = copilot_config.with_suggestions(generator);
    }

    Ok(copilot_config)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "agents": { "defaults": { "model": "gpt-4", "max_tokens": 500, "temperature": 0.7 } },
        "providers": { "openai": { "api_key": "sk-test" } }
    }"#;

    #[test]
    fn defaults_map_onto_copilot_config() {
        let config = Config::from_json(MINIMAL).unwrap();
        let copilot = build_copilot_config(&config, Some("gpt-4o".to_string())).unwrap();

        assert_eq!(copilot.params.model, "gpt-4o");
        assert_eq!(copilot.history_limit, DEFAULT_HISTORY_LIMIT);
        assert_eq!(copilot.slippage_percent, Decimal::ONE);
    }

    #[test]
    fn out_of_range_slippage_is_rejected() {
        let mut config = Config::from_json(MINIMAL).unwrap();
        config.dispatch.slippage_percent = 150.0;
        assert!(build_copilot_config(&config, None).is_err());
    }

    #[test]
    fn retry_policy_follows_config() {
        let mut config = Config::from_json(MINIMAL).unwrap();
        config.retry.max_attempts = 3;
        config.retry.delays_secs = vec![1, 2];

        let policy = build_retry_policy(&config);
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delays, vec![Duration::from_secs(1), Duration::from_secs(2)]);
    }
}
