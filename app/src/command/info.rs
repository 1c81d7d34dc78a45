use genre_config::Config;

/// Strategy for displaying configuration information.
///
/// Prints the effective configuration (after environment overrides) with the
/// API key masked.
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

impl super::CommandStrategy for InfoStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;

        println!("=== genre Configuration ===\n");

        println!("Provider:");
        println!("  API Key: {}", mask_key(&config.providers.openai.api_key));
        println!(
            "  Base URL: {}",
            config
                .providers
                .openai
                .base_url
                .as_deref()
                .unwrap_or(genre_providers::DEFAULT_BASE_URL)
        );
        println!();

        let defaults = &config.agents.defaults;
        println!("Agent Defaults:");
        println!("  Model: {}", defaults.model);
        println!("  Max Tokens: {}", defaults.max_tokens);
        println!("  Temperature: {}", defaults.temperature);
        if let Some(limit) = defaults.history_limit {
            println!("  History Limit: {limit}");
        }
        if let Some(ref name) = defaults.assistant_name {
            println!("  Assistant Name: {name}");
        }
        println!();

        println!("Retry:");
        println!("  Max Attempts: {}", config.retry.max_attempts);
        if !config.retry.delays_secs.is_empty() {
            let delays: Vec<String> = config
                .retry
                .delays_secs
                .iter()
                .map(|d| format!("{d}s"))
                .collect();
            println!("  Delays: {}", delays.join(", "));
        }
        println!();

        println!("Dispatch:");
        println!("  Slippage: {}%", config.dispatch.slippage_percent);
        println!();

        println!("Suggestions:");
        match &config.suggestions.baseline {
            Some(baseline) => println!("  Baseline: {}", baseline.join(" | ")),
            None => println!("  Baseline: (built-in)"),
        }
        if let Some(limit) = config.suggestions.limit {
            println!("  Limit: {limit}");
        }
        println!();

        println!("Wallet:");
        println!("  Address: {}", config.wallet.address);

        Ok(())
    }
}

fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if key.is_empty() {
        "(not set)".to_string()
    } else if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "***".to_string()
    }
}
