//! Follow-up prompts offered under each reply.

use genre_core::MarketSnapshot;

pub const BASELINE_SUGGESTIONS: [&str; 5] = [
    "Help me swap tokens",
    "What are the current staking rates?",
    "Show my portfolio",
    "How to provide liquidity?",
    "Explain DeFi concepts",
];

pub const MAX_SUGGESTIONS: usize = 5;

const STAKING_APY_THRESHOLD: f64 = 10.0;
const HIGH_VOLUME_THRESHOLD: f64 = 100_000.0;

const STAKE_FOLLOW_UPS: [&str; 3] = [
    "View staking rewards",
    "Calculate staking returns",
    "Unstake tokens",
];
const SWAP_FOLLOW_UPS: [&str; 3] = [
    "Check token prices",
    "View trading pairs",
    "Calculate swap fees",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionGenerator {
    baseline: Vec<String>,
    limit: usize,
}

impl SuggestionGenerator {
    /// `limit` is capped at [`MAX_SUGGESTIONS`].
    #[must_use]
    pub fn new(baseline: Vec<String>, limit: usize) -> Self {
        Self {
            baseline,
            limit: limit.min(MAX_SUGGESTIONS),
        }
    }

    #[must_use]
    pub fn generate(&self, user_message: &str, market: &MarketSnapshot) -> Vec<String> {
        let mut suggestions = self.baseline.clone();

        if market.staking_stats.apy > STAKING_APY_THRESHOLD {
            suggestions.push(format!("Stake ROOT at {}% APY", market.staking_stats.apy));
        }

        let high_volume = market.high_volume_tokens(HIGH_VOLUME_THRESHOLD);
        if !high_volume.is_empty() {
            suggestions.push(format!("Trade high-volume {} pair", high_volume.join("/")));
        }

        let message = user_message.to_lowercase();
        if message.contains("stake") {
            suggestions.extend(STAKE_FOLLOW_UPS.iter().map(ToString::to_string));
        } else if message.contains("swap") {
            suggestions.extend(SWAP_FOLLOW_UPS.iter().map(ToString::to_string));
        }

        let mut unique: Vec<String> = Vec::with_capacity(self.limit);
        for suggestion in suggestions {
            if unique.len() == self.limit {
                break;
            }
            if !unique.contains(&suggestion) {
                unique.push(suggestion);
            }
        }
        unique
    }
}

impl Default for SuggestionGenerator {
    fn default() -> Self {
        Self::new(
            BASELINE_SUGGESTIONS.iter().map(ToString::to_string).collect(),
            MAX_SUGGESTIONS,
        )
    }
}
