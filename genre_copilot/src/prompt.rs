//! System prompt rendering.

use genre_core::{MarketSnapshot, UserSnapshot};

pub const DEFAULT_ASSISTANT_NAME: &str = "Genre AI";

const INSTRUCTIONS: &str = "\
Instructions:
1. You can suggest actions like swapping tokens, providing liquidity, or staking.
2. For staking queries, always mention the current APY and minimum staking amount.
3. For swaps, ask for the amount and token pair if not provided.
4. Format action suggestions in JSON within $$$ delimiters.
5. Keep responses concise and focused on DeFi operations.
6. Always provide next steps or suggestions.
7. Remember previous context when responding.

Action formats:
- swap: {\"type\": \"swap\", \"params\": {\"fromToken\": \"ROOT\", \"toToken\": \"TRN\", \"amount\": \"100\"}}
- stake / unstake: {\"type\": \"stake\", \"params\": {\"amount\": \"50\"}}
- provide_liquidity: {\"type\": \"provide_liquidity\", \"params\": {\"poolId\": \"trn-root\", \"amounts\": \"10,20\"}}

Example stake response:
\"The current staking APY is 15.2%. Would you like to stake your ROOT tokens? Please specify the amount you'd like to stake.
$$${\"type\": \"stake\", \"params\": {\"amount\": \"PENDING_USER_INPUT\"}}$$$\"

Example swap response:
\"I can help you swap tokens. Please specify:
1. Amount to swap
2. Token you want to receive
Current rates: 1 ROOT = 2.5 TRN\"";

/// Renders the fixed instruction template around the two snapshots.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    assistant_name: String,
}

impl PromptBuilder {
    #[must_use]
    pub fn new(assistant_name: impl Into<String>) -> Self {
        Self {
            assistant_name: assistant_name.into(),
        }
    }

    #[must_use]
    #[expect(
        clippy::expect_used,
        reason = "snapshots hold only string-keyed maps and plain values"
    )]
    pub fn build(&self, market: &MarketSnapshot, user: &UserSnapshot) -> String {
        let market_json =
            serde_json::to_string_pretty(market).expect("market snapshot always serializes");
        let user_json =
            serde_json::to_string_pretty(user).expect("user snapshot always serializes");

        format!(
            "You are {}, a DeFi assistant for the TRN blockchain.\n\n\
             Current market data:\n{market_json}\n\n\
             User's portfolio:\n{user_json}\n\n\
             {INSTRUCTIONS}",
            self.assistant_name
        )
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_ASSISTANT_NAME)
    }
}
