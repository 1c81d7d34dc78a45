//! A copilot session running against the demo network.

use std::sync::Arc;

use async_trait::async_trait;
use genre_chain::DemoChain;
use genre_copilot::{Copilot, CopilotConfig, CopilotError};
use genre_core::{
    AmmClient, BalanceQuery, ChainError, ChatMessage, CompletionParams, LLMProvider, LLMResponse,
    PoolRegistry, ProviderError, StakingService, SuggestedAction,
};

const ADDRESS: &str = "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY";

struct FixedReply(&'static str);

#[async_trait]
impl LLMProvider for FixedReply {
    async fn chat(
        &self,
        _messages: &[ChatMessage],
        _params: &CompletionParams,
    ) -> Result<LLMResponse, ProviderError> {
        Ok(LLMResponse {
            content: self.0.to_string(),
            usage: None,
        })
    }
}

#[tokio::test]
async fn suggested_swap_settles_on_the_ledger() {
    let chain = Arc::new(DemoChain::new());
    let provider = FixedReply(
        "100 TRN buys about 150 USDT.\n$$${\"type\":\"swap\",\"params\":{\"fromToken\":\"TRN\",\"toToken\":\"USDT\",\"amount\":\"100\"}}$$$",
    );
    let mut copilot = Copilot::new(provider, chain.clone(), CopilotConfig::default());

    let reply = copilot.ask("swap 100 TRN to USDT", ADDRESS).await.unwrap();
    let action = reply.action.unwrap();
    assert_eq!(
        action,
        SuggestedAction::Swap {
            from_token: "TRN".to_string(),
            to_token: "USDT".to_string(),
            amount: "100".to_string(),
        }
    );
    // Answering alone moves no funds.
    assert_eq!(chain.token_balance(ADDRESS, "TRN").await.unwrap(), "1000");

    let tx = copilot.execute(&action, ADDRESS).await.unwrap();
    assert!(tx.as_str().starts_with("0x"));
    assert_eq!(chain.token_balance(ADDRESS, "TRN").await.unwrap(), "900");
    assert_eq!(chain.token_balance(ADDRESS, "USDT").await.unwrap(), "10150");
}

#[tokio::test]
async fn stake_then_context_shows_position() {
    let chain = Arc::new(DemoChain::new());
    let copilot = Copilot::new(FixedReply("ok"), chain.clone(), CopilotConfig::default());

    copilot
        .execute(&SuggestedAction::Stake { amount: "120".to_string() }, ADDRESS)
        .await
        .unwrap();

    let position = chain.position(ADDRESS).await.unwrap();
    assert_eq!(position.amount, "120");
    assert_eq!(chain.token_balance(ADDRESS, "ROOT").await.unwrap(), "380");
    let stats = chain.pool_stats().await.unwrap();
    assert_eq!(stats.total_staked, "1250120");
}

#[tokio::test]
async fn liquidity_mints_lp_tokens_above_floor() {
    let chain = Arc::new(DemoChain::new());
    let copilot = Copilot::new(FixedReply("ok"), chain.clone(), CopilotConfig::default());

    let action = SuggestedAction::ProvideLiquidity {
        pool_id: "trn-usdt".to_string(),
        amounts: ("10".to_string(), "5".to_string()),
    };
    copilot.execute(&action, ADDRESS).await.unwrap();

    assert_eq!(chain.lp_balance(ADDRESS, "trn-usdt").await.unwrap(), "15");
    let pools = chain.pools().await.unwrap();
    let pool = pools.iter().find(|p| p.id == "trn-usdt").unwrap();
    assert_eq!(pool.total_liquidity, "1515");
}

#[tokio::test]
async fn oversized_swap_fails_without_moving_funds() {
    let chain = Arc::new(DemoChain::new());
    let copilot = Copilot::new(FixedReply("ok"), chain.clone(), CopilotConfig::default());

    let action = SuggestedAction::Swap {
        from_token: "ROOT".to_string(),
        to_token: "USDT".to_string(),
        amount: "600".to_string(),
    };
    let err = copilot.execute(&action, ADDRESS).await.unwrap_err();

    assert!(matches!(
        err,
        CopilotError::OperationFailed(ChainError::InsufficientBalance { .. })
    ));
    assert_eq!(chain.token_balance(ADDRESS, "ROOT").await.unwrap(), "500");
}

#[tokio::test]
async fn swap_below_floor_reverts() {
    let chain = DemoChain::new();
    let quote = chain.estimate_swap_output("ROOT", "TRN", "30").await.unwrap();
    assert_eq!(quote, "40");

    let err = chain
        .swap(ADDRESS, "ROOT", "TRN", "30", "41")
        .await
        .unwrap_err();
    assert!(matches!(err, ChainError::Reverted(_)));
    assert_eq!(chain.token_balance(ADDRESS, "ROOT").await.unwrap(), "500");
}
