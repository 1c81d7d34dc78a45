//! Collaborator interfaces onto the TRN chain.
//!
//! Every read the copilot needs for its context and every transaction it can
//! dispatch goes through one of these traits. Amounts travel as decimal
//! strings, exactly as the node reports them.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("network error: {0}")]
    Network(String),

    #[error("insufficient {token} balance: available {available}, required {required}")]
    InsufficientBalance {
        token: String,
        available: String,
        required: String,
    },

    #[error("transaction reverted: {0}")]
    Reverted(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}

impl ChainError {
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

/// Identifier of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(pub String);

impl TxHash {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolSummary {
    pub id: String,
    pub total_liquidity: String,
    pub apy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakingStats {
    pub total_staked: String,
    pub apy: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakingPosition {
    pub amount: String,
    pub rewards: String,
}

#[async_trait]
pub trait PriceOracle: Send + Sync {
    async fn price(&self, symbol: &str) -> Result<String, ChainError>;
    async fn volume_24h(&self, symbol: &str) -> Result<String, ChainError>;
}

#[async_trait]
pub trait PoolRegistry: Send + Sync {
    async fn pools(&self) -> Result<Vec<PoolSummary>, ChainError>;
    async fn lp_balance(&self, address: &str, pool_id: &str) -> Result<String, ChainError>;
}

#[async_trait]
pub trait StakingService: Send + Sync {
    async fn pool_stats(&self) -> Result<StakingStats, ChainError>;
    async fn position(&self, address: &str) -> Result<StakingPosition, ChainError>;
    async fn stake(&self, address: &str, amount: &str) -> Result<TxHash, ChainError>;
    async fn unstake(&self, address: &str, amount: &str) -> Result<TxHash, ChainError>;
}

#[async_trait]
pub trait BalanceQuery: Send + Sync {
    async fn token_balance(&self, address: &str, symbol: &str) -> Result<String, ChainError>;
}

#[async_trait]
pub trait AmmClient: Send + Sync {
    async fn estimate_swap_output(
        &self,
        from_token: &str,
        to_token: &str,
        amount: &str,
    ) -> Result<String, ChainError>;

    async fn swap(
        &self,
        address: &str,
        from_token: &str,
        to_token: &str,
        amount: &str,
        min_received: &str,
    ) -> Result<TxHash, ChainError>;

    async fn estimate_lp_tokens(
        &self,
        pool_id: &str,
        amounts: [&str; 2],
    ) -> Result<String, ChainError>;

    async fn add_liquidity(
        &self,
        address: &str,
        pool_id: &str,
        amounts: [&str; 2],
        min_lp_tokens: &str,
    ) -> Result<TxHash, ChainError>;
}

/// Everything the copilot needs from a chain backend.
pub trait ChainClient: PriceOracle + PoolRegistry + StakingService + BalanceQuery + AmmClient {}

impl<T> ChainClient for T where
    T: PriceOracle + PoolRegistry + StakingService + BalanceQuery + AmmClient
{
}

#[async_trait]
impl<T: PriceOracle + ?Sized> PriceOracle for Arc<T> {
    async fn price(&self, symbol: &str) -> Result<String, ChainError> {
        (**self).price(symbol).await
    }

    async fn volume_24h(&self, symbol: &str) -> Result<String, ChainError> {
        (**self).volume_24h(symbol).await
    }
}

#[async_trait]
impl<T: PoolRegistry + ?Sized> PoolRegistry for Arc<T> {
    async fn pools(&self) -> Result<Vec<PoolSummary>, ChainError> {
        (**self).pools().await
    }

    async fn lp_balance(&self, address: &str, pool_id: &str) -> Result<String, ChainError> {
        (**self).lp_balance(address, pool_id).await
    }
}

#[async_trait]
impl<T: StakingService + ?Sized> StakingService for Arc<T> {
    async fn pool_stats(&self) -> Result<StakingStats, ChainError> {
        (**self).pool_stats().await
    }

    async fn position(&self, address: &str) -> Result<StakingPosition, ChainError> {
        (**self).position(address).await
    }

    async fn stake(&self, address: &str, amount: &str) -> Result<TxHash, ChainError> {
        (**self).stake(address, amount).await
    }

    async fn unstake(&self, address: &str, amount: &str) -> Result<TxHash, ChainError> {
        (**self).unstake(address, amount).await
    }
}

#[async_trait]
impl<T: BalanceQuery + ?Sized> BalanceQuery for Arc<T> {
    async fn token_balance(&self, address: &str, symbol: &str) -> Result<String, ChainError> {
        (**self).token_balance(address, symbol).await
    }
}

#[async_trait]
impl<T: AmmClient + ?Sized> AmmClient for Arc<T> {
    async fn estimate_swap_output(
        &self,
        from_token: &str,
        to_token: &str,
        amount: &str,
    ) -> Result<String, ChainError> {
        (**self)
            .estimate_swap_output(from_token, to_token, amount)
            .await
    }

    async fn swap(
        &self,
        address: &str,
        from_token: &str,
        to_token: &str,
        amount: &str,
        min_received: &str,
    ) -> Result<TxHash, ChainError> {
        (**self)
            .swap(address, from_token, to_token, amount, min_received)
            .await
    }

    async fn estimate_lp_tokens(
        &self,
        pool_id: &str,
        amounts: [&str; 2],
    ) -> Result<String, ChainError> {
        (**self).estimate_lp_tokens(pool_id, amounts).await
    }

    async fn add_liquidity(
        &self,
        address: &str,
        pool_id: &str,
        amounts: [&str; 2],
        min_lp_tokens: &str,
    ) -> Result<TxHash, ChainError> {
        (**self)
            .add_liquidity(address, pool_id, amounts, min_lp_tokens)
            .await
    }
}
