//! Gathers market data and the caller's holdings for the system prompt.

use std::collections::BTreeMap;

use futures::future::try_join_all;
use genre_core::{
    ChainClient, ChainError, LiquidityPosition, MarketSnapshot, StakedAmount, TRACKED_TOKENS,
    UserSnapshot,
};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::CopilotError;

/// Zero in any decimal spelling (`0`, `0.0`, `0.000`).
fn is_zero(amount: &str) -> bool {
    let amount = amount.trim();
    amount
        .parse::<Decimal>()
        .map_or(amount == "0", |value| value.is_zero())
}

/// Fan-out reader over the chain collaborators.
///
/// Every query runs concurrently; the first failure aborts the whole
/// assembly.
pub struct ContextAssembler<'a, C: ?Sized> {
    chain: &'a C,
}

impl<'a, C> ContextAssembler<'a, C>
where
    C: ChainClient + ?Sized,
{
    #[must_use]
    pub const fn new(chain: &'a C) -> Self {
        Self { chain }
    }

    pub async fn assemble(
        &self,
        address: &str,
    ) -> Result<(MarketSnapshot, UserSnapshot), CopilotError> {
        futures::try_join!(self.market_snapshot(), self.user_snapshot(address)).map_err(|e| {
            warn!("Context assembly failed for {address}: {e}");
            CopilotError::DataUnavailable(e)
        })
    }

    pub async fn market_snapshot(&self) -> Result<MarketSnapshot, ChainError> {
        let prices = try_join_all(TRACKED_TOKENS.iter().map(|symbol| async move {
            let price = self.chain.price(symbol).await?;
            Ok::<_, ChainError>(((*symbol).to_string(), price))
        }));
        let volumes = try_join_all(TRACKED_TOKENS.iter().map(|symbol| async move {
            let volume = self.chain.volume_24h(symbol).await?;
            Ok::<_, ChainError>(((*symbol).to_string(), volume))
        }));

        let (prices, volumes, liquidity_pools, staking_stats) = futures::try_join!(
            prices,
            volumes,
            self.chain.pools(),
            self.chain.pool_stats()
        )?;

        debug!(
            "Market snapshot: {} pools, staking apy {}",
            liquidity_pools.len(),
            staking_stats.apy
        );

        Ok(MarketSnapshot {
            prices: prices.into_iter().collect(),
            volumes: volumes.into_iter().collect(),
            liquidity_pools,
            staking_stats,
        })
    }

    pub async fn user_snapshot(&self, address: &str) -> Result<UserSnapshot, ChainError> {
        let balances = try_join_all(TRACKED_TOKENS.iter().map(|symbol| async move {
            let balance = self.chain.token_balance(address, symbol).await?;
            Ok::<_, ChainError>(((*symbol).to_string(), balance))
        }));

        let liquidity = async {
            let pools = self.chain.pools().await?;
            try_join_all(pools.iter().map(|pool| async move {
                let amount = self.chain.lp_balance(address, &pool.id).await?;
                Ok::<_, ChainError>(LiquidityPosition {
                    pool_id: pool.id.clone(),
                    amount,
                })
            }))
            .await
        };

        let (balances, position, liquidity_positions) =
            futures::try_join!(balances, self.chain.position(address), liquidity)?;

        let balances: BTreeMap<String, String> = balances.into_iter().collect();
        let staking_position = (!is_zero(&position.amount)).then(|| StakedAmount {
            amount: position.amount,
            rewards: position.rewards,
        });
        let liquidity_positions = liquidity_positions
            .into_iter()
            .filter(|p| !is_zero(&p.amount))
            .collect();

        Ok(UserSnapshot {
            balances,
            staking_position,
            liquidity_positions,
        })
    }
}
