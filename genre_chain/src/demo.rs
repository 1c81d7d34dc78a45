use async_trait::async_trait;
use chrono::Utc;
use genre_core::{
    AmmClient, BalanceQuery, ChainError, PoolRegistry, PoolSummary, PriceOracle, StakingPosition,
    StakingService, StakingStats, TxHash,
};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::ledger::{Ledger, format_amount, parse_amount, parse_floor};

/// Ledger-backed chain client with the seeded demo network.
#[derive(Debug)]
pub struct DemoChain {
    ledger: RwLock<Ledger>,
}

impl Default for DemoChain {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoChain {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ledger: RwLock::new(Ledger::seeded()),
        }
    }
}

fn symbol(raw: &str) -> String {
    raw.trim().to_uppercase()
}

#[async_trait]
impl PriceOracle for DemoChain {
    async fn price(&self, symbol_raw: &str) -> Result<String, ChainError> {
        let ledger = self.ledger.read().await;
        ledger
            .prices
            .get(&symbol(symbol_raw))
            .map(|p| format_amount(*p))
            .ok_or_else(|| ChainError::NotFound(format!("price for {symbol_raw}")))
    }

    async fn volume_24h(&self, symbol_raw: &str) -> Result<String, ChainError> {
        let ledger = self.ledger.read().await;
        ledger
            .volumes
            .get(&symbol(symbol_raw))
            .map(|v| format_amount(*v))
            .ok_or_else(|| ChainError::NotFound(format!("volume for {symbol_raw}")))
    }
}

#[async_trait]
impl PoolRegistry for DemoChain {
    async fn pools(&self) -> Result<Vec<PoolSummary>, ChainError> {
        let ledger = self.ledger.read().await;
        Ok(ledger
            .pools
            .iter()
            .map(|(id, pool)| PoolSummary {
                id: id.clone(),
                total_liquidity: format_amount(pool.lp_supply),
                apy: pool.apy,
            })
            .collect())
    }

    async fn lp_balance(&self, address: &str, pool_id: &str) -> Result<String, ChainError> {
        let ledger = self.ledger.read().await;
        let pool_id = pool_id.to_lowercase();
        ledger.pool(&pool_id)?;
        let held = ledger
            .view(address)
            .lp_tokens
            .get(&pool_id)
            .copied()
            .unwrap_or_default();
        Ok(format_amount(held))
    }
}

#[async_trait]
impl StakingService for DemoChain {
    async fn pool_stats(&self) -> Result<StakingStats, ChainError> {
        let ledger = self.ledger.read().await;
        Ok(StakingStats {
            total_staked: format_amount(ledger.total_staked()),
            apy: ledger.staking_apy,
        })
    }

    async fn position(&self, address: &str) -> Result<StakingPosition, ChainError> {
        let ledger = self.ledger.read().await;
        let account = ledger.view(address);
        let rewards = account.pending_rewards(ledger.staking_rate(), Utc::now().timestamp());
        Ok(StakingPosition {
            amount: format_amount(account.staked),
            rewards: format_amount(rewards.round_dp(8)),
        })
    }

    async fn stake(&self, address: &str, amount: &str) -> Result<TxHash, ChainError> {
        let amount = parse_amount(amount)?;
        let mut ledger = self.ledger.write().await;
        let rate = ledger.staking_rate();
        let account = ledger.account(address);
        account.debit("ROOT", amount)?;
        account.settle_rewards(rate, Utc::now().timestamp());
        account.staked += amount;

        let hash = ledger.next_tx_hash(&format!("stake:{address}:{amount}"));
        info!(address, amount = %amount, tx = %hash, "Staked ROOT");
        Ok(TxHash(hash))
    }

    async fn unstake(&self, address: &str, amount: &str) -> Result<TxHash, ChainError> {
        let amount = parse_amount(amount)?;
        let mut ledger = self.ledger.write().await;
        let rate = ledger.staking_rate();
        let account = ledger.account(address);
        if account.staked < amount {
            return Err(ChainError::InsufficientBalance {
                token: "staked ROOT".to_string(),
                available: format_amount(account.staked),
                required: format_amount(amount),
            });
        }
        account.settle_rewards(rate, Utc::now().timestamp());
        account.staked -= amount;
        account.credit("ROOT", amount);

        let hash = ledger.next_tx_hash(&format!("unstake:{address}:{amount}"));
        info!(address, amount = %amount, tx = %hash, "Unstaked ROOT");
        Ok(TxHash(hash))
    }
}

#[async_trait]
impl BalanceQuery for DemoChain {
    async fn token_balance(&self, address: &str, symbol_raw: &str) -> Result<String, ChainError> {
        let token = symbol(symbol_raw);
        let ledger = self.ledger.read().await;
        if !ledger.prices.contains_key(&token) {
            return Err(ChainError::NotFound(format!("token {symbol_raw}")));
        }
        Ok(format_amount(ledger.view(address).balance(&token)))
    }
}

#[async_trait]
impl AmmClient for DemoChain {
    async fn estimate_swap_output(
        &self,
        from_token: &str,
        to_token: &str,
        amount: &str,
    ) -> Result<String, ChainError> {
        let amount = parse_amount(amount)?;
        let ledger = self.ledger.read().await;
        let out = ledger.quote(&symbol(from_token), &symbol(to_token), amount)?;
        debug!(from_token, to_token, amount = %amount, out = %out, "Quoted swap");
        Ok(format_amount(out))
    }

    async fn swap(
        &self,
        address: &str,
        from_token: &str,
        to_token: &str,
        amount: &str,
        min_received: &str,
    ) -> Result<TxHash, ChainError> {
        let (from, to) = (symbol(from_token), symbol(to_token));
        let amount = parse_amount(amount)?;
        let floor = parse_floor(min_received)?;

        let mut ledger = self.ledger.write().await;
        let out = ledger.quote(&from, &to, amount)?;
        if out < floor {
            return Err(ChainError::Reverted(format!(
                "output {} below minimum {}",
                format_amount(out),
                format_amount(floor)
            )));
        }

        let account = ledger.account(address);
        account.debit(&from, amount)?;
        account.credit(&to, out);
        ledger.record_volume(&from, amount);
        ledger.record_volume(&to, out);

        let hash = ledger.next_tx_hash(&format!("swap:{address}:{from}:{to}:{amount}"));
        info!(address, %from, %to, amount = %amount, out = %out, tx = %hash, "Swapped");
        Ok(TxHash(hash))
    }

    async fn estimate_lp_tokens(
        &self,
        pool_id: &str,
        amounts: [&str; 2],
    ) -> Result<String, ChainError> {
        let (amount_a, amount_b) = (parse_amount(amounts[0])?, parse_amount(amounts[1])?);
        let ledger = self.ledger.read().await;
        let minted = ledger.pool(pool_id)?.lp_for(amount_a, amount_b)?;
        Ok(format_amount(minted))
    }

    async fn add_liquidity(
        &self,
        address: &str,
        pool_id: &str,
        amounts: [&str; 2],
        min_lp_tokens: &str,
    ) -> Result<TxHash, ChainError> {
        let pool_id = pool_id.to_lowercase();
        let (amount_a, amount_b) = (parse_amount(amounts[0])?, parse_amount(amounts[1])?);
        let floor = parse_floor(min_lp_tokens)?;

        let mut ledger = self.ledger.write().await;
        let pool = ledger.pool(&pool_id)?.clone();
        let minted = pool.lp_for(amount_a, amount_b)?;
        if minted < floor {
            return Err(ChainError::Reverted(format!(
                "minted {} LP below minimum {}",
                format_amount(minted),
                format_amount(floor)
            )));
        }

        let account = ledger.account(address);
        let snapshot = account.balances.clone();
        account.debit(&pool.token_a, amount_a)?;
        if let Err(e) = account.debit(&pool.token_b, amount_b) {
            account.balances = snapshot;
            return Err(e);
        }
        *account.lp_tokens.entry(pool_id.clone()).or_default() += minted;

        if let Some(entry) = ledger.pools.get_mut(&pool_id) {
            entry.reserve_a += amount_a;
            entry.reserve_b += amount_b;
            entry.lp_supply += minted;
        }

        let hash = ledger.next_tx_hash(&format!("lp:{address}:{pool_id}:{amount_a}:{amount_b}"));
        info!(address, pool = %pool_id, minted = %minted, tx = %hash, "Added liquidity");
        Ok(TxHash(hash))
    }
}
