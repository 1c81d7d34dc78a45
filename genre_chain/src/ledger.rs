//! State behind [`DemoChain`](crate::DemoChain).

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::str::FromStr;

use genre_core::ChainError;
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};

const SECONDS_PER_YEAR: i64 = 365 * 24 * 60 * 60;

pub fn parse_amount(raw: &str) -> Result<Decimal, ChainError> {
    let amount = Decimal::from_str(raw.trim())
        .map_err(|e| ChainError::InvalidAmount(format!("{raw}: {e}")))?;
    if amount <= Decimal::ZERO {
        return Err(ChainError::InvalidAmount(format!("{raw}: must be positive")));
    }
    Ok(amount)
}

/// Minimum-output floors may be zero.
pub fn parse_floor(raw: &str) -> Result<Decimal, ChainError> {
    let floor = Decimal::from_str(raw.trim())
        .map_err(|e| ChainError::InvalidAmount(format!("{raw}: {e}")))?;
    if floor < Decimal::ZERO {
        return Err(ChainError::InvalidAmount(format!("{raw}: must not be negative")));
    }
    Ok(floor)
}

pub fn format_amount(amount: Decimal) -> String {
    amount.normalize().to_string()
}

#[derive(Debug, Clone)]
pub struct Pool {
    pub token_a: String,
    pub token_b: String,
    pub reserve_a: Decimal,
    pub reserve_b: Decimal,
    pub lp_supply: Decimal,
    pub apy: f64,
}

impl Pool {
    /// LP tokens minted for a deposit, proportional to the scarcer side.
    pub fn lp_for(&self, amount_a: Decimal, amount_b: Decimal) -> Result<Decimal, ChainError> {
        let share = |amount: Decimal, reserve: Decimal| {
            amount
                .checked_mul(self.lp_supply)
                .and_then(|v| v.checked_div(reserve))
        };
        match (share(amount_a, self.reserve_a), share(amount_b, self.reserve_b)) {
            (Some(a), Some(b)) => Ok(a.min(b).round_dp(18)),
            _ => Err(ChainError::InvalidAmount("deposit out of range".to_string())),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Account {
    pub balances: BTreeMap<String, Decimal>,
    pub lp_tokens: BTreeMap<String, Decimal>,
    pub staked: Decimal,
    /// Rewards settled up to `accrued_at` (unix seconds).
    pub rewards: Decimal,
    pub accrued_at: i64,
}

impl Account {
    pub fn balance(&self, token: &str) -> Decimal {
        self.balances.get(token).copied().unwrap_or_default()
    }

    pub fn debit(&mut self, token: &str, amount: Decimal) -> Result<(), ChainError> {
        let available = self.balance(token);
        if available < amount {
            return Err(ChainError::InsufficientBalance {
                token: token.to_string(),
                available: format_amount(available),
                required: format_amount(amount),
            });
        }
        self.balances.insert(token.to_string(), available - amount);
        Ok(())
    }

    pub fn credit(&mut self, token: &str, amount: Decimal) {
        *self.balances.entry(token.to_string()).or_default() += amount;
    }

    /// Settled rewards plus simple interest on the stake since `accrued_at`.
    pub fn pending_rewards(&self, rate: Decimal, now: i64) -> Decimal {
        let elapsed = Decimal::from(now.saturating_sub(self.accrued_at).max(0));
        self.staked
            .checked_mul(rate)
            .and_then(|v| v.checked_mul(elapsed))
            .and_then(|v| v.checked_div(Decimal::from(SECONDS_PER_YEAR)))
            .and_then(|earned| self.rewards.checked_add(earned))
            .unwrap_or(self.rewards)
    }

    /// Must run before the stake changes, so past accrual uses the old amount.
    pub fn settle_rewards(&mut self, rate: Decimal, now: i64) {
        self.rewards = self.pending_rewards(rate, now);
        self.accrued_at = now;
    }
}

#[derive(Debug)]
pub struct Ledger {
    pub accounts: BTreeMap<String, Account>,
    pub pools: BTreeMap<String, Pool>,
    pub rates: BTreeMap<(String, String), Decimal>,
    pub prices: BTreeMap<String, Decimal>,
    pub volumes: BTreeMap<String, Decimal>,
    pub faucet: BTreeMap<String, Decimal>,
    pub base_staked: Decimal,
    pub staking_apy: f64,
    nonce: u64,
}

impl Ledger {
    /// The demo network: three tokens, three pools, fixed exchange rates.
    pub fn seeded() -> Self {
        let dec = |value: i64| Decimal::new(value, 0);
        let tenths = |value: i64| Decimal::new(value, 1);
        let hundredths = |value: i64| Decimal::new(value, 2);

        let pool = |a: &str, b: &str, reserve_a: i64, reserve_b: i64, supply: i64, apy: f64| Pool {
            token_a: a.to_string(),
            token_b: b.to_string(),
            reserve_a: dec(reserve_a),
            reserve_b: dec(reserve_b),
            lp_supply: dec(supply),
            apy,
        };

        Self {
            accounts: BTreeMap::new(),
            pools: BTreeMap::from([
                ("trn-root".to_string(), pool("TRN", "ROOT", 1000, 1000, 2000, 15.0)),
                ("trn-usdt".to_string(), pool("TRN", "USDT", 1000, 500, 1500, 12.0)),
                ("root-usdt".to_string(), pool("ROOT", "USDT", 1000, 800, 1800, 10.0)),
            ]),
            rates: BTreeMap::from([
                (("TRN".to_string(), "USDT".to_string()), tenths(15)),
                (("ROOT".to_string(), "USDT".to_string()), dec(2)),
                (("TRN".to_string(), "ROOT".to_string()), hundredths(75)),
            ]),
            prices: BTreeMap::from([
                ("TRN".to_string(), tenths(15)),
                ("ROOT".to_string(), dec(2)),
                ("USDT".to_string(), dec(1)),
            ]),
            volumes: BTreeMap::from([
                ("TRN".to_string(), dec(182_500)),
                ("ROOT".to_string(), dec(126_000)),
                ("USDT".to_string(), dec(94_300)),
            ]),
            faucet: BTreeMap::from([
                ("TRN".to_string(), dec(1000)),
                ("ROOT".to_string(), dec(500)),
                ("USDT".to_string(), dec(10_000)),
            ]),
            base_staked: dec(1_250_000),
            staking_apy: 15.2,
            nonce: 0,
        }
    }

    /// Unknown addresses start with the faucet allocation.
    pub fn account(&mut self, address: &str) -> &mut Account {
        let faucet = &self.faucet;
        self.accounts
            .entry(address.to_string())
            .or_insert_with(|| Account {
                balances: faucet.clone(),
                ..Account::default()
            })
    }

    /// Read-only view of an account; unknown addresses show the faucet allocation.
    pub fn view(&self, address: &str) -> Cow<'_, Account> {
        self.accounts.get(address).map_or_else(
            || {
                Cow::Owned(Account {
                    balances: self.faucet.clone(),
                    ..Account::default()
                })
            },
            Cow::Borrowed,
        )
    }

    /// Staking APY as a fraction.
    pub fn staking_rate(&self) -> Decimal {
        Decimal::try_from(self.staking_apy)
            .ok()
            .and_then(|apy| apy.checked_div(Decimal::ONE_HUNDRED))
            .unwrap_or(Decimal::ZERO)
    }

    pub fn pool(&self, pool_id: &str) -> Result<&Pool, ChainError> {
        self.pools
            .get(&pool_id.to_lowercase())
            .ok_or_else(|| ChainError::NotFound(format!("pool {pool_id}")))
    }

    /// Output of swapping `amount` of `from` into `to`; reverse pairs use the inverse rate.
    pub fn quote(&self, from: &str, to: &str, amount: Decimal) -> Result<Decimal, ChainError> {
        let out = if let Some(rate) = self.rates.get(&(from.to_string(), to.to_string())) {
            amount.checked_mul(*rate)
        } else if let Some(rate) = self.rates.get(&(to.to_string(), from.to_string())) {
            amount.checked_div(*rate)
        } else {
            return Err(ChainError::NotFound(format!("exchange rate {from}-{to}")));
        };
        out.map(|v| v.round_dp(18))
            .ok_or_else(|| ChainError::InvalidAmount("swap amount out of range".to_string()))
    }

    pub fn total_staked(&self) -> Decimal {
        self.accounts
            .values()
            .fold(self.base_staked, |acc, account| acc + account.staked)
    }

    pub fn record_volume(&mut self, token: &str, amount: Decimal) {
        *self.volumes.entry(token.to_string()).or_default() += amount;
    }

    /// Deterministic transaction hash over a monotonically increasing nonce.
    pub fn next_tx_hash(&mut self, summary: &str) -> String {
        self.nonce += 1;
        let mut hasher = Sha256::new();
        hasher.update(self.nonce.to_be_bytes());
        hasher.update(b":");
        hasher.update(summary.as_bytes());
        format!("0x{:x}", hasher.finalize())
    }
}
