//! Hand-written collaborators for pipeline tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use genre_core::{
    AmmClient, BalanceQuery, ChainError, ChatMessage, CompletionParams, LLMProvider, LLMResponse,
    PoolRegistry, PoolSummary, PriceOracle, ProviderError, StakingPosition, StakingService,
    StakingStats, TxHash,
};

pub const ADDRESS: &str = "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY";

/// Replays canned replies and records every request it receives.
#[derive(Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String, ProviderError>>>,
    pub requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedProvider {
    pub fn replying(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| Ok((*r).to_string())).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: ProviderError) -> Self {
        Self {
            replies: Mutex::new(VecDeque::from([Err(error)])),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn last_request(&self) -> Vec<ChatMessage> {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        _params: &CompletionParams,
    ) -> Result<LLMResponse, ProviderError> {
        self.requests.lock().unwrap().push(messages.to_vec());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("Anything else?".to_string()))?;
        Ok(LLMResponse {
            content: reply,
            usage: None,
        })
    }
}

/// Chain double with fixed reads and a log of every write.
pub struct RecordingChain {
    pub swap_estimate: String,
    pub lp_estimate: String,
    pub staking_apy: f64,
    pub staked: String,
    pub fail_reads: Option<ChainError>,
    pub fail_writes: Option<ChainError>,
    pub writes: Mutex<Vec<String>>,
    pub estimates: Mutex<Vec<String>>,
}

impl Default for RecordingChain {
    fn default() -> Self {
        Self {
            swap_estimate: "50".to_string(),
            lp_estimate: "200".to_string(),
            staking_apy: 15.2,
            staked: "0".to_string(),
            fail_reads: None,
            fail_writes: None,
            writes: Mutex::new(Vec::new()),
            estimates: Mutex::new(Vec::new()),
        }
    }
}

impl RecordingChain {
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }

    pub fn external_calls(&self) -> usize {
        self.writes.lock().unwrap().len() + self.estimates.lock().unwrap().len()
    }

    fn read<T>(&self, value: T) -> Result<T, ChainError> {
        match &self.fail_reads {
            Some(e) => Err(e.clone()),
            None => Ok(value),
        }
    }

    fn write(&self, entry: String) -> Result<TxHash, ChainError> {
        if let Some(e) = &self.fail_writes {
            return Err(e.clone());
        }
        let mut writes = self.writes.lock().unwrap();
        writes.push(entry);
        Ok(TxHash(format!("0x{:04x}", writes.len())))
    }
}

#[async_trait]
impl PriceOracle for RecordingChain {
    async fn price(&self, symbol: &str) -> Result<String, ChainError> {
        self.read(match symbol {
            "ROOT" => "2.5",
            "TRN" => "1.5",
            _ => "1",
        }
        .to_string())
    }

    async fn volume_24h(&self, symbol: &str) -> Result<String, ChainError> {
        self.read(match symbol {
            "ROOT" => "250000",
            _ => "5000",
        }
        .to_string())
    }
}

#[async_trait]
impl PoolRegistry for RecordingChain {
    async fn pools(&self) -> Result<Vec<PoolSummary>, ChainError> {
        self.read(vec![
            PoolSummary {
                id: "trn-root".to_string(),
                total_liquidity: "2000".to_string(),
                apy: 15.0,
            },
            PoolSummary {
                id: "trn-usdt".to_string(),
                total_liquidity: "1500".to_string(),
                apy: 12.0,
            },
        ])
    }

    async fn lp_balance(&self, _address: &str, pool_id: &str) -> Result<String, ChainError> {
        self.read(if pool_id == "trn-root" { "7" } else { "0" }.to_string())
    }
}

#[async_trait]
impl StakingService for RecordingChain {
    async fn pool_stats(&self) -> Result<StakingStats, ChainError> {
        self.read(StakingStats {
            total_staked: "1000000".to_string(),
            apy: self.staking_apy,
        })
    }

    async fn position(&self, _address: &str) -> Result<StakingPosition, ChainError> {
        self.read(StakingPosition {
            amount: self.staked.clone(),
            rewards: "1".to_string(),
        })
    }

    async fn stake(&self, address: &str, amount: &str) -> Result<TxHash, ChainError> {
        self.write(format!("stake {address} {amount}"))
    }

    async fn unstake(&self, address: &str, amount: &str) -> Result<TxHash, ChainError> {
        self.write(format!("unstake {address} {amount}"))
    }
}

#[async_trait]
impl BalanceQuery for RecordingChain {
    async fn token_balance(&self, _address: &str, symbol: &str) -> Result<String, ChainError> {
        self.read(match symbol {
            "ROOT" => "500",
            "TRN" => "1000",
            _ => "10000",
        }
        .to_string())
    }
}

#[async_trait]
impl AmmClient for RecordingChain {
    async fn estimate_swap_output(
        &self,
        from_token: &str,
        to_token: &str,
        amount: &str,
    ) -> Result<String, ChainError> {
        self.estimates
            .lock()
            .unwrap()
            .push(format!("swap {from_token} {to_token} {amount}"));
        Ok(self.swap_estimate.clone())
    }

    async fn swap(
        &self,
        address: &str,
        from_token: &str,
        to_token: &str,
        amount: &str,
        min_received: &str,
    ) -> Result<TxHash, ChainError> {
        self.write(format!(
            "swap {address} {from_token} {to_token} {amount} {min_received}"
        ))
    }

    async fn estimate_lp_tokens(
        &self,
        pool_id: &str,
        amounts: [&str; 2],
    ) -> Result<String, ChainError> {
        self.estimates
            .lock()
            .unwrap()
            .push(format!("lp {pool_id} {} {}", amounts[0], amounts[1]));
        Ok(self.lp_estimate.clone())
    }

    async fn add_liquidity(
        &self,
        address: &str,
        pool_id: &str,
        amounts: [&str; 2],
        min_lp_tokens: &str,
    ) -> Result<TxHash, ChainError> {
        self.write(format!(
            "add_liquidity {address} {pool_id} {} {} {min_lp_tokens}",
            amounts[0], amounts[1]
        ))
    }
}
