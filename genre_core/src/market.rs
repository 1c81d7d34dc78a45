//! Point-in-time views of the market and of one user's holdings.
//!
//! Both snapshots are built fresh for every chat turn and serialized into the
//! system prompt, so field names follow the camelCase the prompt has always
//! shown the model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::chain::{PoolSummary, StakingStats};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    pub prices: BTreeMap<String, String>,
    pub volumes: BTreeMap<String, String>,
    pub liquidity_pools: Vec<PoolSummary>,
    pub staking_stats: StakingStats,
}

impl MarketSnapshot {
    /// Tokens whose 24h volume parses to more than `threshold`.
    ///
    /// Unparseable volumes never qualify.
    #[must_use]
    pub fn high_volume_tokens(&self, threshold: f64) -> Vec<&str> {
        self.volumes
            .iter()
            .filter(|(_, volume)| {
                volume
                    .trim()
                    .parse::<f64>()
                    .is_ok_and(|v| v > threshold)
            })
            .map(|(token, _)| token.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakedAmount {
    pub amount: String,
    pub rewards: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidityPosition {
    pub pool_id: String,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSnapshot {
    pub balances: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staking_position: Option<StakedAmount>,
    pub liquidity_positions: Vec<LiquidityPosition>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(volumes: &[(&str, &str)]) -> MarketSnapshot {
        MarketSnapshot {
            prices: BTreeMap::new(),
            volumes: volumes
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            liquidity_pools: Vec::new(),
            staking_stats: StakingStats {
                total_staked: "0".to_string(),
                apy: 0.0,
            },
        }
    }

    #[test]
    fn high_volume_filter_skips_garbage() {
        let market = snapshot(&[
            ("ROOT", "250000"),
            ("TRN", "100000"),
            ("USDT", "n/a"),
        ]);
        assert_eq!(market.high_volume_tokens(100_000.0), vec!["ROOT"]);
    }

    #[test]
    fn snapshot_uses_camel_case_keys() {
        let market = snapshot(&[]);
        let json = serde_json::to_value(&market).unwrap();
        assert!(json.get("liquidityPools").is_some());
        assert!(json["stakingStats"].get("totalStaked").is_some());

        let user = UserSnapshot {
            balances: BTreeMap::new(),
            staking_position: None,
            liquidity_positions: vec![LiquidityPosition {
                pool_id: "trn-root".to_string(),
                amount: "5".to_string(),
            }],
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("stakingPosition").is_none());
        assert_eq!(json["liquidityPositions"][0]["poolId"], "trn-root");
    }
}
