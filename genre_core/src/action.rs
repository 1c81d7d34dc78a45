//! Actions the assistant can propose.
//!
//! The model emits a loosely typed [`ActionPayload`] (`{"type": ..., "params": {...}}`).
//! It is validated into a [`SuggestedAction`] before anything else sees it.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Wire form of an action as it appears between `$$$` markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPayload {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub params: BTreeMap<String, serde_json::Value>,
}

impl ActionPayload {
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            params: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params
            .insert(name.into(), serde_json::Value::String(value.into()));
        self
    }

    /// String or numeric parameter, trimmed. Empty strings count as absent.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<String> {
        let value = match self.params.get(name)? {
            serde_json::Value::String(s) => s.trim().to_string(),
            serde_json::Value::Number(n) => n.to_string(),
            _ => return None,
        };
        (!value.is_empty()).then_some(value)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("unknown action kind: {0}")]
    UnknownKind(String),

    #[error("{kind} action is missing parameter `{param}`")]
    MissingParam {
        kind: &'static str,
        param: &'static str,
    },

    #[error("invalid parameter `{param}`: {reason}")]
    InvalidParam { param: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestedAction {
    Swap {
        from_token: String,
        to_token: String,
        amount: String,
    },
    Stake {
        amount: String,
    },
    Unstake {
        amount: String,
    },
    ProvideLiquidity {
        pool_id: String,
        amounts: (String, String),
    },
}

impl SuggestedAction {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Swap { .. } => "swap",
            Self::Stake { .. } => "stake",
            Self::Unstake { .. } => "unstake",
            Self::ProvideLiquidity { .. } => "provide_liquidity",
        }
    }
}

impl fmt::Display for SuggestedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Swap {
                from_token,
                to_token,
                amount,
            } => write!(f, "swap {amount} {from_token} for {to_token}"),
            Self::Stake { amount } => write!(f, "stake {amount} ROOT"),
            Self::Unstake { amount } => write!(f, "unstake {amount} ROOT"),
            Self::ProvideLiquidity {
                pool_id,
                amounts: (a, b),
            } => write!(f, "provide {a} + {b} liquidity to {pool_id}"),
        }
    }
}

fn required(
    payload: &ActionPayload,
    kind: &'static str,
    param: &'static str,
) -> Result<String, ActionError> {
    payload
        .param(param)
        .ok_or(ActionError::MissingParam { kind, param })
}

fn split_amounts(raw: &str) -> Result<(String, String), ActionError> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [a, b] if !a.is_empty() && !b.is_empty() => Ok(((*a).to_string(), (*b).to_string())),
        _ => Err(ActionError::InvalidParam {
            param: "amounts",
            reason: format!("expected two comma-separated amounts, got `{raw}`"),
        }),
    }
}

impl TryFrom<&ActionPayload> for SuggestedAction {
    type Error = ActionError;

    fn try_from(payload: &ActionPayload) -> Result<Self, Self::Error> {
        match payload.kind.as_str() {
            "swap" => Ok(Self::Swap {
                from_token: required(payload, "swap", "fromToken")?,
                to_token: required(payload, "swap", "toToken")?,
                amount: required(payload, "swap", "amount")?,
            }),
            "stake" => Ok(Self::Stake {
                amount: required(payload, "stake", "amount")?,
            }),
            "unstake" => Ok(Self::Unstake {
                amount: required(payload, "unstake", "amount")?,
            }),
            "provide_liquidity" => Ok(Self::ProvideLiquidity {
                pool_id: required(payload, "provide_liquidity", "poolId")?,
                amounts: split_amounts(&required(payload, "provide_liquidity", "amounts")?)?,
            }),
            other => Err(ActionError::UnknownKind(other.to_string())),
        }
    }
}
