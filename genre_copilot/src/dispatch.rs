//! Turns a confirmed [`SuggestedAction`] into exactly one chain operation.

use std::str::FromStr;

use genre_core::{ActionPayload, ChainClient, ChainError, SuggestedAction, TxHash};
use rust_decimal::Decimal;
use tracing::info;

use crate::CopilotError;

/// Slippage tolerance applied when no other value is configured.
pub const DEFAULT_SLIPPAGE_PERCENT: Decimal = Decimal::ONE;

/// `amount` reduced by `slippage_percent`, as a normalized decimal string.
pub fn apply_slippage(amount: &str, slippage_percent: Decimal) -> Result<String, ChainError> {
    let value = Decimal::from_str(amount.trim())
        .map_err(|e| ChainError::InvalidAmount(format!("{amount}: {e}")))?;
    let hundred = Decimal::ONE_HUNDRED;
    let floor = value
        .checked_mul(hundred - slippage_percent)
        .and_then(|v| v.checked_div(hundred))
        .ok_or_else(|| ChainError::InvalidAmount(format!("{amount}: out of range")))?;
    Ok(floor.normalize().to_string())
}

pub struct ActionDispatcher<'a, C: ?Sized> {
    chain: &'a C,
    slippage_percent: Decimal,
}

impl<'a, C> ActionDispatcher<'a, C>
where
    C: ChainClient + ?Sized,
{
    #[must_use]
    pub const fn new(chain: &'a C) -> Self {
        Self {
            chain,
            slippage_percent: DEFAULT_SLIPPAGE_PERCENT,
        }
    }

    #[must_use]
    pub const fn with_slippage_percent(mut self, slippage_percent: Decimal) -> Self {
        self.slippage_percent = slippage_percent;
        self
    }

    /// Validate a wire payload, then dispatch it.
    ///
    /// Unknown kinds fail with [`CopilotError::UnknownActionKind`] before any
    /// chain call is made.
    pub async fn dispatch_payload(
        &self,
        payload: &ActionPayload,
        address: &str,
    ) -> Result<TxHash, CopilotError> {
        let action = SuggestedAction::try_from(payload)?;
        self.dispatch(&action, address).await
    }

    pub async fn dispatch(
        &self,
        action: &SuggestedAction,
        address: &str,
    ) -> Result<TxHash, CopilotError> {
        info!("Dispatching {} for {address}", action.kind());

        let result = match action {
            SuggestedAction::Swap {
                from_token,
                to_token,
                amount,
            } => self.swap(address, from_token, to_token, amount).await,
            SuggestedAction::Stake { amount } => self.chain.stake(address, amount).await,
            SuggestedAction::Unstake { amount } => self.chain.unstake(address, amount).await,
            SuggestedAction::ProvideLiquidity {
                pool_id,
                amounts: (first, second),
            } => {
                self.provide_liquidity(address, pool_id, [first.as_str(), second.as_str()])
                    .await
            }
        };

        let tx = result.map_err(CopilotError::OperationFailed)?;
        info!("{} submitted: {tx}", action.kind());
        Ok(tx)
    }

    async fn swap(
        &self,
        address: &str,
        from_token: &str,
        to_token: &str,
        amount: &str,
    ) -> Result<TxHash, ChainError> {
        let estimate = self
            .chain
            .estimate_swap_output(from_token, to_token, amount)
            .await?;
        let min_received = apply_slippage(&estimate, self.slippage_percent)?;
        info!("Swap estimate {estimate} {to_token}, minimum received {min_received}");

        self.chain
            .swap(address, from_token, to_token, amount, &min_received)
            .await
    }

    async fn provide_liquidity(
        &self,
        address: &str,
        pool_id: &str,
        amounts: [&str; 2],
    ) -> Result<TxHash, ChainError> {
        let estimate = self.chain.estimate_lp_tokens(pool_id, amounts).await?;
        let min_lp_tokens = apply_slippage(&estimate, self.slippage_percent)?;
        info!("Liquidity estimate {estimate} LP, minimum accepted {min_lp_tokens}");

        self.chain
            .add_liquidity(address, pool_id, amounts, &min_lp_tokens)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_percent_below_estimate() {
        assert_eq!(apply_slippage("50", DEFAULT_SLIPPAGE_PERCENT).unwrap(), "49.5");
        assert_eq!(apply_slippage("100", DEFAULT_SLIPPAGE_PERCENT).unwrap(), "99");
        assert_eq!(
            apply_slippage("1000000000000000000000", DEFAULT_SLIPPAGE_PERCENT).unwrap(),
            "990000000000000000000"
        );
    }

    #[test]
    fn custom_tolerance() {
        assert_eq!(apply_slippage("80", Decimal::new(5, 0)).unwrap(), "76");
        assert_eq!(apply_slippage("80", Decimal::ZERO).unwrap(), "80");
    }

    #[test]
    fn unparseable_estimate_is_rejected() {
        assert!(matches!(
            apply_slippage("lots", DEFAULT_SLIPPAGE_PERCENT),
            Err(ChainError::InvalidAmount(_))
        ));
    }
}
