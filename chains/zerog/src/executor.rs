use crate::chain::{SwapChain, SwapParams, TxOverrides};
use crate::config::ZeroGConfig;
use crate::error::SwapError;
use crate::trade::TradeIntent;
use anyhow::Context;
use ethers::types::{Address, TxHash, U256};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Parameters of every approve + swap pair.
#[derive(Debug, Clone)]
pub struct ExecutorSettings {
    pub router: Address,
    pub pool_fee: u32,
    pub approve_gas_limit: U256,
    pub gas_multiplier_percent: u64,
    pub swap_deadline: Duration,
    pub settle_delay: Duration,
}

impl ExecutorSettings {
    pub fn from_config(config: &ZeroGConfig, router: Address) -> Self {
        Self {
            router,
            pool_fee: config.pool_fee,
            approve_gas_limit: config.approve_gas_limit(),
            gas_multiplier_percent: config.gas_multiplier_percent,
            swap_deadline: config.swap_deadline(),
            settle_delay: config.settle_delay(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapResult {
    pub success: bool,
    pub tx_hash: TxHash,
    /// Human-readable amount in, 18 decimals.
    pub amount: String,
}

pub struct SwapExecutor {
    settings: ExecutorSettings,
}

impl SwapExecutor {
    pub fn new(settings: ExecutorSettings) -> Self {
        Self { settings }
    }

    /// Approves the router for `intent.amount` and swaps through the
    /// single-hop pool. Nothing is submitted when the balance is short.
    pub async fn execute<C>(&self, chain: &C, intent: &TradeIntent) -> Result<SwapResult, SwapError>
    where
        C: SwapChain + ?Sized,
    {
        let settings = &self.settings;

        let balance = chain.token_balance(intent.from.address).await?;
        if balance < intent.amount {
            return Err(SwapError::InsufficientBalance {
                symbol: intent.from.symbol.clone(),
                available: format_amount(balance),
                requested: format_amount(intent.amount),
            });
        }

        let nonce = chain.pending_nonce().await?;
        let gas_price = chain.gas_price().await?;
        debug!(
            "Approving {} {} for router (nonce {})",
            format_amount(intent.amount),
            intent.from.symbol,
            nonce
        );
        let approve_hash = chain
            .submit_approve(
                intent.from.address,
                settings.router,
                intent.amount,
                TxOverrides {
                    nonce,
                    gas_price,
                    gas_limit: settings.approve_gas_limit,
                },
            )
            .await?;
        let approval = chain.wait_for_confirmation(approve_hash).await?;
        if !approval.success {
            return Err(SwapError::Reverted {
                tx_hash: approval.tx_hash,
            });
        }
        debug!(
            "Approve confirmed: {:?} (block {})",
            approval.tx_hash,
            block_label(approval.block_number)
        );

        tokio::time::sleep(settings.settle_delay).await;

        let nonce = chain.pending_nonce().await?;
        let gas_price = chain.gas_price().await?;
        let params = SwapParams {
            token_in: intent.from.address,
            token_out: intent.to.address,
            fee: settings.pool_fee,
            recipient: chain.address(),
            deadline: deadline_after(settings.swap_deadline)?,
            amount_in: intent.amount,
            amount_out_minimum: U256::zero(),
            sqrt_price_limit_x96: U256::zero(),
        };

        let estimate = chain.estimate_swap_gas(settings.router, &params).await?;
        let gas_limit = estimate * U256::from(settings.gas_multiplier_percent) / U256::from(100);
        debug!(
            "Swapping {} -> {} (nonce {}, gas {})",
            intent.from.symbol, intent.to.symbol, nonce, gas_limit
        );

        let swap_hash = chain
            .submit_swap(
                settings.router,
                &params,
                TxOverrides {
                    nonce,
                    gas_price,
                    gas_limit,
                },
            )
            .await?;
        let confirmation = chain.wait_for_confirmation(swap_hash).await?;
        if !confirmation.success {
            return Err(SwapError::Reverted {
                tx_hash: confirmation.tx_hash,
            });
        }
        debug!(
            "Swap confirmed: {:?} (block {})",
            confirmation.tx_hash,
            block_label(confirmation.block_number)
        );

        Ok(SwapResult {
            success: true,
            tx_hash: confirmation.tx_hash,
            amount: format_amount(intent.amount),
        })
    }
}

fn deadline_after(window: Duration) -> Result<U256, SwapError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("System clock is before the unix epoch")?;
    Ok(U256::from((now + window).as_secs()))
}

fn block_label(block_number: Option<u64>) -> String {
    block_number.map_or_else(|| "pending".to_string(), |n| n.to_string())
}

pub fn format_amount(amount: U256) -> String {
    ethers::utils::format_units(amount, 18).unwrap_or_else(|_| amount.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        let half = U256::from(5u64) * U256::exp10(17);
        assert_eq!(format_amount(half), "0.500000000000000000");
        assert_eq!(format_amount(U256::zero()), "0.000000000000000000");
    }

    #[test]
    fn test_block_label() {
        assert_eq!(block_label(Some(1_234)), "1234");
        assert_eq!(block_label(None), "pending");
    }

    #[test]
    fn test_deadline_is_in_the_future() {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        let deadline = deadline_after(Duration::from_secs(300)).unwrap();
        assert!(deadline >= U256::from(now + 300));
        assert!(deadline <= U256::from(now + 302));
    }

    #[test]
    fn test_settings_follow_config() {
        let config = ZeroGConfig::default();
        let router = config.contracts().unwrap().router;
        let settings = ExecutorSettings::from_config(&config, router);
        assert_eq!(settings.pool_fee, 3000);
        assert_eq!(settings.approve_gas_limit, U256::from(100_000));
        assert_eq!(settings.swap_deadline, Duration::from_secs(300));
    }
}
