use crate::config::Contracts;
use crate::error::SwapError;
use crate::executor::{SwapExecutor, SwapResult};
use crate::rpc::ChainConnector;
use async_trait::async_trait;
use core_logic::RetryConfig;
use ethers::types::{Address, U256};
use rand::Rng;
use std::fmt;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub symbol: String,
    pub address: Address,
}

impl Token {
    pub fn new(symbol: impl Into<String>, address: Address) -> Self {
        Self {
            symbol: symbol.into(),
            address,
        }
    }
}

/// A stable token and the volatile token it is swapped against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradePair {
    pub stable: Token,
    pub volatile: Token,
}

impl TradePair {
    pub fn new(stable: Token, volatile: Token) -> Self {
        Self { stable, volatile }
    }
}

impl fmt::Display for TradePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.stable.symbol, self.volatile.symbol)
    }
}

/// One swap leg. `amount` is in 18-decimal base units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeIntent {
    pub from: Token,
    pub to: Token,
    pub amount: U256,
}

impl TradeIntent {
    /// Stable to volatile, 0.50..=2.00 with two decimals.
    pub fn forward<R: Rng + ?Sized>(pair: &TradePair, rng: &mut R) -> Self {
        let cents: u64 = rng.gen_range(50..=200);
        Self {
            from: pair.stable.clone(),
            to: pair.volatile.clone(),
            amount: U256::from(cents) * U256::exp10(16),
        }
    }

    /// Volatile back to stable, 0.000200..=0.000500 with six decimals.
    pub fn reverse<R: Rng + ?Sized>(pair: &TradePair, rng: &mut R) -> Self {
        let micros: u64 = rng.gen_range(200..=500);
        Self {
            from: pair.volatile.clone(),
            to: pair.stable.clone(),
            amount: U256::from(micros) * U256::exp10(12),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TradeAction {
    NoOp,
    RoundTrip(TradePair),
}

pub trait ActionSelector: Send {
    fn next_action(&mut self) -> TradeAction;
}

/// Uniform pick between USDT/BTC, USDT/ETH and doing nothing.
pub struct RandomSelector<R> {
    rng: R,
    btc: TradePair,
    eth: TradePair,
}

impl<R: Rng + Send> RandomSelector<R> {
    pub fn new(rng: R, contracts: &Contracts) -> Self {
        Self {
            rng,
            btc: contracts.usdt_btc(),
            eth: contracts.usdt_eth(),
        }
    }

    fn action_for(&self, id: u8) -> TradeAction {
        match id {
            0 => TradeAction::RoundTrip(self.btc.clone()),
            1 => TradeAction::RoundTrip(self.eth.clone()),
            _ => TradeAction::NoOp,
        }
    }
}

impl<R: Rng + Send> ActionSelector for RandomSelector<R> {
    fn next_action(&mut self) -> TradeAction {
        let id = self.rng.gen_range(0..3u8);
        self.action_for(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Skipped,
    Completed,
    Failed,
}

impl ActionOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, ActionOutcome::Failed)
    }
}

/// Per-account trading surface driven by the runner.
#[async_trait]
pub trait TradeSession: Send {
    /// Only `InsufficientBalance` is returned as an error; every other
    /// failure is logged and reported as [`ActionOutcome::Failed`].
    async fn perform(&mut self, action: &TradeAction) -> Result<ActionOutcome, SwapError>;
}

pub struct TradeBot<C, R> {
    connector: C,
    executor: SwapExecutor,
    retry: RetryConfig,
    leg_pause: Duration,
    explorer_tx_url: String,
    rng: R,
}

impl<C, R> TradeBot<C, R>
where
    C: ChainConnector,
    R: Rng + Send,
{
    pub fn new(
        connector: C,
        executor: SwapExecutor,
        retry: RetryConfig,
        leg_pause: Duration,
        explorer_tx_url: impl Into<String>,
        rng: R,
    ) -> Self {
        Self {
            connector,
            executor,
            retry,
            leg_pause,
            explorer_tx_url: explorer_tx_url.into(),
            rng,
        }
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Forward leg, pause, reverse leg.
    pub async fn round_trip(&mut self, pair: &TradePair) -> Result<(), SwapError> {
        let forward = TradeIntent::forward(pair, &mut self.rng);
        self.swap_leg(&forward).await?;

        tokio::time::sleep(self.leg_pause).await;

        let reverse = TradeIntent::reverse(pair, &mut self.rng);
        self.swap_leg(&reverse).await?;
        Ok(())
    }

    async fn swap_leg(&mut self, intent: &TradeIntent) -> Result<SwapResult, SwapError> {
        info!(
            "Swapping {} {} -> {}",
            crate::executor::format_amount(intent.amount),
            intent.from.symbol,
            intent.to.symbol
        );
        let chain = self.connector.chain();
        let result = self.executor.execute(chain, intent).await?;
        info!(
            kind = "success",
            "Swap {} -> {} confirmed | status: {} | amount: {} | tx: {:?}",
            intent.from.symbol,
            intent.to.symbol,
            if result.success { "success" } else { "failed" },
            result.amount,
            result.tx_hash
        );
        info!(
            kind = "success",
            "Explorer: {}{:?}",
            self.explorer_tx_url,
            result.tx_hash
        );
        Ok(result)
    }

    /// Retries the whole round trip while the node reports a full mempool,
    /// moving to the next RPC endpoint once per retry.
    async fn round_trip_with_rotation(
        &mut self,
        pair: &TradePair,
    ) -> Result<ActionOutcome, SwapError> {
        let mut retries = 0u32;
        loop {
            let err = match self.round_trip(pair).await {
                Ok(()) => return Ok(ActionOutcome::Completed),
                Err(e) => e,
            };

            if err.is_insufficient_balance() {
                return Err(err);
            }

            if !err.is_mempool_full() {
                error!("{} round trip failed: {}", pair, err);
                return Ok(ActionOutcome::Failed);
            }

            if retries >= self.retry.max_retries {
                error!(
                    "{} round trip gave up after {} congestion retries: {}",
                    pair, retries, err
                );
                return Ok(ActionOutcome::Failed);
            }

            warn!(
                "Mempool full on {}, switching RPC ({}/{})",
                self.connector.current_endpoint(),
                retries + 1,
                self.retry.max_retries
            );
            if let Err(e) = self.connector.rotate() {
                error!("Failed to switch RPC: {:#}", e);
                return Ok(ActionOutcome::Failed);
            }
            info!(
                kind = "success",
                "Switched RPC to {}",
                self.connector.current_endpoint()
            );

            tokio::time::sleep(self.retry.delay_for(retries)).await;
            retries += 1;
        }
    }
}

#[async_trait]
impl<C, R> TradeSession for TradeBot<C, R>
where
    C: ChainConnector,
    R: Rng + Send,
{
    async fn perform(&mut self, action: &TradeAction) -> Result<ActionOutcome, SwapError> {
        match action {
            TradeAction::NoOp => {
                info!("No-op this round");
                Ok(ActionOutcome::Skipped)
            }
            TradeAction::RoundTrip(pair) => {
                info!("Round trip {}", pair);
                self.round_trip_with_rotation(pair).await
            }
        }
    }
}
