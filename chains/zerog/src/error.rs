use ethers::types::TxHash;
use thiserror::Error;

/// Failure of one swap leg.
#[derive(Error, Debug)]
pub enum SwapError {
    #[error("Insufficient {symbol} balance: have {available}, need {requested}")]
    InsufficientBalance {
        symbol: String,
        available: String,
        requested: String,
    },

    #[error("Transaction {tx_hash:?} reverted")]
    Reverted { tx_hash: TxHash },

    #[error("{0:#}")]
    Chain(#[from] anyhow::Error),
}

impl SwapError {
    /// The node refused the transaction because its mempool is saturated.
    pub fn is_mempool_full(&self) -> bool {
        core_logic::is_mempool_full(self)
    }

    pub fn is_insufficient_balance(&self) -> bool {
        matches!(self, SwapError::InsufficientBalance { .. })
    }
}
