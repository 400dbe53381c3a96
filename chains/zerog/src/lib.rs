//! 0G testnet swap bot: per-account USDT round trips through the
//! single-hop swap router.

pub mod account;
pub mod chain;
pub mod config;
pub mod error;
pub mod executor;
pub mod rpc;
pub mod runner;
pub mod session;
pub mod trade;

pub use account::{load_accounts, Account, AccountTag};
pub use chain::{Confirmation, EthersChain, SwapChain, SwapParams, TxOverrides};
pub use config::{parse_tx_count, Contracts, ZeroGConfig};
pub use error::SwapError;
pub use executor::{ExecutorSettings, SwapExecutor, SwapResult};
pub use rpc::{ChainConnector, RpcClient};
pub use runner::{AccountRunner, RunState, Scheduler, SessionFactory};
pub use session::ZeroGSessions;
pub use trade::{
    ActionOutcome, ActionSelector, RandomSelector, Token, TradeAction, TradeBot, TradeIntent,
    TradePair, TradeSession,
};
