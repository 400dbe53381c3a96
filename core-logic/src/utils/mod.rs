//! # Utilities Module
//!
//! Internal utility modules for the core-logic crate.
//! These modules are marked as `pub(crate)` to enforce API boundaries.

pub(crate) mod logger;
pub(crate) mod proxy_manager;
pub(crate) mod retry;
pub(crate) mod rpc_manager;
pub(crate) mod wallet_manager;

// Selective exports - only public utilities
pub use logger::{
    render_line, setup_logger, FileFormatter, LogKind, TerminalFormatter, ACCOUNT_SPAN,
};
pub use proxy_manager::{IpProbe, IpifyProbe, ProxyPool};
pub use retry::{is_mempool_full, RetryConfig};
pub use rpc_manager::RpcManager;
pub use wallet_manager::{RawKey, WalletManager};
