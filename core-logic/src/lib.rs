//! # Core Logic - Shared Utilities for Testnet Bots
//!
//! Chain-agnostic building blocks used by the bots under `chains/`.
//!
//! ## Modules
//!
//! - [`config`] - Proxy endpoint value types
//! - [`error`] - Typed error handling with thiserror
//! - `utils` - Logger, key file loading, proxy pool, RPC rotation, retry policy

// Module declarations - internal modules marked pub(crate)
pub mod config;
pub mod error;
pub(crate) mod utils;

// Selective exports - only public API types
pub use config::{ProxyEndpoint, ProxyScheme};
pub use error::{ConfigError, CoreError, NetworkError, WalletError};

// Utils are pub(crate) - only export specific public utilities
pub use utils::{
    is_mempool_full, render_line, setup_logger, FileFormatter, IpProbe, IpifyProbe, LogKind,
    ProxyPool, RawKey, RetryConfig, RpcManager, TerminalFormatter, WalletManager, ACCOUNT_SPAN,
};
