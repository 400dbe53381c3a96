use crate::account::Account;
use crate::config::{Contracts, ZeroGConfig};
use crate::executor::{ExecutorSettings, SwapExecutor};
use crate::rpc::{ChainConnector, RpcClient};
use crate::runner::SessionFactory;
use crate::trade::TradeBot;
use anyhow::Result;
use async_trait::async_trait;
use core_logic::{ProxyEndpoint, RpcManager};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

/// Opens a [`TradeBot`] over the 0G RPC endpoints for each account.
pub struct ZeroGSessions {
    config: ZeroGConfig,
    contracts: Contracts,
}

impl ZeroGSessions {
    pub fn new(config: ZeroGConfig) -> Result<Self> {
        let contracts = config.contracts()?;
        Ok(Self { config, contracts })
    }

    pub fn contracts(&self) -> &Contracts {
        &self.contracts
    }
}

#[async_trait]
impl SessionFactory for ZeroGSessions {
    type Session = TradeBot<RpcClient, StdRng>;

    async fn open(&self, account: &Account, proxy: Option<ProxyEndpoint>) -> Result<Self::Session> {
        let manager = RpcManager::new(self.config.chain_id, &self.config.rpc_urls)?;
        let rpc = RpcClient::connect(
            manager,
            account.wallet().clone(),
            proxy,
            self.config.rpc_timeout(),
        )?;
        debug!("Session bound to {}", rpc.current_endpoint());

        let executor = SwapExecutor::new(ExecutorSettings::from_config(
            &self.config,
            self.contracts.router,
        ));

        Ok(TradeBot::new(
            rpc,
            executor,
            self.config.mempool_retry.clone(),
            self.config.leg_pause(),
            self.config.explorer_tx_url.clone(),
            StdRng::from_entropy(),
        ))
    }
}
