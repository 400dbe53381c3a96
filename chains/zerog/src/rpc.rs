use crate::chain::{EthersChain, SwapChain};
use anyhow::{Context, Result};
use core_logic::{ProxyEndpoint, RpcManager};
use ethers::prelude::*;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Owns the chain client of one account and can move it to the next RPC URL.
pub trait ChainConnector: Send {
    type Chain: SwapChain;

    fn chain(&self) -> &Self::Chain;

    fn current_endpoint(&self) -> &str;

    /// Switches to the next endpoint and rebuilds the client behind the same proxy.
    fn rotate(&mut self) -> Result<()>;
}

pub struct RpcClient {
    manager: RpcManager,
    wallet: LocalWallet,
    proxy: Option<ProxyEndpoint>,
    timeout: Duration,
    chain: EthersChain,
}

impl RpcClient {
    pub fn connect(
        manager: RpcManager,
        wallet: LocalWallet,
        proxy: Option<ProxyEndpoint>,
        timeout: Duration,
    ) -> Result<Self> {
        let chain = Self::build_chain(&manager, &wallet, proxy.as_ref(), timeout)?;
        Ok(Self {
            manager,
            wallet,
            proxy,
            timeout,
            chain,
        })
    }

    fn build_chain(
        manager: &RpcManager,
        wallet: &LocalWallet,
        proxy: Option<&ProxyEndpoint>,
        timeout: Duration,
    ) -> Result<EthersChain> {
        let mut client_builder = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10));
        if let Some(endpoint) = proxy {
            client_builder = client_builder.proxy(endpoint.to_reqwest()?);
        }
        let client = client_builder
            .build()
            .context("Failed to build HTTP client")?;

        let url: Url = manager.current().parse().context("Invalid RPC URL")?;
        debug!(
            "RPC {} ({}/{}) via {}",
            url,
            manager.index() + 1,
            manager.endpoints_count(),
            proxy.map_or_else(|| "local IP".to_string(), |p| p.to_string())
        );

        let provider = Provider::new(Http::new_with_client(url, client));
        EthersChain::new(provider, wallet.clone(), manager.chain_id())
    }

    pub fn proxy(&self) -> Option<&ProxyEndpoint> {
        self.proxy.as_ref()
    }
}

impl ChainConnector for RpcClient {
    type Chain = EthersChain;

    fn chain(&self) -> &EthersChain {
        &self.chain
    }

    fn current_endpoint(&self) -> &str {
        self.manager.current()
    }

    fn rotate(&mut self) -> Result<()> {
        self.manager.rotate();
        self.chain = Self::build_chain(
            &self.manager,
            &self.wallet,
            self.proxy.as_ref(),
            self.timeout,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn client(urls: &[&str], proxy: Option<&str>) -> Result<RpcClient> {
        let urls: Vec<String> = urls.iter().map(|s| s.to_string()).collect();
        let manager = RpcManager::new(16600, &urls)?;
        RpcClient::connect(
            manager,
            KEY.parse().unwrap(),
            proxy.map(ProxyEndpoint::new),
            Duration::from_secs(5),
        )
    }

    #[test]
    fn test_rotate_moves_to_next_endpoint() {
        let mut rpc = client(&["https://a.example", "https://b.example"], None).unwrap();
        assert_eq!(rpc.current_endpoint(), "https://a.example");
        rpc.rotate().unwrap();
        assert_eq!(rpc.current_endpoint(), "https://b.example");
        rpc.rotate().unwrap();
        assert_eq!(rpc.current_endpoint(), "https://a.example");
    }

    #[test]
    fn test_rotate_keeps_proxy() {
        let mut rpc = client(&["https://a.example"], Some("http://127.0.0.1:8080")).unwrap();
        rpc.rotate().unwrap();
        assert_eq!(rpc.proxy().unwrap().as_str(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_malformed_proxy_is_rejected() {
        assert!(client(&["https://a.example"], Some("ftp://127.0.0.1:21")).is_err());
    }
}
