#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use core_logic::{IpProbe, NetworkError, ProxyEndpoint, ProxyPool, RetryConfig};
use ethers::types::{Address, TxHash, U256};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use zerog_project::{
    ActionSelector, ChainConnector, Confirmation, ExecutorSettings, SwapChain, SwapExecutor,
    SwapParams, TradeAction, TradeBot, TradePair, TxOverrides, ZeroGConfig,
};

pub const MEMPOOL_FULL: &str = "(code: -32000, message: mempool is full, data: None)";
pub const REVERTED: &str = "execution reverted: STF";

#[derive(Debug, Clone)]
pub enum Submission {
    Approve {
        token: Address,
        spender: Address,
        amount: U256,
        overrides: TxOverrides,
    },
    Swap {
        router: Address,
        params: SwapParams,
        overrides: TxOverrides,
    },
}

impl Submission {
    pub fn nonce(&self) -> U256 {
        match self {
            Submission::Approve { overrides, .. } | Submission::Swap { overrides, .. } => {
                overrides.nonce
            }
        }
    }

    pub fn is_swap(&self) -> bool {
        matches!(self, Submission::Swap { .. })
    }
}

#[derive(Default)]
struct ChainState {
    balances: HashMap<Address, U256>,
    submissions: Vec<Submission>,
    swap_errors: VecDeque<String>,
    revert_all: bool,
}

/// In-memory chain that records every accepted submission.
#[derive(Clone)]
pub struct FakeChain {
    address: Address,
    state: Arc<Mutex<ChainState>>,
}

impl FakeChain {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            state: Arc::new(Mutex::new(ChainState::default())),
        }
    }

    /// Enough of every configured token for any number of round trips.
    pub fn funded(address: Address) -> Self {
        let chain = Self::new(address);
        let contracts = contracts();
        for token in [contracts.usdt, contracts.eth, contracts.btc] {
            chain.set_balance(token.address, U256::exp10(21));
        }
        chain
    }

    pub fn set_balance(&self, token: Address, amount: U256) {
        self.state.lock().unwrap().balances.insert(token, amount);
    }

    /// The next `times` swap submissions fail with `message`.
    pub fn fail_swaps_with(&self, message: &str, times: usize) {
        let mut state = self.state.lock().unwrap();
        for _ in 0..times {
            state.swap_errors.push_back(message.to_string());
        }
    }

    pub fn revert_all(&self) {
        self.state.lock().unwrap().revert_all = true;
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.state.lock().unwrap().submissions.clone()
    }

    pub fn swap_count(&self) -> usize {
        self.submissions().iter().filter(|s| s.is_swap()).count()
    }

    pub fn approve_count(&self) -> usize {
        self.submissions().iter().filter(|s| !s.is_swap()).count()
    }
}

fn hash_for(index: usize) -> TxHash {
    TxHash::from_low_u64_be(index as u64 + 1)
}

#[async_trait]
impl SwapChain for FakeChain {
    fn address(&self) -> Address {
        self.address
    }

    async fn token_balance(&self, token: Address) -> Result<U256> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .balances
            .get(&token)
            .copied()
            .unwrap_or_default())
    }

    async fn pending_nonce(&self) -> Result<U256> {
        Ok(U256::from(self.state.lock().unwrap().submissions.len()))
    }

    async fn gas_price(&self) -> Result<U256> {
        Ok(U256::exp10(9))
    }

    async fn submit_approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
        overrides: TxOverrides,
    ) -> Result<TxHash> {
        let mut state = self.state.lock().unwrap();
        state.submissions.push(Submission::Approve {
            token,
            spender,
            amount,
            overrides,
        });
        Ok(hash_for(state.submissions.len()))
    }

    async fn estimate_swap_gas(&self, _router: Address, _params: &SwapParams) -> Result<U256> {
        Ok(U256::from(200_000))
    }

    async fn submit_swap(
        &self,
        router: Address,
        params: &SwapParams,
        overrides: TxOverrides,
    ) -> Result<TxHash> {
        let mut state = self.state.lock().unwrap();
        if let Some(message) = state.swap_errors.pop_front() {
            return Err(anyhow!(message));
        }
        state.submissions.push(Submission::Swap {
            router,
            params: params.clone(),
            overrides,
        });
        Ok(hash_for(state.submissions.len()))
    }

    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> Result<Confirmation> {
        let revert_all = self.state.lock().unwrap().revert_all;
        Ok(Confirmation {
            tx_hash,
            success: !revert_all,
            block_number: Some(1),
        })
    }
}

/// Connector over a [`FakeChain`] that counts rotations.
pub struct FakeConnector {
    chain: FakeChain,
    endpoints: Vec<String>,
    index: usize,
    rotations: Arc<AtomicUsize>,
}

impl FakeConnector {
    pub fn new(chain: FakeChain) -> Self {
        Self {
            chain,
            endpoints: vec![
                "https://rpc-a.example".to_string(),
                "https://rpc-b.example".to_string(),
            ],
            index: 0,
            rotations: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_counter(chain: FakeChain, rotations: Arc<AtomicUsize>) -> Self {
        Self {
            rotations,
            ..Self::new(chain)
        }
    }

    pub fn rotations(&self) -> usize {
        self.rotations.load(Ordering::SeqCst)
    }
}

impl ChainConnector for FakeConnector {
    type Chain = FakeChain;

    fn chain(&self) -> &FakeChain {
        &self.chain
    }

    fn current_endpoint(&self) -> &str {
        &self.endpoints[self.index]
    }

    fn rotate(&mut self) -> Result<()> {
        self.index = (self.index + 1) % self.endpoints.len();
        self.rotations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Always answers with the same action.
pub struct FixedSelector(pub TradeAction);

impl ActionSelector for FixedSelector {
    fn next_action(&mut self) -> TradeAction {
        self.0.clone()
    }
}

/// Probe that reports a local IP and rejects every proxy.
pub struct LocalOnlyProbe;

#[async_trait]
impl IpProbe for LocalOnlyProbe {
    async fn probe(&self, proxy: Option<&ProxyEndpoint>) -> Result<String, NetworkError> {
        match proxy {
            None => Ok("203.0.113.1".to_string()),
            Some(p) => Err(NetworkError::ConnectionRefused {
                endpoint: p.to_string(),
                reason: "unreachable".to_string(),
            }),
        }
    }
}

pub fn empty_pool() -> ProxyPool {
    ProxyPool::new(Vec::new(), Box::new(LocalOnlyProbe))
}

pub fn contracts() -> zerog_project::Contracts {
    ZeroGConfig::default().contracts().unwrap()
}

pub fn eth_pair() -> TradePair {
    contracts().usdt_eth()
}

pub fn instant_executor() -> SwapExecutor {
    let config = ZeroGConfig {
        settle_delay_secs: 0,
        ..Default::default()
    };
    SwapExecutor::new(ExecutorSettings::from_config(&config, contracts().router))
}

pub fn instant_retry(max_retries: u32) -> RetryConfig {
    RetryConfig::new(max_retries, 0).without_jitter()
}

pub fn bot(connector: FakeConnector, max_retries: u32) -> TradeBot<FakeConnector, StdRng> {
    TradeBot::new(
        connector,
        instant_executor(),
        instant_retry(max_retries),
        Duration::ZERO,
        "https://explorer.example/tx/",
        StdRng::seed_from_u64(3),
    )
}
