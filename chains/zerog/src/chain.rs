//! On-chain capability interface used by the swap executor, and its
//! `ethers` implementation.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use ethers::abi::{self, Token};
use ethers::prelude::*;
use ethers::types::transaction::eip2718::TypedTransaction;
use std::sync::Arc;
use std::time::Duration;

ethers::contract::abigen!(
    IERC20,
    r#"[
        function approve(address spender, uint256 amount) external returns (bool)
        function balanceOf(address owner) external view returns (uint256)
    ]"#
);

const SWAP_ROUTER_ABI: &str = r#"[
    {"type":"function","name":"exactInputSingle","stateMutability":"payable",
     "inputs":[{"name":"params","type":"tuple","components":[
        {"name":"tokenIn","type":"address"},
        {"name":"tokenOut","type":"address"},
        {"name":"fee","type":"uint24"},
        {"name":"recipient","type":"address"},
        {"name":"deadline","type":"uint256"},
        {"name":"amountIn","type":"uint256"},
        {"name":"amountOutMinimum","type":"uint256"},
        {"name":"sqrtPriceLimitX96","type":"uint160"}]}],
     "outputs":[{"name":"amountOut","type":"uint256"}]}
]"#;

/// Arguments of `exactInputSingle`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapParams {
    pub token_in: Address,
    pub token_out: Address,
    pub fee: u32,
    pub recipient: Address,
    pub deadline: U256,
    pub amount_in: U256,
    pub amount_out_minimum: U256,
    pub sqrt_price_limit_x96: U256,
}

impl SwapParams {
    fn into_tokens(self) -> Vec<Token> {
        vec![Token::Tuple(vec![
            Token::Address(self.token_in),
            Token::Address(self.token_out),
            Token::Uint(U256::from(self.fee)),
            Token::Address(self.recipient),
            Token::Uint(self.deadline),
            Token::Uint(self.amount_in),
            Token::Uint(self.amount_out_minimum),
            Token::Uint(self.sqrt_price_limit_x96),
        ])]
    }
}

/// Explicit fee and ordering fields of a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxOverrides {
    pub nonce: U256,
    pub gas_price: U256,
    pub gas_limit: U256,
}

/// Mined receipt summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmation {
    pub tx_hash: TxHash,
    pub success: bool,
    pub block_number: Option<u64>,
}

/// Everything a swap needs from the network.
#[async_trait]
pub trait SwapChain: Send + Sync {
    /// Address that signs and receives.
    fn address(&self) -> Address;

    async fn token_balance(&self, token: Address) -> Result<U256>;

    async fn pending_nonce(&self) -> Result<U256>;

    async fn gas_price(&self) -> Result<U256>;

    async fn submit_approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
        overrides: TxOverrides,
    ) -> Result<TxHash>;

    async fn estimate_swap_gas(&self, router: Address, params: &SwapParams) -> Result<U256>;

    async fn submit_swap(
        &self,
        router: Address,
        params: &SwapParams,
        overrides: TxOverrides,
    ) -> Result<TxHash>;

    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> Result<Confirmation>;
}

pub type SignerClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// [`SwapChain`] over an HTTP provider with a local signer.
#[derive(Clone)]
pub struct EthersChain {
    client: Arc<SignerClient>,
    router_abi: abi::Abi,
}

impl EthersChain {
    pub fn new(provider: Provider<Http>, wallet: LocalWallet, chain_id: u64) -> Result<Self> {
        let router_abi: abi::Abi =
            serde_json::from_str(SWAP_ROUTER_ABI).context("Invalid router ABI")?;
        let client = SignerMiddleware::new(provider, wallet.with_chain_id(chain_id));

        Ok(Self {
            client: Arc::new(client),
            router_abi,
        })
    }

    fn encode_swap(&self, params: &SwapParams) -> Result<Bytes> {
        let function = self
            .router_abi
            .function("exactInputSingle")
            .context("exactInputSingle missing from router ABI")?;
        let data = function
            .encode_input(&params.clone().into_tokens())
            .context("Failed to encode exactInputSingle")?;
        Ok(data.into())
    }

    fn swap_request(&self, router: Address, params: &SwapParams) -> Result<TransactionRequest> {
        Ok(TransactionRequest::new()
            .from(self.address())
            .to(router)
            .data(self.encode_swap(params)?))
    }
}

#[async_trait]
impl SwapChain for EthersChain {
    fn address(&self) -> Address {
        self.client.address()
    }

    async fn token_balance(&self, token: Address) -> Result<U256> {
        IERC20::new(token, self.client.clone())
            .balance_of(self.address())
            .call()
            .await
            .with_context(|| format!("Failed to read balance of token {:?}", token))
    }

    async fn pending_nonce(&self) -> Result<U256> {
        self.client
            .get_transaction_count(self.address(), Some(BlockNumber::Pending.into()))
            .await
            .context("Failed to fetch pending nonce")
    }

    async fn gas_price(&self) -> Result<U256> {
        self.client
            .get_gas_price()
            .await
            .context("Failed to fetch gas price")
    }

    async fn submit_approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
        overrides: TxOverrides,
    ) -> Result<TxHash> {
        let contract = IERC20::new(token, self.client.clone());
        let call = contract
            .approve(spender, amount)
            .legacy()
            .nonce(overrides.nonce)
            .gas(overrides.gas_limit)
            .gas_price(overrides.gas_price);

        let pending = call.send().await.context("Failed to submit approve")?;
        Ok(pending.tx_hash())
    }

    async fn estimate_swap_gas(&self, router: Address, params: &SwapParams) -> Result<U256> {
        let tx: TypedTransaction = self.swap_request(router, params)?.into();
        self.client
            .estimate_gas(&tx, None)
            .await
            .context("Failed to estimate swap gas")
    }

    async fn submit_swap(
        &self,
        router: Address,
        params: &SwapParams,
        overrides: TxOverrides,
    ) -> Result<TxHash> {
        let tx = self
            .swap_request(router, params)?
            .nonce(overrides.nonce)
            .gas(overrides.gas_limit)
            .gas_price(overrides.gas_price);

        let pending = self
            .client
            .send_transaction(tx, None)
            .await
            .context("Failed to submit swap")?;
        Ok(pending.tx_hash())
    }

    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> Result<Confirmation> {
        let receipt = PendingTransaction::new(tx_hash, self.client.provider())
            .interval(Duration::from_secs(2))
            .await
            .with_context(|| format!("Failed waiting for {:?}", tx_hash))?
            .ok_or_else(|| anyhow!("Transaction {:?} was dropped from the mempool", tx_hash))?;

        Ok(Confirmation {
            tx_hash: receipt.transaction_hash,
            success: receipt.status == Some(U64::from(1)),
            block_number: receipt.block_number.map(|n| n.as_u64()),
        })
    }
}
