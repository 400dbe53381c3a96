use crate::trade::{Token, TradePair};
use anyhow::{Context, Result};
use config::{Config, File};
use core_logic::{ConfigError, RetryConfig};
use ethers::types::{Address, U256};
use serde::Deserialize;
use std::time::Duration;

/// Runtime settings. Every field has a 0G Newton testnet default, so the
/// optional TOML file only needs the values it overrides.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ZeroGConfig {
    pub rpc_urls: Vec<String>,
    pub chain_id: u64,
    pub router: String,
    pub usdt: String,
    pub eth: String,
    pub btc: String,
    pub explorer_tx_url: String,
    pub ip_probe_url: String,
    pub probe_timeout_secs: u64,
    pub rpc_timeout_secs: u64,
    pub pool_fee: u32,
    pub approve_gas_limit: u64,
    pub gas_multiplier_percent: u64,
    pub swap_deadline_secs: u64,
    pub settle_delay_secs: u64,
    pub leg_pause_secs: u64,
    pub pass_interval_hours: u64,
    pub key_file: String,
    pub proxy_file: String,
    pub mempool_retry: RetryConfig,
}

impl Default for ZeroGConfig {
    fn default() -> Self {
        Self {
            rpc_urls: vec!["https://evmrpc-testnet.0g.ai".to_string()],
            chain_id: 16600,
            router: "0xD86b764618c6E3C078845BE3c3fCe50CE9535Da7".to_string(),
            usdt: "0x9A87C2412d500343c073E5Ae5394E3bE3874F76b".to_string(),
            eth: "0xce830D0905e0f7A9b300401729761579c5FB6bd6".to_string(),
            btc: "0x1e0d871472973c562650e991ed8006549f8cbefc".to_string(),
            explorer_tx_url: "https://chainscan-newton.0g.ai/tx/".to_string(),
            ip_probe_url: core_logic::IpifyProbe::ENDPOINT.to_string(),
            probe_timeout_secs: 5,
            rpc_timeout_secs: 30,
            pool_fee: 3000,
            approve_gas_limit: 100_000,
            gas_multiplier_percent: 120,
            swap_deadline_secs: 300,
            settle_delay_secs: 5,
            leg_pause_secs: 5,
            pass_interval_hours: 24,
            key_file: core_logic::WalletManager::PV_FILE.to_string(),
            proxy_file: core_logic::ProxyPool::PROXY_FILE.to_string(),
            mempool_retry: RetryConfig::default(),
        }
    }
}

/// Parsed contract addresses.
#[derive(Debug, Clone)]
pub struct Contracts {
    pub router: Address,
    pub usdt: Token,
    pub eth: Token,
    pub btc: Token,
}

impl Contracts {
    pub fn usdt_eth(&self) -> TradePair {
        TradePair::new(self.usdt.clone(), self.eth.clone())
    }

    pub fn usdt_btc(&self) -> TradePair {
        TradePair::new(self.usdt.clone(), self.btc.clone())
    }
}

impl ZeroGConfig {
    /// Built-in defaults, overlaid with `path` when given.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let settings = Config::builder()
            .add_source(File::with_name(path))
            .build()
            .with_context(|| format!("Failed to read config {}", path))?;

        let config: Self = settings.try_deserialize().map_err(|e| anyhow::anyhow!(e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rpc_urls.is_empty() {
            return Err(ConfigError::MissingField {
                field: "rpc_urls".to_string(),
            });
        }
        if self.gas_multiplier_percent < 100 {
            return Err(ConfigError::InvalidValue {
                field: "gas_multiplier_percent".to_string(),
                reason: "must be at least 100".to_string(),
            });
        }
        Ok(())
    }

    pub fn contracts(&self) -> Result<Contracts, ConfigError> {
        Ok(Contracts {
            router: parse_address("router", &self.router)?,
            usdt: Token::new("USDT", parse_address("usdt", &self.usdt)?),
            eth: Token::new("ETH", parse_address("eth", &self.eth)?),
            btc: Token::new("BTC", parse_address("btc", &self.btc)?),
        })
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.settle_delay_secs)
    }

    pub fn leg_pause(&self) -> Duration {
        Duration::from_secs(self.leg_pause_secs)
    }

    pub fn swap_deadline(&self) -> Duration {
        Duration::from_secs(self.swap_deadline_secs)
    }

    pub fn pass_interval(&self) -> Duration {
        Duration::from_secs(self.pass_interval_hours * 60 * 60)
    }

    pub fn approve_gas_limit(&self) -> U256 {
        U256::from(self.approve_gas_limit)
    }
}

fn parse_address(field: &str, value: &str) -> Result<Address, ConfigError> {
    value.parse::<Address>().map_err(|e| ConfigError::InvalidValue {
        field: field.to_string(),
        reason: e.to_string(),
    })
}

/// Parses the daily transaction count typed at the prompt.
pub fn parse_tx_count(input: &str) -> Result<u32, ConfigError> {
    let invalid = || ConfigError::InvalidValue {
        field: "daily transaction count".to_string(),
        reason: format!("'{}' is not a positive integer", input.trim()),
    };

    let count: i64 = input.trim().parse().map_err(|_| invalid())?;
    if count <= 0 {
        return Err(invalid());
    }
    u32::try_from(count).map_err(|_| invalid())
}
