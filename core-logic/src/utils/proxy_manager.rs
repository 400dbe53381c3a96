use crate::config::ProxyEndpoint;
use crate::error::NetworkError;
use async_trait::async_trait;
use rand::Rng;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Answers "what is my public IP" through an optional proxy.
#[async_trait]
pub trait IpProbe: Send + Sync {
    async fn probe(&self, proxy: Option<&ProxyEndpoint>) -> Result<String, NetworkError>;
}

#[derive(Deserialize)]
struct IpEcho {
    ip: String,
}

/// Probe backed by api.ipify.org.
#[derive(Debug, Clone)]
pub struct IpifyProbe {
    endpoint: String,
    timeout: Duration,
}

impl Default for IpifyProbe {
    fn default() -> Self {
        Self::new(Self::ENDPOINT, Duration::from_secs(5))
    }
}

impl IpifyProbe {
    pub const ENDPOINT: &'static str = "https://api.ipify.org?format=json";

    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout,
        }
    }

    fn client(&self, proxy: Option<&ProxyEndpoint>) -> Result<reqwest::Client, NetworkError> {
        let mut builder = reqwest::Client::builder().timeout(self.timeout);
        if let Some(endpoint) = proxy {
            builder = builder.proxy(endpoint.to_reqwest()?);
        }
        builder.build().map_err(|e| NetworkError::ConnectionRefused {
            endpoint: self.endpoint.clone(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl IpProbe for IpifyProbe {
    async fn probe(&self, proxy: Option<&ProxyEndpoint>) -> Result<String, NetworkError> {
        let client = self.client(proxy)?;

        let response = client.get(&self.endpoint).send().await.map_err(|e| {
            if e.is_timeout() {
                NetworkError::Timeout {
                    timeout_ms: self.timeout.as_millis() as u64,
                    endpoint: self.endpoint.clone(),
                }
            } else {
                NetworkError::ConnectionRefused {
                    endpoint: self.endpoint.clone(),
                    reason: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::HttpError {
                status_code: status.as_u16(),
                endpoint: self.endpoint.clone(),
            });
        }

        let echo: IpEcho = response
            .json()
            .await
            .map_err(|e| NetworkError::InvalidResponse {
                endpoint: self.endpoint.clone(),
                reason: e.to_string(),
            })?;

        Ok(echo.ip)
    }
}

/// Read-only list of proxies loaded once at startup.
pub struct ProxyPool {
    proxies: Vec<ProxyEndpoint>,
    probe: Box<dyn IpProbe>,
}

impl ProxyPool {
    pub const PROXY_FILE: &'static str = "proxy.txt";

    pub fn new(proxies: Vec<ProxyEndpoint>, probe: Box<dyn IpProbe>) -> Self {
        Self { proxies, probe }
    }

    /// Loads proxies from `path`, one URI per line.
    ///
    /// Never fails: a missing or empty file leaves the pool empty and every
    /// account runs on the local IP.
    pub fn load(path: impl AsRef<Path>, probe: Box<dyn IpProbe>) -> Self {
        let path = path.as_ref();

        let proxies = match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(e) => {
                warn!(
                    "Failed to load proxies from {}: {}. Running without proxies.",
                    path.display(),
                    e
                );
                return Self::new(Vec::new(), probe);
            }
        };

        if proxies.is_empty() {
            warn!("{} is empty. Running without proxies.", path.display());
        } else {
            info!(kind = "success", "Loaded {} proxies from {}", proxies.len(), path.display());
        }

        Self::new(proxies, probe)
    }

    pub fn parse(content: &str) -> Vec<ProxyEndpoint> {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(ProxyEndpoint::new)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    pub fn proxies(&self) -> &[ProxyEndpoint] {
        &self.proxies
    }

    /// Picks a working proxy for one account.
    ///
    /// Makes at most `len()` random picks; a pick that cannot be built or
    /// does not answer the probe counts as one attempt. Returns `None` for
    /// direct mode, either because the pool is empty or every attempt failed.
    pub async fn acquire<R>(&self, rng: &mut R) -> Option<ProxyEndpoint>
    where
        R: Rng + ?Sized,
    {
        if self.proxies.is_empty() {
            match self.probe.probe(None).await {
                Ok(ip) => debug!("No proxy, using local IP: {}", ip),
                Err(e) => warn!("No proxy and local IP probe failed: {}", e),
            }
            return None;
        }

        let mut attempts = 0;
        while attempts < self.proxies.len() {
            attempts += 1;
            let candidate = &self.proxies[rng.gen_range(0..self.proxies.len())];

            if let Err(e) = candidate.parse() {
                error!("Cannot use proxy: {}", e);
                continue;
            }

            match self.probe.probe(Some(candidate)).await {
                Ok(ip) => {
                    info!(kind = "success", "Using proxy IP: {}", ip);
                    return Some(candidate.clone());
                }
                Err(e) => {
                    error!("Proxy {} unusable: {}", candidate, e);
                }
            }
        }

        warn!(
            "All {} proxy attempts failed, falling back to local IP",
            attempts
        );
        None
    }
}
