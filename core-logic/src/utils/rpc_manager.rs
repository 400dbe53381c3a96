//! # Core Logic - RPC Manager
//!
//! Fixed, ordered list of RPC endpoints with a current index. Rotation is
//! explicit: callers advance it when they recognize a condition that another
//! endpoint might not have (for example a full mempool).

use crate::error::ConfigError;
use url::Url;

#[derive(Debug, Clone)]
pub struct RpcManager {
    chain_id: u64,
    urls: Vec<String>,
    current_index: usize,
}

impl RpcManager {
    /// Create a new RPC manager with the given chain ID and URLs
    pub fn new(chain_id: u64, urls: &[String]) -> Result<Self, ConfigError> {
        if urls.is_empty() {
            return Err(ConfigError::MissingField {
                field: "rpc_urls".to_string(),
            });
        }

        for url in urls {
            Url::parse(url).map_err(|_| ConfigError::InvalidRpcUrl { url: url.clone() })?;
        }

        Ok(Self {
            chain_id,
            urls: urls.to_vec(),
            current_index: 0,
        })
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Currently active endpoint
    pub fn current(&self) -> &str {
        &self.urls[self.current_index]
    }

    /// Advances to the next endpoint, wrapping around. With a single URL
    /// the active endpoint stays the same.
    pub fn rotate(&mut self) -> &str {
        self.current_index = (self.current_index + 1) % self.urls.len();
        self.current()
    }

    pub fn index(&self) -> usize {
        self.current_index
    }

    pub fn endpoints_count(&self) -> usize {
        self.urls.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_rotate_wraps_around() {
        let mut manager =
            RpcManager::new(16600, &urls(&["https://a.example", "https://b.example"])).unwrap();
        assert_eq!(manager.current(), "https://a.example");
        assert_eq!(manager.rotate(), "https://b.example");
        assert_eq!(manager.rotate(), "https://a.example");
        assert_eq!(manager.index(), 0);
    }

    #[test]
    fn test_single_endpoint_rotation_is_stable() {
        let mut manager = RpcManager::new(16600, &urls(&["https://only.example"])).unwrap();
        manager.rotate();
        assert_eq!(manager.current(), "https://only.example");
    }

    #[test]
    fn test_rejects_empty_and_invalid_lists() {
        assert!(matches!(
            RpcManager::new(1, &[]),
            Err(ConfigError::MissingField { .. })
        ));
        assert!(matches!(
            RpcManager::new(1, &urls(&["not a url"])),
            Err(ConfigError::InvalidRpcUrl { .. })
        ));
    }
}
