use anyhow::{anyhow, Result};
use core_logic::{RawKey, WalletManager};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::Address;
use std::fmt;
use std::path::Path;

/// One wallet from the key file. Only the address is ever displayed.
#[derive(Clone)]
pub struct Account {
    wallet: LocalWallet,
}

impl Account {
    pub fn from_key(key: &RawKey, line_no: usize) -> Result<Self> {
        let wallet = key
            .expose()
            .parse::<LocalWallet>()
            .map_err(|_| anyhow!("Key #{} is not a valid secp256k1 private key", line_no))?;
        Ok(Self { wallet })
    }

    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    pub fn wallet(&self) -> &LocalWallet {
        &self.wallet
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.address())
            .finish()
    }
}

/// Reads the key file and derives one account per key.
pub fn load_accounts(path: impl AsRef<Path>) -> Result<Vec<Account>> {
    let manager = WalletManager::load(path)?;
    manager
        .keys()
        .iter()
        .enumerate()
        .map(|(idx, key)| Account::from_key(key, idx + 1))
        .collect()
}

/// 1-based `index/total` position of an account within a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountTag {
    pub index: usize,
    pub total: usize,
}

impl AccountTag {
    pub fn new(zero_based: usize, total: usize) -> Self {
        Self {
            index: zero_based + 1,
            total,
        }
    }
}

impl fmt::Display for AccountTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.index, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    #[test]
    fn test_accounts_derive_addresses() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0x{}\n\n", KEY).unwrap();

        let accounts = load_accounts(file.path()).unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].address(), ADDRESS.parse::<Address>().unwrap());
    }

    #[test]
    fn test_debug_shows_address_only() {
        let keys = WalletManager::parse(KEY).unwrap();
        let account = Account::from_key(&keys[0], 1).unwrap();
        let shown = format!("{:?}", account);
        assert!(shown.contains("address"));
        assert!(!shown.contains(&KEY[..16]));
    }

    #[test]
    fn test_tag_is_one_based() {
        assert_eq!(AccountTag::new(0, 2).to_string(), "1/2");
        assert_eq!(AccountTag::new(1, 2).to_string(), "2/2");
    }
}
