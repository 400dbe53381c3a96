use crate::error::{ConfigError, WalletError};
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A private key exactly as it appeared in the key file, minus an optional `0x`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct RawKey(String);

impl RawKey {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RawKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RawKey(***REDACTED***)")
    }
}

/// Plain-text key file loader (`privatekey.txt`).
pub struct WalletManager {
    keys: Vec<RawKey>,
}

impl WalletManager {
    pub const PV_FILE: &'static str = "privatekey.txt";

    /// Loads one key per non-blank line.
    ///
    /// A missing file or a file without keys is an error: the bot has nothing
    /// to do without accounts.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, crate::CoreError> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: display.clone(),
            },
            _ => ConfigError::IoError {
                path: display.clone(),
                msg: e.to_string(),
            },
        })?;

        let keys = Self::parse(&content)?;
        if keys.is_empty() {
            return Err(WalletError::Empty { path: display }.into());
        }

        Ok(Self { keys })
    }

    /// Validates every line as 32 bytes of hex.
    pub fn parse(content: &str) -> Result<Vec<RawKey>, WalletError> {
        let mut keys = Vec::new();

        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let hex = trimmed
                .strip_prefix("0x")
                .or_else(|| trimmed.strip_prefix("0X"))
                .unwrap_or(trimmed);

            if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(WalletError::InvalidKeyFormat { line: idx + 1 });
            }
            if hex.len() != 64 {
                return Err(WalletError::InvalidKeyLength {
                    line: idx + 1,
                    length: hex.len(),
                });
            }

            keys.push(RawKey(hex.to_string()));
        }

        Ok(keys)
    }

    /// Returns the number of available wallets
    pub fn count(&self) -> usize {
        self.keys.len()
    }

    pub fn get(&self, index: usize) -> Result<&RawKey, WalletError> {
        self.keys.get(index).ok_or(WalletError::NotFound {
            index,
            total: self.keys.len(),
        })
    }

    pub fn keys(&self) -> &[RawKey] {
        &self.keys
    }
}
