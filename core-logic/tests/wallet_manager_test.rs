use core_logic::{ConfigError, CoreError, WalletError, WalletManager};
use std::io::Write;

const KEYS: [&str; 3] = [
    "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
    "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
    "5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a",
];

#[test]
fn test_account_count_matches_non_blank_lines() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "{}", KEYS[0]).unwrap();
    writeln!(file).unwrap();
    writeln!(file, "{}", KEYS[1]).unwrap();
    writeln!(file, "   ").unwrap();
    write!(file, "{}", KEYS[2]).unwrap();

    let manager = WalletManager::load(file.path()).unwrap();
    assert_eq!(manager.count(), 3);
    assert!(manager.get(2).is_ok());
    assert!(matches!(
        manager.get(3),
        Err(WalletError::NotFound { index: 3, total: 3 })
    ));
}

#[test]
fn test_missing_key_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err = WalletManager::load(dir.path().join("privatekey.txt"))
        .err()
        .unwrap();
    assert!(matches!(
        err,
        CoreError::Config(ConfigError::FileNotFound { .. })
    ));
}

#[test]
fn test_empty_key_file_is_reported() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "\n\n").unwrap();

    let err = WalletManager::load(file.path()).err().unwrap();
    assert!(matches!(err, CoreError::Wallet(WalletError::Empty { .. })));
}
