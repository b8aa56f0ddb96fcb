//! On-disk persistence for the vault and the account count.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::error::WalletError;
use crate::vault::Vault;

const VAULT_FILE: &str = "vault.json";
const ACCOUNTS_FILE: &str = "accounts";

/// File-backed storage for the two persisted wallet records.
///
/// The vault and the account count are independent records: importing
/// a vault replaces only the vault, and the count record survives. A
/// missing count reads as 1.
pub struct Store {
    dir: PathBuf,
}

impl Store {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, WalletError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| WalletError::Io(e.to_string()))?;
        Ok(Self { dir })
    }

    fn vault_path(&self) -> PathBuf {
        self.dir.join(VAULT_FILE)
    }

    fn accounts_path(&self) -> PathBuf {
        self.dir.join(ACCOUNTS_FILE)
    }

    /// Whether a vault record exists on disk.
    pub fn vault_exists(&self) -> bool {
        self.vault_path().exists()
    }

    /// Read the persisted vault.
    ///
    /// A malformed file reads as [`WalletError::Auth`]: on the unlock
    /// path a corrupted vault must be indistinguishable from a wrong
    /// password.
    pub fn read_vault(&self) -> Result<Vault, WalletError> {
        let data = match fs::read_to_string(self.vault_path()) {
            Ok(d) => d,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(WalletError::VaultMissing),
            Err(e) => return Err(WalletError::Io(e.to_string())),
        };
        serde_json::from_str(&data).map_err(|_| WalletError::Auth)
    }

    /// Replace the vault wholesale.
    pub fn write_vault(&self, vault: &Vault) -> Result<(), WalletError> {
        let json = vault.to_json()?;
        fs::write(self.vault_path(), json).map_err(|e| WalletError::Io(e.to_string()))
    }

    /// Read the persisted account count.
    ///
    /// Missing or unreadable records read as 1; the count only matters
    /// once a vault exists, and 1 is the floor it can never go below.
    pub fn read_account_count(&self) -> u32 {
        fs::read_to_string(self.accounts_path())
            .ok()
            .and_then(|s| s.trim().parse::<u32>().ok())
            .filter(|&n| n >= 1)
            .unwrap_or(1)
    }

    /// Persist the account count.
    pub fn write_account_count(&self, count: u32) -> Result<(), WalletError> {
        fs::write(self.accounts_path(), count.to_string())
            .map_err(|e| WalletError::Io(e.to_string()))
    }

    /// Delete both records. Missing files are not an error.
    pub fn wipe(&self) -> Result<(), WalletError> {
        for path in [self.vault_path(), self.accounts_path()] {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(WalletError::Io(e.to_string())),
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").field("dir", &self.dir).finish()
    }
}
