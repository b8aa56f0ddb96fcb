//! The wallet itself: vault lifecycle, unlock/lock, accounts, auto-lock.
//!
//! A [`Wallet`] is a cheap handle over shared state. Secrets live only
//! inside the in-memory session; locking takes the session out and
//! drops it, which wipes the seed and signing keys. Every unlock
//! installs a new session generation, and anything that outlives a
//! lock checks the generation before touching session state.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use sluice_core::address::{Address, Network};
use sluice_core::risk::GateOutcome;
use sluice_core::traits::ChainClient;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::info;

use crate::error::WalletError;
use crate::gateway::RiskGateway;
use crate::keys::{self, Account, Seed};
use crate::mnemonic;
use crate::store::Store;
use crate::vault::{self, Vault};

/// Inactivity window before the wallet locks itself.
const DEFAULT_AUTO_LOCK: Duration = Duration::from_secs(600);
/// Confirmations a send waits for before reporting success.
const DEFAULT_CONFIRM_DEPTH: u64 = 1;
/// Poll cadence while waiting for confirmations.
const DEFAULT_CONFIRM_POLL: Duration = Duration::from_secs(2);

/// Wallet construction parameters.
#[derive(Debug, Clone)]
pub struct WalletConfig {
    /// Directory holding the vault and account count records.
    pub data_dir: PathBuf,
    /// Network all accounts and recipients must belong to.
    pub network: Network,
    /// Base URL of the recipient scoring service.
    pub gateway_url: String,
    pub auto_lock: Duration,
    pub confirm_depth: u64,
    pub confirm_poll: Duration,
}

impl WalletConfig {
    pub fn new(
        data_dir: impl Into<PathBuf>,
        network: Network,
        gateway_url: impl Into<String>,
    ) -> Self {
        Self {
            data_dir: data_dir.into(),
            network,
            gateway_url: gateway_url.into(),
            auto_lock: DEFAULT_AUTO_LOCK,
            confirm_depth: DEFAULT_CONFIRM_DEPTH,
            confirm_poll: DEFAULT_CONFIRM_POLL,
        }
    }
}

/// Index and address of a derived account, safe to show anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountInfo {
    pub index: u32,
    pub address: String,
}

impl From<&Account> for AccountInfo {
    fn from(account: &Account) -> Self {
        Self {
            index: account.index(),
            address: account.address().encode(),
        }
    }
}

/// In-memory unlocked state. Dropping it wipes the seed and keys.
struct Session {
    seed: Seed,
    accounts: Vec<Account>,
    active: usize,
    generation: u64,
    last_activity: Instant,
    autolock: Option<AbortHandle>,
}

struct Inner {
    store: Store,
    chain: Arc<dyn ChainClient>,
    gateway: RiskGateway,
    config: WalletConfig,
    session: Mutex<Option<Session>>,
    /// Bumped on every lock. A session is current while its recorded
    /// generation still equals this counter.
    generation: AtomicU64,
}

/// Handle to one wallet. Clones share the same session.
#[derive(Clone)]
pub struct Wallet {
    inner: Arc<Inner>,
}

impl Wallet {
    pub fn new(config: WalletConfig, chain: Arc<dyn ChainClient>) -> Result<Self, WalletError> {
        let store = Store::open(&config.data_dir)?;
        let gateway = RiskGateway::new(&config.gateway_url)?;
        Ok(Self {
            inner: Arc::new(Inner {
                store,
                chain,
                gateway,
                config,
                session: Mutex::new(None),
                generation: AtomicU64::new(0),
            }),
        })
    }

    // --- Vault lifecycle ---

    /// Create the vault from a phrase and password. Fails if a vault
    /// already exists; the wallet stays locked.
    pub fn create(&self, password: &str, phrase: &str) -> Result<(), WalletError> {
        if self.inner.store.vault_exists() {
            return Err(WalletError::VaultExists);
        }
        let canonical = mnemonic::parse_phrase(phrase)?.to_string();
        let vault = vault::seal(password, canonical.as_bytes())?;
        self.inner.store.write_vault(&vault)?;
        self.inner.store.write_account_count(1)?;
        info!("wallet created");
        Ok(())
    }

    /// Replace the vault with one sealing `phrase` under `password`.
    ///
    /// This is the restore path: it overwrites any existing vault and
    /// resets the account count, since the old count described a
    /// different seed.
    pub fn import_phrase(&self, password: &str, phrase: &str) -> Result<(), WalletError> {
        let canonical = mnemonic::parse_phrase(phrase)?.to_string();
        let vault = vault::seal(password, canonical.as_bytes())?;
        self.lock();
        self.inner.store.write_vault(&vault)?;
        self.inner.store.write_account_count(1)?;
        info!("phrase imported");
        Ok(())
    }

    /// Read the encrypted vault for backup. Works while locked; the
    /// payload is ciphertext.
    pub fn export_vault(&self) -> Result<Vault, WalletError> {
        self.inner.store.read_vault()
    }

    /// Install a previously exported vault. The account count record is
    /// left alone: the export does not carry it, and a re-import of the
    /// same seed should find its accounts again.
    pub fn import_vault(&self, vault: Vault) -> Result<(), WalletError> {
        if vault.enc.ciphertext.is_empty() {
            return Err(WalletError::Validation(
                "vault has no ciphertext".to_string(),
            ));
        }
        self.lock();
        self.inner.store.write_vault(&vault)?;
        info!("vault imported");
        Ok(())
    }

    /// Delete the vault and account count, locking first.
    pub fn wipe(&self) -> Result<(), WalletError> {
        self.lock();
        self.inner.store.wipe()?;
        info!("wallet wiped");
        Ok(())
    }

    // --- Session lifecycle ---

    /// Decrypt the vault and install a session.
    ///
    /// Every failure on this path reads as [`WalletError::Auth`]: a
    /// wrong password, a corrupted vault, and a garbled phrase are
    /// indistinguishable to the caller. Unlocking an already unlocked
    /// wallet verifies the password and keeps the existing session.
    pub async fn unlock(&self, password: &str) -> Result<(), WalletError> {
        let vault = self.inner.store.read_vault()?;
        let password_owned = password.to_string();
        let plaintext = tokio::task::spawn_blocking(move || vault::open(&password_owned, &vault))
            .await
            .map_err(|e| WalletError::Io(e.to_string()))??;

        let phrase = std::str::from_utf8(&plaintext).map_err(|_| WalletError::Auth)?;
        let seed = mnemonic::phrase_to_seed(phrase).map_err(|_| WalletError::Auth)?;
        let count = self.inner.store.read_account_count();
        let accounts = keys::derive_accounts(&seed, count, self.inner.config.network);

        let generation = self.inner.generation.load(Ordering::SeqCst);
        {
            let mut guard = self.inner.session.lock();
            if guard.is_some() {
                // Raced with another unlock; the fresh copy is dropped
                // and wiped here.
                return Ok(());
            }
            *guard = Some(Session {
                seed,
                accounts,
                active: 0,
                generation,
                last_activity: Instant::now(),
                autolock: None,
            });
        }

        let handle = self.spawn_autolock(generation);
        let mut guard = self.inner.session.lock();
        match guard.as_mut() {
            Some(session) if session.generation == generation => {
                session.autolock = Some(handle);
            }
            // Locked again before the watcher was registered.
            _ => handle.abort(),
        }
        drop(guard);

        info!(accounts = count, "wallet unlocked");
        Ok(())
    }

    /// Drop the session. The seed and signing keys are wiped, the
    /// auto-lock watcher is cancelled, and in-flight work sees a stale
    /// generation. Locking a locked wallet is a no-op.
    pub fn lock(&self) {
        let taken = {
            let mut guard = self.inner.session.lock();
            let taken = guard.take();
            if taken.is_some() {
                self.inner.generation.fetch_add(1, Ordering::SeqCst);
            }
            taken
        };
        if let Some(session) = taken {
            if let Some(handle) = session.autolock {
                handle.abort();
            }
            info!("wallet locked");
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.inner.session.lock().is_some()
    }

    /// Push the auto-lock deadline back to now + the configured window.
    pub fn note_activity(&self) {
        if let Some(session) = self.inner.session.lock().as_mut() {
            session.last_activity = Instant::now();
        }
    }

    /// Lock only if the session with this generation is still current.
    fn lock_if_generation(&self, generation: u64) {
        let taken = {
            let mut guard = self.inner.session.lock();
            match guard.as_ref() {
                Some(session) if session.generation == generation => {
                    self.inner.generation.fetch_add(1, Ordering::SeqCst);
                    guard.take()
                }
                _ => None,
            }
        };
        if let Some(session) = taken {
            if let Some(handle) = session.autolock {
                handle.abort();
            }
            info!("auto-locked after inactivity");
        }
    }

    /// Watch `last_activity` and lock when the idle window elapses.
    /// Activity moves the deadline, so the sleep re-checks instead of
    /// firing. Holds only a weak handle: dropping the wallet does not
    /// wait out the idle window.
    fn spawn_autolock(&self, generation: u64) -> AbortHandle {
        let inner = Arc::downgrade(&self.inner);
        let idle = self.inner.config.auto_lock;
        let handle = tokio::spawn(async move {
            loop {
                let Some(inner) = inner.upgrade() else { return };
                let wallet = Wallet { inner };
                let deadline = {
                    let guard = wallet.inner.session.lock();
                    match guard.as_ref() {
                        Some(session) if session.generation == generation => {
                            session.last_activity + idle
                        }
                        _ => return,
                    }
                };
                if Instant::now() >= deadline {
                    wallet.lock_if_generation(generation);
                    return;
                }
                drop(wallet);
                tokio::time::sleep_until(deadline).await;
            }
        });
        handle.abort_handle()
    }

    // --- Accounts ---

    pub fn accounts(&self) -> Result<Vec<AccountInfo>, WalletError> {
        let guard = self.inner.session.lock();
        let session = guard.as_ref().ok_or(WalletError::NotUnlocked)?;
        Ok(session.accounts.iter().map(AccountInfo::from).collect())
    }

    pub fn active_account(&self) -> Result<AccountInfo, WalletError> {
        let guard = self.inner.session.lock();
        let session = guard.as_ref().ok_or(WalletError::NotUnlocked)?;
        Ok(AccountInfo::from(&session.accounts[session.active]))
    }

    pub fn select_account(&self, index: u32) -> Result<(), WalletError> {
        let mut guard = self.inner.session.lock();
        let session = guard.as_mut().ok_or(WalletError::NotUnlocked)?;
        if index as usize >= session.accounts.len() {
            return Err(WalletError::Validation(format!(
                "no account at index {index}"
            )));
        }
        session.active = index as usize;
        session.last_activity = Instant::now();
        Ok(())
    }

    /// Derive the next account and persist the new count.
    ///
    /// The count is written before the account becomes visible, so a
    /// crash in between re-derives the same account on the next unlock
    /// rather than losing it.
    pub fn add_account(&self) -> Result<AccountInfo, WalletError> {
        let mut guard = self.inner.session.lock();
        let session = guard.as_mut().ok_or(WalletError::NotUnlocked)?;
        session.last_activity = Instant::now();

        let index = session.accounts.len() as u32;
        let account = keys::derive_account(&session.seed, index, self.inner.config.network);
        self.inner.store.write_account_count(index + 1)?;

        let info = AccountInfo::from(&account);
        session.accounts.push(account);
        info!(index, "account added");
        Ok(info)
    }

    // --- Screening ---

    /// Score a recipient without sending. Available while locked; the
    /// gateway never sees a secret.
    pub async fn assess_recipient(&self, recipient: &str) -> Result<GateOutcome, WalletError> {
        let address = self.parse_recipient(recipient)?;
        Ok(self.inner.gateway.assess(&address).await)
    }

    // --- Internal plumbing shared with the send path ---

    pub(crate) fn parse_recipient(&self, recipient: &str) -> Result<Address, WalletError> {
        let address = Address::decode(recipient)
            .map_err(|e| WalletError::Validation(format!("bad recipient address: {e}")))?;
        if address.network() != self.inner.config.network {
            return Err(WalletError::Validation(format!(
                "recipient is on {}, wallet is on {}",
                address.network().tag(),
                self.inner.config.network.tag(),
            )));
        }
        Ok(address)
    }

    /// Clone the signing material for one account plus the session
    /// generation it belongs to. Counts as activity.
    pub(crate) fn snapshot_account(&self, index: u32) -> Result<(Account, u64), WalletError> {
        let mut guard = self.inner.session.lock();
        let session = guard.as_mut().ok_or(WalletError::NotUnlocked)?;
        session.last_activity = Instant::now();
        let account = session
            .accounts
            .get(index as usize)
            .ok_or_else(|| WalletError::Validation(format!("no account at index {index}")))?
            .clone();
        Ok((account, session.generation))
    }

    pub(crate) fn generation_current(&self, generation: u64) -> bool {
        self.inner.generation.load(Ordering::SeqCst) == generation
    }

    pub(crate) fn chain(&self) -> &dyn ChainClient {
        self.inner.chain.as_ref()
    }

    pub(crate) fn gateway(&self) -> &RiskGateway {
        &self.inner.gateway
    }

    pub(crate) fn config(&self) -> &WalletConfig {
        &self.inner.config
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("network", &self.inner.config.network)
            .field("unlocked", &self.is_unlocked())
            .finish_non_exhaustive()
    }
}
