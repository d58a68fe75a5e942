//! In-memory wallet sessions, one per chain.
//!
//! A session holds imported or generated accounts and an active account
//! used by signing operations when the caller passes no key. Disconnecting
//! remembers the session so [`Wallets::auto_connect`] can restore it.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use parking_lot::Mutex;
use serde_json::{json, Value};
use tracing::info;
use unimove_crypto::{Keypair, PublicKey};
use unimove_types::{ChainId, SignatureScheme};

use crate::error::{UnimoveError, UnimoveResult};

#[derive(Debug, Clone)]
pub struct WalletAccount {
    keypair: Arc<Keypair>,
    address: String,
}

impl WalletAccount {
    pub fn new(keypair: Keypair) -> Self {
        let address = keypair.to_address();
        Self {
            keypair: Arc::new(keypair),
            address,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn scheme(&self) -> SignatureScheme {
        self.keypair.scheme()
    }

    pub fn public_key(&self) -> PublicKey {
        self.keypair.public_key()
    }

    pub fn keypair(&self) -> &Arc<Keypair> {
        &self.keypair
    }

    pub fn to_json(&self) -> Value {
        json!({
            "address": self.address,
            "publicKey": self.public_key().to_base64(),
            "scheme": self.scheme(),
        })
    }
}

#[derive(Debug, Default)]
pub struct WalletSession {
    accounts: Vec<WalletAccount>,
    active: Option<usize>,
    /// Accounts and active index as of the last disconnect.
    remembered: Option<(Vec<WalletAccount>, usize)>,
}

impl WalletSession {
    pub fn is_connected(&self) -> bool {
        self.active.is_some()
    }

    /// Add `keypair` (or reuse the account with the same address) and make
    /// it active.
    pub fn connect(&mut self, keypair: Keypair) -> WalletAccount {
        let address = keypair.to_address();
        let index = match self.accounts.iter().position(|a| a.address == address) {
            Some(index) => index,
            None => {
                self.accounts.push(WalletAccount::new(keypair));
                self.accounts.len() - 1
            }
        };
        self.active = Some(index);
        self.accounts[index].clone()
    }

    pub fn disconnect(&mut self) {
        if let Some(active) = self.active.take() {
            self.remembered = Some((std::mem::take(&mut self.accounts), active));
        }
        self.accounts.clear();
    }

    /// Restore the session saved by the last disconnect. Returns whether a
    /// session is connected afterwards.
    pub fn auto_connect(&mut self) -> bool {
        if self.is_connected() {
            return true;
        }
        match self.remembered.take() {
            Some((accounts, active)) => {
                self.accounts = accounts;
                self.active = Some(active);
                true
            }
            None => false,
        }
    }

    pub fn current(&self) -> Option<&WalletAccount> {
        self.active.and_then(|i| self.accounts.get(i))
    }

    pub fn accounts(&self) -> &[WalletAccount] {
        &self.accounts
    }

    pub fn switch(&mut self, address: &str) -> UnimoveResult<WalletAccount> {
        let wanted = unimove_types::address::normalize_address(address);
        let index = self
            .accounts
            .iter()
            .position(|a| a.address == wanted)
            .ok_or_else(|| UnimoveError::Wallet(format!("no account with address {}", address)))?;
        self.active = Some(index);
        Ok(self.accounts[index].clone())
    }
}

/// Sessions by chain.
#[derive(Debug, Default)]
pub struct Wallets {
    sessions: Mutex<HashMap<ChainId, WalletSession>>,
}

impl Wallets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session<R>(&self, chain: ChainId, f: impl FnOnce(&mut WalletSession) -> R) -> R {
        let mut sessions = self.sessions.lock();
        f(sessions.entry(chain).or_default())
    }

    pub fn connect(&self, chain: ChainId, keypair: Keypair) -> WalletAccount {
        let account = self.with_session(chain, |s| s.connect(keypair));
        info!(%chain, address = account.address(), "wallet connected");
        account
    }

    pub fn disconnect(&self, chain: ChainId) {
        self.with_session(chain, WalletSession::disconnect);
        info!(%chain, "wallet disconnected");
    }

    pub fn current(&self, chain: ChainId) -> Option<WalletAccount> {
        self.with_session(chain, |s| s.current().cloned())
    }

    /// The active account, or an error naming the chain.
    pub fn require_current(&self, chain: ChainId) -> UnimoveResult<WalletAccount> {
        self.current(chain).ok_or_else(|| {
            UnimoveError::Wallet(format!(
                "no {} wallet connected",
                chain.display_name()
            ))
        })
    }

    pub fn accounts(&self, chain: ChainId) -> Vec<WalletAccount> {
        self.with_session(chain, |s| s.accounts().to_vec())
    }

    pub fn switch(&self, chain: ChainId, address: &str) -> UnimoveResult<WalletAccount> {
        self.with_session(chain, |s| s.switch(address))
    }

    pub fn auto_connect(&self, chain: ChainId) -> Option<WalletAccount> {
        let account = self.with_session(chain, |s| {
            if s.auto_connect() {
                s.current().cloned()
            } else {
                None
            }
        });
        if let Some(account) = &account {
            info!(%chain, address = account.address(), "wallet auto-connected");
        }
        account
    }

    /// The chain's wallet: name, connection flag and accounts.
    pub fn describe(&self, chain: ChainId) -> Value {
        self.with_session(chain, |s| {
            json!({
                "name": wallet_name(chain),
                "chain": chain,
                "connected": s.is_connected(),
                "accounts": s.accounts().iter().map(WalletAccount::to_json).collect::<Vec<_>>(),
            })
        })
    }
}

/// Display name of the in-memory wallet for `chain`.
pub fn wallet_name(chain: ChainId) -> String {
    format!("Unimove {} Wallet", chain.display_name())
}

static WALLETS: LazyLock<Wallets> = LazyLock::new(Wallets::new);

/// The process-wide wallet sessions.
pub fn wallets() -> &'static Wallets {
    &WALLETS
}
