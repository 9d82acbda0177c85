use std::path::PathBuf;
use std::sync::Mutex;

use crate::token_store::{AccountInfo, AccountStore};
use crate::{Error, Result};

/// Session state: which accounts are signed in, which one is active,
/// and the token the gateway should authenticate with.
///
/// Handed to screens as a constructor argument, never looked up through
/// a container. Mutations persist immediately; the store file is the
/// source of truth across launches.
pub struct AuthManager {
    store: Mutex<AccountStore>,
    store_path: PathBuf,
    cache_dir: PathBuf,
}

impl AuthManager {
    /// Load from the default platform locations
    pub fn load() -> Result<Self> {
        let store_path = AccountStore::default_path()?;
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| Error::ConfigError("Could not find cache directory".into()))?
            .join("forgefeed");
        Self::with_paths(store_path, cache_dir)
    }

    /// Explicit paths, for tests and odd deployments
    pub fn with_paths(store_path: PathBuf, cache_dir: PathBuf) -> Result<Self> {
        let store = AccountStore::load_from(&store_path)?;
        Ok(Self {
            store: Mutex::new(store),
            store_path,
            cache_dir,
        })
    }

    pub fn current_account_id(&self) -> Option<String> {
        self.store
            .lock()
            .expect("account store poisoned")
            .current_id()
            .map(String::from)
    }

    /// Token for the active account, if anyone is signed in
    pub fn auth_token(&self) -> Option<String> {
        self.store
            .lock()
            .expect("account store poisoned")
            .current_token()
    }

    pub fn is_signed_in(&self) -> bool {
        self.auth_token().is_some()
    }

    /// Register an account after the OAuth flow hands back a token.
    /// The first account added becomes the active one.
    pub fn add_account(&self, id: &str, login: &str, token: &str) -> Result<()> {
        let mut store = self.store.lock().expect("account store poisoned");
        store.upsert(id, login, token);
        store.save_to(&self.store_path)
    }

    pub fn switch_account(&self, id: &str) -> Result<()> {
        let mut store = self.store.lock().expect("account store poisoned");
        if !store.set_current(id) {
            return Err(Error::NotFound(format!("account {}", id)));
        }
        tracing::info!(account = id, "switched account");
        store.save_to(&self.store_path)
    }

    pub fn remove_account(&self, id: &str) -> Result<()> {
        let mut store = self.store.lock().expect("account store poisoned");
        store.remove(id);
        store.save_to(&self.store_path)
    }

    pub fn accounts(&self) -> Vec<AccountInfo> {
        self.store.lock().expect("account store poisoned").list()
    }

    /// Drop everything cached on disk for the app. Used on sign-out so
    /// the next account doesn't see the previous one's responses.
    pub fn clear_cache(&self) -> Result<()> {
        if self.cache_dir.exists() {
            std::fs::remove_dir_all(&self.cache_dir)?;
            tracing::info!(dir = %self.cache_dir.display(), "cache cleared");
        }
        Ok(())
    }
}
