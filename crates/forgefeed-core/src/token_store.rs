use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Persisted multi-account store: every signed-in account with its
/// access token, plus which one is active.
///
/// Tokens are obfuscated with a machine-specific XOR key so a casual
/// `cat accounts.json` shows nothing useful. This is obfuscation, not
/// encryption; an OS keychain would be the production-grade home.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AccountStore {
    accounts: HashMap<String, StoredAccount>,
    current: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredAccount {
    login: String,
    encrypted_token: Vec<u8>,
    /// Unix timestamp of when the account was added
    added_at: u64,
}

/// Listing entry for account pickers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    pub id: String,
    pub login: String,
    pub is_current: bool,
}

impl AccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from disk, or start empty if nothing is there yet
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let store: AccountStore = serde_json::from_str(&contents).map_err(|e| {
                crate::Error::ConfigError(format!("Failed to parse account store: {}", e))
            })?;
            Ok(store)
        } else {
            Ok(Self::new())
        }
    }

    pub fn save_to(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            crate::Error::ConfigError(format!("Failed to serialize account store: {}", e))
        })?;

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Default location: XDG data dir on Unix, AppData on Windows
    pub fn default_path() -> crate::Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find data directory".into()))?
            .join("forgefeed");
        Ok(data_dir.join("accounts.json"))
    }

    /// Add or replace an account. The first account added becomes current.
    pub fn upsert(&mut self, id: &str, login: &str, token: &str) {
        let added_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        self.accounts.insert(
            id.to_string(),
            StoredAccount {
                login: login.to_string(),
                encrypted_token: obfuscate(token),
                added_at,
            },
        );
        if self.current.is_none() {
            self.current = Some(id.to_string());
        }
    }

    pub fn token_for(&self, id: &str) -> Option<String> {
        self.accounts
            .get(id)
            .map(|account| deobfuscate(&account.encrypted_token))
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn current_token(&self) -> Option<String> {
        self.token_for(self.current.as_deref()?)
    }

    /// Returns false when the id is unknown
    pub fn set_current(&mut self, id: &str) -> bool {
        if self.accounts.contains_key(id) {
            self.current = Some(id.to_string());
            true
        } else {
            false
        }
    }

    /// Remove an account. If it was current, the oldest remaining
    /// account takes over (or nobody is signed in).
    pub fn remove(&mut self, id: &str) {
        self.accounts.remove(id);
        if self.current.as_deref() == Some(id) {
            self.current = self
                .accounts
                .iter()
                .min_by_key(|(_, account)| account.added_at)
                .map(|(id, _)| id.clone());
        }
    }

    pub fn list(&self) -> Vec<AccountInfo> {
        let mut infos: Vec<_> = self
            .accounts
            .iter()
            .map(|(id, account)| AccountInfo {
                id: id.clone(),
                login: account.login.clone(),
                is_current: self.current.as_deref() == Some(id.as_str()),
            })
            .collect();
        infos.sort_by(|a, b| a.login.cmp(&b.login));
        infos
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

/// XOR with a machine-specific key derived from hostname + username
fn obfuscate(data: &str) -> Vec<u8> {
    let key = machine_key();
    data.bytes()
        .enumerate()
        .map(|(i, b)| b ^ key[i % key.len()])
        .collect()
}

fn deobfuscate(data: &[u8]) -> String {
    let key = machine_key();
    let decrypted: Vec<u8> = data
        .iter()
        .enumerate()
        .map(|(i, &b)| b ^ key[i % key.len()])
        .collect();
    String::from_utf8_lossy(&decrypted).to_string()
}

fn machine_key() -> Vec<u8> {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let hostname = hostname::get()
        .unwrap_or_else(|_| std::ffi::OsString::from("unknown"))
        .to_string_lossy()
        .to_string();

    let username = whoami::username();
    let seed = format!("forgefeed-{}-{}", hostname, username);

    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    let hash = hasher.finish();

    // Stretch the 8-byte hash into a 32-byte key
    let mut key = Vec::with_capacity(32);
    let mut val = hash;
    for _ in 0..4 {
        key.extend_from_slice(&val.to_le_bytes());
        val = val.wrapping_mul(1103515245).wrapping_add(12345);
    }
    key
}
