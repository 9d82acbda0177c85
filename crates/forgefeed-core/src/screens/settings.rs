use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use crate::gateway::Gateway;
use crate::notify::ChangeNotifier;
use crate::session::AuthManager;
use crate::{Error, Result};

struct SettingsInner {
    sign_out_dialog_open: bool,
    signed_out: bool,
}

/// State holder for the settings screen; owns the sign-out flow.
pub struct SettingsScreen {
    gateway: Arc<dyn Gateway>,
    auth: Arc<AuthManager>,
    inner: Mutex<SettingsInner>,
    notifier: Arc<ChangeNotifier>,
    closed: AtomicBool,
}

impl SettingsScreen {
    pub fn new(gateway: Arc<dyn Gateway>, auth: Arc<AuthManager>) -> Self {
        Self {
            gateway,
            auth,
            inner: Mutex::new(SettingsInner {
                sign_out_dialog_open: false,
                signed_out: false,
            }),
            notifier: Arc::new(ChangeNotifier::new()),
            closed: AtomicBool::new(false),
        }
    }

    pub fn open_sign_out_dialog(&self) {
        self.set_dialog(true);
    }

    pub fn close_sign_out_dialog(&self) {
        self.set_dialog(false);
    }

    fn set_dialog(&self, open: bool) {
        self.inner
            .lock()
            .expect("settings state poisoned")
            .sign_out_dialog_open = open;
        self.notifier.notify();
    }

    /// Revoke the token, then tear the local session down. The session
    /// is only touched after the gateway accepts the revocation; on
    /// failure everything stays signed in and the error propagates.
    pub async fn sign_out(&self) -> Result<()> {
        let token = self.auth.auth_token().ok_or(Error::NoSession)?;

        self.gateway.delete_access_token(&token).await?;

        if self.closed.load(Ordering::SeqCst) {
            tracing::debug!("sign-out result discarded, screen closed");
            return Ok(());
        }

        if let Some(id) = self.auth.current_account_id() {
            self.auth.remove_account(&id)?;
        }
        self.auth.clear_cache()?;

        {
            let mut inner = self.inner.lock().expect("settings state poisoned");
            inner.signed_out = true;
            inner.sign_out_dialog_open = false;
        }
        self.notifier.notify();
        tracing::info!("signed out");
        Ok(())
    }

    pub fn signed_out(&self) -> bool {
        self.inner.lock().expect("settings state poisoned").signed_out
    }

    pub fn sign_out_dialog_open(&self) -> bool {
        self.inner
            .lock()
            .expect("settings state poisoned")
            .sign_out_dialog_open
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.notifier.subscribe()
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MockGateway;

    fn auth_with_account(dir: &tempfile::TempDir) -> Arc<AuthManager> {
        let auth = AuthManager::with_paths(
            dir.path().join("accounts.json"),
            dir.path().join("cache"),
        )
        .unwrap();
        auth.add_account("u1", "octocat", "token-1").unwrap();
        Arc::new(auth)
    }

    #[tokio::test]
    async fn test_sign_out_revokes_and_clears_session() {
        let dir = tempfile::tempdir().unwrap();
        let auth = auth_with_account(&dir);
        std::fs::create_dir_all(dir.path().join("cache")).unwrap();

        let mut gateway = MockGateway::new();
        gateway
            .expect_delete_access_token()
            .withf(|token| token == "token-1")
            .times(1)
            .returning(|_| Ok(()));

        let screen = SettingsScreen::new(Arc::new(gateway), auth.clone());
        screen.open_sign_out_dialog();
        screen.sign_out().await.unwrap();

        assert!(screen.signed_out());
        assert!(!screen.sign_out_dialog_open());
        assert!(!auth.is_signed_in());
        assert!(!dir.path().join("cache").exists());
    }

    #[tokio::test]
    async fn test_failed_revocation_leaves_session_intact() {
        let dir = tempfile::tempdir().unwrap();
        let auth = auth_with_account(&dir);

        let mut gateway = MockGateway::new();
        gateway
            .expect_delete_access_token()
            .returning(|_| Err(Error::NetworkError("offline".into())));

        let screen = SettingsScreen::new(Arc::new(gateway), auth.clone());
        let err = screen.sign_out().await.unwrap_err();

        assert!(matches!(err, Error::NetworkError(_)));
        assert!(!screen.signed_out());
        assert!(auth.is_signed_in());
    }

    #[tokio::test]
    async fn test_sign_out_without_session() {
        let dir = tempfile::tempdir().unwrap();
        let auth = Arc::new(
            AuthManager::with_paths(
                dir.path().join("accounts.json"),
                dir.path().join("cache"),
            )
            .unwrap(),
        );

        let screen = SettingsScreen::new(Arc::new(MockGateway::new()), auth);
        assert!(matches!(
            screen.sign_out().await.unwrap_err(),
            Error::NoSession
        ));
    }
}
