use std::sync::Arc;

use crate::config::Config;
use crate::session::AuthManager;
use crate::token_store::AccountInfo;
use crate::Result;

/// State holder for the landing/sign-in screen: the OAuth URL to open
/// in a browser, plus quick switching between already-known accounts.
pub struct LandingScreen {
    auth: Arc<AuthManager>,
    login_url: String,
}

impl LandingScreen {
    pub fn new(auth: Arc<AuthManager>, config: &Config) -> Self {
        let login_url = forgefeed_api::auth::authorize_url(
            &config.oauth.client_id,
            &config.oauth.redirect_uri,
            forgefeed_api::auth::DEFAULT_SCOPES,
        );
        Self { auth, login_url }
    }

    pub fn login_url(&self) -> &str {
        &self.login_url
    }

    pub fn accounts(&self) -> Vec<AccountInfo> {
        self.auth.accounts()
    }

    pub fn switch_to_account(&self, id: &str) -> Result<()> {
        self.auth.switch_account(id)
    }
}
