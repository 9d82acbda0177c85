use async_trait::async_trait;

use crate::{
    models::{FeedPage, RepoDetails},
    Result,
};

/// Trait for the backend gateway - makes testing easier and keeps things flexible
///
/// The screens never talk HTTP directly; they get a `Gateway` handed in
/// through their constructors. Swapping the real client for a mock is a
/// one-liner in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Fetch one feed page; `None` cursor means the head page
    async fn fetch_feed(&self, cursor: Option<String>) -> Result<FeedPage>;

    async fn fetch_repo_details(&self, owner: &str, name: &str) -> Result<RepoDetails>;

    /// Set the viewer's star on a repository to `active`
    async fn set_star(&self, repo_id: &str, active: bool) -> Result<()>;

    /// Set the viewer's follow on a user or org to `active`
    async fn set_follow(&self, subject_id: &str, active: bool) -> Result<()>;

    /// Revoke an access token during sign-out
    async fn delete_access_token(&self, token: &str) -> Result<()>;
}
