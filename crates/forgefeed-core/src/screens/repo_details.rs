use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use crate::gateway::Gateway;
use crate::models::{RelationshipKind, RepoDetails};
use crate::mutation::{MutationController, ToggleOutcome};
use crate::notify::ChangeNotifier;
use crate::relationship::RelationshipTable;
use crate::{Error, Result};

struct DetailsInner {
    details: Option<RepoDetails>,
    loading: bool,
    has_error: bool,
}

/// Rendered view of the details screen. Star flag and count come out of
/// the relationship table already folded together, so the two can never
/// drift apart between optimistic apply and server confirmation.
#[derive(Debug, Clone)]
pub struct RepoDetailsSnapshot {
    pub details: Option<RepoDetails>,
    pub starred: bool,
    pub star_count: u64,
    pub star_pending: bool,
    pub loading: bool,
    pub has_error: bool,
}

/// State holder for one repository's details tab
pub struct RepoDetailsScreen {
    gateway: Arc<dyn Gateway>,
    owner: String,
    name: String,
    inner: Mutex<DetailsInner>,
    relationships: Arc<RelationshipTable>,
    controller: MutationController,
    notifier: Arc<ChangeNotifier>,
    closed: AtomicBool,
}

impl RepoDetailsScreen {
    pub fn new(gateway: Arc<dyn Gateway>, owner: impl Into<String>, name: impl Into<String>) -> Self {
        let notifier = Arc::new(ChangeNotifier::new());
        let relationships = Arc::new(RelationshipTable::new(notifier.clone()));
        let controller = MutationController::new(gateway.clone(), relationships.clone());
        Self {
            gateway,
            owner: owner.into(),
            name: name.into(),
            inner: Mutex::new(DetailsInner {
                details: None,
                loading: false,
                has_error: false,
            }),
            relationships,
            controller,
            notifier,
            closed: AtomicBool::new(false),
        }
    }

    /// Fetch the details snapshot. Recoverable failures set the error
    /// flag for the UI; auth failures propagate so the caller can tear
    /// the session down. No-op while a load is already in flight.
    pub async fn load_details(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Ok(());
        }
        {
            let mut inner = self.inner.lock().expect("details state poisoned");
            if inner.loading {
                return Ok(());
            }
            inner.loading = true;
            inner.has_error = false;
        }
        self.notifier.notify();

        let result = self.gateway.fetch_repo_details(&self.owner, &self.name).await;

        if self.closed.load(Ordering::SeqCst) {
            tracing::debug!("details result discarded, screen closed");
            return Ok(());
        }
        let outcome = {
            let mut inner = self.inner.lock().expect("details state poisoned");
            inner.loading = false;
            match result {
                Ok(details) => {
                    // Seed star state from the snapshot; a pending local
                    // toggle still wins
                    self.relationships
                        .seed(&details.id, details.viewer_has_starred);
                    inner.details = Some(details);
                    Ok(())
                }
                Err(err @ Error::AuthError(_)) => Err(err),
                Err(err) => {
                    tracing::warn!(%err, owner = %self.owner, name = %self.name, "details load failed");
                    inner.has_error = true;
                    Ok(())
                }
            }
        };
        self.notifier.notify();
        outcome
    }

    /// Optimistically toggle the viewer's star on this repo
    pub async fn toggle_star(&self) -> ToggleOutcome {
        let repo_id = {
            let inner = self.inner.lock().expect("details state poisoned");
            match &inner.details {
                Some(details) => details.id.clone(),
                // Nothing loaded yet, nothing to star
                None => return ToggleOutcome::Rejected,
            }
        };
        self.controller
            .toggle(RelationshipKind::Star, &repo_id)
            .await
    }

    pub fn snapshot(&self) -> RepoDetailsSnapshot {
        let inner = self.inner.lock().expect("details state poisoned");
        let relationship = inner
            .details
            .as_ref()
            .map(|d| self.relationships.resolve(&d.id))
            .unwrap_or_default();
        RepoDetailsSnapshot {
            starred: relationship.active,
            star_count: relationship.apply_to(
                inner
                    .details
                    .as_ref()
                    .map(|d| d.stargazer_count)
                    .unwrap_or(0),
            ),
            star_pending: relationship.pending,
            details: inner.details.clone(),
            loading: inner.loading,
            has_error: inner.has_error,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.notifier.subscribe()
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.relationships.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MockGateway;

    fn details(starred: bool) -> RepoDetails {
        RepoDetails {
            id: "r1".into(),
            owner: "octocat".into(),
            name: "hello".into(),
            description: Some("a test repo".into()),
            parent_name_with_owner: None,
            stargazer_count: 10,
            fork_count: 2,
            license: Some("MIT".into()),
            readme: None,
            contributors: vec![],
            languages: vec![],
            viewer_has_starred: starred,
        }
    }

    #[tokio::test]
    async fn test_load_then_star_confirmed() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_fetch_repo_details()
            .returning(|_, _| Ok(details(false)));
        gateway
            .expect_set_star()
            .withf(|id, active| id == "r1" && *active)
            .times(1)
            .returning(|_, _| Ok(()));

        let screen = RepoDetailsScreen::new(Arc::new(gateway), "octocat", "hello");
        screen.load_details().await.unwrap();

        let snap = screen.snapshot();
        assert!(!snap.starred);
        assert_eq!(snap.star_count, 10);

        assert_eq!(screen.toggle_star().await, ToggleOutcome::Confirmed);
        let snap = screen.snapshot();
        assert!(snap.starred);
        assert_eq!(snap.star_count, 11);
        assert!(!snap.star_pending);
    }

    #[tokio::test]
    async fn test_failed_star_snaps_back() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_fetch_repo_details()
            .returning(|_, _| Ok(details(false)));
        gateway
            .expect_set_star()
            .returning(|_, _| Err(Error::NetworkError("boom".into())));

        let screen = RepoDetailsScreen::new(Arc::new(gateway), "octocat", "hello");
        screen.load_details().await.unwrap();

        assert_eq!(screen.toggle_star().await, ToggleOutcome::RolledBack);
        let snap = screen.snapshot();
        assert!(!snap.starred);
        assert_eq!(snap.star_count, 10);
        assert!(!snap.star_pending);
    }

    #[tokio::test]
    async fn test_toggle_before_load_is_rejected() {
        let gateway = MockGateway::new();
        let screen = RepoDetailsScreen::new(Arc::new(gateway), "octocat", "hello");
        assert_eq!(screen.toggle_star().await, ToggleOutcome::Rejected);
    }

    #[tokio::test]
    async fn test_unstar_of_starred_repo() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_fetch_repo_details()
            .returning(|_, _| Ok(details(true)));
        gateway
            .expect_set_star()
            .withf(|id, active| id == "r1" && !*active)
            .times(1)
            .returning(|_, _| Ok(()));

        let screen = RepoDetailsScreen::new(Arc::new(gateway), "octocat", "hello");
        screen.load_details().await.unwrap();
        assert!(screen.snapshot().starred);

        assert_eq!(screen.toggle_star().await, ToggleOutcome::Confirmed);
        let snap = screen.snapshot();
        assert!(!snap.starred);
        assert_eq!(snap.star_count, 9);
    }

    #[tokio::test]
    async fn test_network_failure_sets_flag_auth_failure_propagates() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_fetch_repo_details()
            .times(1)
            .returning(|_, _| Err(Error::NetworkError("offline".into())));
        gateway
            .expect_fetch_repo_details()
            .returning(|_, _| Err(Error::AuthError("expired".into())));

        let screen = RepoDetailsScreen::new(Arc::new(gateway), "octocat", "hello");
        screen.load_details().await.unwrap();
        assert!(screen.snapshot().has_error);

        let err = screen.load_details().await.unwrap_err();
        assert!(matches!(err, Error::AuthError(_)));
    }
}
