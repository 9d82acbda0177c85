use std::sync::Arc;

use tokio::sync::watch;

use crate::feed::{FeedAggregator, FeedSnapshot};
use crate::gateway::Gateway;
use crate::models::RelationshipKind;
use crate::mutation::{MutationController, ToggleOutcome};
use crate::notify::ChangeNotifier;
use crate::relationship::RelationshipTable;

/// State holder for the home timeline: a feed aggregator plus the
/// optimistic star/follow controller sharing one relationship table.
///
/// Intended usage: wrap in an `Arc`, spawn one task per user intent
/// (`refresh`, `load_more`, `toggle_*`), re-render on every version the
/// subscription yields, and call `close` when the screen goes away so
/// late results are dropped instead of written.
pub struct HomeScreen {
    feed: FeedAggregator,
    controller: MutationController,
    relationships: Arc<RelationshipTable>,
    notifier: Arc<ChangeNotifier>,
}

impl HomeScreen {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        let notifier = Arc::new(ChangeNotifier::new());
        let relationships = Arc::new(RelationshipTable::new(notifier.clone()));
        let feed = FeedAggregator::new(gateway.clone(), relationships.clone(), notifier.clone());
        let controller = MutationController::new(gateway, relationships.clone());
        Self {
            feed,
            controller,
            relationships,
            notifier,
        }
    }

    pub async fn refresh(&self) {
        self.feed.refresh().await;
    }

    pub async fn load_more(&self) {
        self.feed.load_more().await;
    }

    pub async fn toggle_star(&self, repo_id: &str) -> ToggleOutcome {
        self.controller.toggle(RelationshipKind::Star, repo_id).await
    }

    pub async fn toggle_follow(&self, subject_id: &str) -> ToggleOutcome {
        self.controller
            .toggle(RelationshipKind::Follow, subject_id)
            .await
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        self.feed.snapshot()
    }

    pub fn acknowledge_error(&self) {
        self.feed.acknowledge_error();
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.notifier.subscribe()
    }

    /// Teardown hook; in-flight fetches and toggles are discarded
    pub fn close(&self) {
        self.feed.close();
        self.relationships.close();
    }
}
