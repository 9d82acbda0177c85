use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::gateway::Gateway;
use crate::models::{FeedItem, RelationshipState};
use crate::notify::ChangeNotifier;
use crate::relationship::RelationshipTable;

/// Where the aggregator is in its fetch cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Refreshing,
    Appending,
}

/// Immutable view handed to the render side: items paired with their
/// resolved relationship state, plus the flags the UI keys off.
#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    pub rows: Vec<FeedRow>,
    pub load_state: LoadState,
    pub has_error: bool,
    pub end_of_stream: bool,
}

#[derive(Debug, Clone)]
pub struct FeedRow {
    pub item: FeedItem,
    pub relationship: RelationshipState,
}

struct FeedInner {
    items: Vec<FeedItem>,
    cursor: Option<String>,
    end_of_stream: bool,
    load_state: LoadState,
    has_error: bool,
}

/// Cursor-paginated feed of heterogeneous activity items.
///
/// `refresh` replaces the loaded sequence wholesale; `load_more` appends
/// from the current cursor. At most one fetch is in flight at a time -
/// a second request while one is outstanding is a silent no-op, not
/// queued. Fetch failures flag an error for the UI but never discard
/// items already loaded.
///
/// The relationship side table survives refresh untouched: it is keyed
/// by entity id, not list position, so star/follow flags carry over to
/// the replacement items.
pub struct FeedAggregator {
    gateway: Arc<dyn Gateway>,
    relationships: Arc<RelationshipTable>,
    notifier: Arc<ChangeNotifier>,
    inner: Mutex<FeedInner>,
    closed: AtomicBool,
}

impl FeedAggregator {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        relationships: Arc<RelationshipTable>,
        notifier: Arc<ChangeNotifier>,
    ) -> Self {
        Self {
            gateway,
            relationships,
            notifier,
            inner: Mutex::new(FeedInner {
                items: Vec::new(),
                cursor: None,
                end_of_stream: false,
                load_state: LoadState::Idle,
                has_error: false,
            }),
            closed: AtomicBool::new(false),
        }
    }

    /// Fetch the head page and replace everything loaded so far.
    /// No-op while another fetch is in flight.
    pub async fn refresh(&self) {
        if self.closed.load(Ordering::SeqCst) {
            return;
        }
        {
            let mut inner = self.inner.lock().expect("feed state poisoned");
            if inner.load_state != LoadState::Idle {
                return;
            }
            inner.load_state = LoadState::Refreshing;
        }
        self.notifier.notify();

        let result = self.gateway.fetch_feed(None).await;

        if self.closed.load(Ordering::SeqCst) {
            tracing::debug!("refresh result discarded, aggregator closed");
            self.inner.lock().expect("feed state poisoned").load_state = LoadState::Idle;
            return;
        }
        {
            let mut inner = self.inner.lock().expect("feed state poisoned");
            inner.load_state = LoadState::Idle;
            match result {
                Ok(page) => {
                    self.relationships.seed_items(&page.items);
                    inner.items = page.items;
                    inner.end_of_stream = page.next_cursor.is_none();
                    inner.cursor = page.next_cursor;
                    inner.has_error = false;
                    tracing::debug!(items = inner.items.len(), "feed refreshed");
                }
                Err(err) => {
                    // Loaded items stay; the UI shows a recoverable error
                    inner.has_error = true;
                    tracing::warn!(%err, "feed refresh failed");
                }
            }
        }
        self.notifier.notify();
    }

    /// Fetch the next page and append it. No-op while a fetch is in
    /// flight or once the stream has ended.
    pub async fn load_more(&self) {
        if self.closed.load(Ordering::SeqCst) {
            return;
        }
        // Claim the slot and read the cursor in one critical section
        let cursor = {
            let mut inner = self.inner.lock().expect("feed state poisoned");
            if inner.load_state != LoadState::Idle || inner.end_of_stream {
                return;
            }
            inner.load_state = LoadState::Appending;
            inner.cursor.clone()
        };
        self.notifier.notify();

        let result = self.gateway.fetch_feed(cursor).await;

        if self.closed.load(Ordering::SeqCst) {
            tracing::debug!("load_more result discarded, aggregator closed");
            self.inner.lock().expect("feed state poisoned").load_state = LoadState::Idle;
            return;
        }
        {
            let mut inner = self.inner.lock().expect("feed state poisoned");
            inner.load_state = LoadState::Idle;
            match result {
                Ok(page) => {
                    self.relationships.seed_items(&page.items);
                    inner.items.extend(page.items);
                    inner.end_of_stream = page.next_cursor.is_none();
                    inner.cursor = page.next_cursor;
                    inner.has_error = false;
                    tracing::debug!(total = inner.items.len(), "feed page appended");
                }
                Err(err) => {
                    inner.has_error = true;
                    tracing::warn!(%err, "feed load_more failed");
                }
            }
        }
        self.notifier.notify();
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        let inner = self.inner.lock().expect("feed state poisoned");
        FeedSnapshot {
            rows: inner
                .items
                .iter()
                .map(|item| FeedRow {
                    relationship: self.relationships.resolve(item.subject_id()),
                    item: item.clone(),
                })
                .collect(),
            load_state: inner.load_state,
            has_error: inner.has_error,
            end_of_stream: inner.end_of_stream,
        }
    }

    /// Clear the error flag once the UI has shown it
    pub fn acknowledge_error(&self) {
        let mut inner = self.inner.lock().expect("feed state poisoned");
        inner.has_error = false;
        drop(inner);
        self.notifier.notify();
    }

    /// Screen teardown: in-flight fetch results are discarded on arrival
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
