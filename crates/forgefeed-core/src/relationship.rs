use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::models::{FeedItem, RelationshipState};
use crate::notify::ChangeNotifier;

/// Shared star/follow side table, keyed by subject id.
///
/// Kept separate from the feed items so two items referencing the same
/// entity render one consistent state. Entries appear lazily when a feed
/// item first references an id; an absent entry renders as the default
/// (inactive, no delta, not pending).
///
/// Owned by a single screen - tables are deliberately not shared across
/// screens, so the same repo can briefly show different star state on
/// two open screens until each refreshes.
pub struct RelationshipTable {
    entries: Mutex<HashMap<String, RelationshipState>>,
    notifier: Arc<ChangeNotifier>,
    closed: AtomicBool,
}

/// What `begin_toggle` decided, carried across the network call so the
/// controller can revert on failure.
#[derive(Debug, Clone)]
pub struct ToggleTicket {
    pub previous: RelationshipState,
    pub new_active: bool,
}

impl RelationshipTable {
    pub fn new(notifier: Arc<ChangeNotifier>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            notifier,
            closed: AtomicBool::new(false),
        }
    }

    /// Current state for a subject, defaulting for ids never seen
    pub fn resolve(&self, subject_id: &str) -> RelationshipState {
        self.entries
            .lock()
            .expect("relationship table poisoned")
            .get(subject_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn is_pending(&self, subject_id: &str) -> bool {
        self.resolve(subject_id).pending
    }

    /// Overwrite an entry with server-observed truth, unless a local
    /// mutation is pending for that id - pending wins until it resolves.
    /// Server truth arrives with a fresh count baked into the item
    /// snapshot, so the delta resets to zero.
    pub fn seed(&self, subject_id: &str, active: bool) {
        if self.closed.load(Ordering::SeqCst) {
            return;
        }
        let mut entries = self.entries.lock().expect("relationship table poisoned");
        let entry = entries.entry(subject_id.to_string()).or_default();
        if entry.pending {
            tracing::debug!(subject_id, "seed skipped, local mutation pending");
            return;
        }
        *entry = RelationshipState {
            active,
            count_delta: 0,
            pending: false,
        };
        drop(entries);
        self.notifier.notify();
    }

    /// Seed every subject referenced by a page of feed items
    pub fn seed_items(&self, items: &[FeedItem]) {
        for item in items {
            self.seed(item.subject_id(), item.subject_active());
        }
    }

    /// Apply the optimistic half of a toggle: flip `active`, move the
    /// delta, mark pending. Returns `None` (reject silently) when a
    /// toggle for this id is already in flight or the table is closed.
    pub fn begin_toggle(&self, subject_id: &str) -> Option<ToggleTicket> {
        if self.closed.load(Ordering::SeqCst) {
            return None;
        }
        let ticket = {
            let mut entries = self.entries.lock().expect("relationship table poisoned");
            let entry = entries.entry(subject_id.to_string()).or_default();
            if entry.pending {
                return None;
            }
            let previous = entry.clone();
            entry.active = !entry.active;
            entry.count_delta += if entry.active { 1 } else { -1 };
            entry.pending = true;
            ToggleTicket {
                previous,
                new_active: entry.active,
            }
        };
        self.notifier.notify();
        Some(ticket)
    }

    /// Server confirmed: keep the optimistic values, clear pending.
    /// Returns false when the result arrived after close and was dropped.
    pub fn confirm(&self, subject_id: &str) -> bool {
        if self.closed.load(Ordering::SeqCst) {
            return false;
        }
        {
            let mut entries = self.entries.lock().expect("relationship table poisoned");
            if let Some(entry) = entries.get_mut(subject_id) {
                entry.pending = false;
            }
        }
        self.notifier.notify();
        true
    }

    /// Server rejected: snap back to the pre-toggle values.
    pub fn revert(&self, subject_id: &str, ticket: &ToggleTicket) -> bool {
        if self.closed.load(Ordering::SeqCst) {
            return false;
        }
        {
            let mut entries = self.entries.lock().expect("relationship table poisoned");
            entries.insert(
                subject_id.to_string(),
                RelationshipState {
                    pending: false,
                    ..ticket.previous.clone()
                },
            );
        }
        self.notifier.notify();
        true
    }

    /// Screen teardown: every in-flight result hitting the table after
    /// this point is discarded instead of written.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
