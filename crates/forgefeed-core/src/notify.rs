use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

/// Reactive change signal shared by a screen's state holders.
///
/// Every state write bumps a version counter through a watch channel;
/// the render side holds a receiver and re-snapshots whenever the
/// version moves. Coarse on purpose - one signal per screen, snapshots
/// are cheap.
pub struct ChangeNotifier {
    tx: watch::Sender<u64>,
    version: AtomicU64,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(0);
        Self {
            tx,
            version: AtomicU64::new(0),
        }
    }

    /// Bump the version. Fine to call with no subscribers.
    pub fn notify(&self) {
        let v = self.version.fetch_add(1, Ordering::Relaxed) + 1;
        let _ = self.tx.send_replace(v);
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.tx.subscribe()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}
