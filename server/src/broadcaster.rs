use std::sync::Arc;

use tokio::sync::broadcast;

use snake_common::games::snake::ActivePlayer;

const WATCH_CHANNEL_CAPACITY: usize = 64;

/// Fans out simulated player snapshots to every connected watcher.
#[derive(Clone)]
pub struct WatchBroadcaster {
    sender: broadcast::Sender<Arc<ActivePlayer>>,
}

impl std::fmt::Debug for WatchBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchBroadcaster")
            .field("watchers", &self.sender.receiver_count())
            .finish()
    }
}

impl Default for WatchBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl WatchBroadcaster {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(WATCH_CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<ActivePlayer>> {
        self.sender.subscribe()
    }

    pub fn watcher_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Returns the number of watchers reached; zero when nobody is subscribed.
    pub fn publish(&self, player: ActivePlayer) -> usize {
        self.sender.send(Arc::new(player)).unwrap_or(0)
    }
}
