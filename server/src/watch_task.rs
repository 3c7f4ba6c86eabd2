use std::time::Duration;

use tokio::time::MissedTickBehavior;

use snake_common::games::SessionRng;
use snake_common::games::snake::BotController;
use snake_common::{log, log_debug};

use crate::broadcaster::WatchBroadcaster;
use crate::store::Store;

/// Sole writer of the simulated players: steps each of them once per tick.
pub struct WatchTask {
    store: Store,
    broadcaster: WatchBroadcaster,
    tick_interval: Duration,
    grid_size: i32,
    rng: SessionRng,
}

impl WatchTask {
    pub fn new(
        store: Store,
        broadcaster: WatchBroadcaster,
        tick_interval: Duration,
        grid_size: i32,
        rng: SessionRng,
    ) -> Self {
        Self {
            store,
            broadcaster,
            tick_interval,
            grid_size,
            rng,
        }
    }

    pub async fn run(mut self) {
        let mut interval = tokio::time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        log!(
            "Watch task started: tick every {}ms on a {}x{} grid",
            self.tick_interval.as_millis(),
            self.grid_size,
            self.grid_size
        );

        loop {
            interval.tick().await;
            self.tick().await;
        }
    }

    pub async fn tick(&mut self) {
        for player in self.store.active_players().await {
            let next = BotController::step(&player, self.grid_size, &mut self.rng);

            if next.score > player.score {
                log_debug!("[{}] {} scored, now {}", next.id, next.username, next.score);
            }

            if !self.store.replace_active_player(next.clone()).await {
                continue;
            }
            self.broadcaster.publish(next);
        }
    }
}
