use serde::{Deserialize, Serialize};

pub const GRID_SIZE: i32 = 20;
pub const INITIAL_SPEED_MS: u64 = 150;
pub const MIN_SPEED_MS: u64 = 50;
pub const SPEED_STEP_MS: u64 = 2;
pub const FOOD_SCORE: u32 = 10;
pub const INITIAL_SNAKE_LENGTH: usize = 3;

/// Tunables a game is created with. Restarts reuse the settings of the previous state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnakeSettings {
    pub grid_size: i32,
    pub initial_speed_ms: u64,
    pub min_speed_ms: u64,
    pub speed_step_ms: u64,
    pub food_score: u32,
    pub initial_length: usize,
}

impl Default for SnakeSettings {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            initial_speed_ms: INITIAL_SPEED_MS,
            min_speed_ms: MIN_SPEED_MS,
            speed_step_ms: SPEED_STEP_MS,
            food_score: FOOD_SCORE,
            initial_length: INITIAL_SNAKE_LENGTH,
        }
    }
}

impl SnakeSettings {
    pub fn with_grid_size(grid_size: i32) -> Self {
        Self {
            grid_size,
            ..Default::default()
        }
    }

    /// Tick interval after eating once at `current_ms`.
    pub fn accelerated(&self, current_ms: u64) -> u64 {
        current_ms
            .saturating_sub(self.speed_step_ms)
            .max(self.min_speed_ms)
    }
}
