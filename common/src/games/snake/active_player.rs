use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::PlayerId;
use crate::games::SessionRng;
use super::game_state::generate_food;
use super::settings::INITIAL_SNAKE_LENGTH;
use super::snake::Snake;
use super::types::{Direction, GameMode, Point};

/// A simulated player shown in watch mode. Always playing, steered by the bot controller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivePlayer {
    pub id: PlayerId,
    pub username: String,
    pub score: u32,
    pub mode: GameMode,
    pub snake: Snake,
    pub food: Point,
    pub direction: Direction,
    pub started_at: DateTime<Utc>,
}

impl ActivePlayer {
    pub fn spawn(
        id: PlayerId,
        username: String,
        mode: GameMode,
        grid_size: i32,
        started_at: DateTime<Utc>,
        rng: &mut SessionRng,
    ) -> Self {
        let center = grid_size / 2;
        let snake = Snake::horizontal(Point::new(center, center), INITIAL_SNAKE_LENGTH);
        let food = generate_food(&snake, grid_size, rng);

        Self {
            id,
            username,
            score: 0,
            mode,
            snake,
            food,
            direction: Direction::Right,
            started_at,
        }
    }

    /// Same player identity on a fresh board.
    pub fn respawned(&self, grid_size: i32, now: DateTime<Utc>, rng: &mut SessionRng) -> Self {
        Self::spawn(
            self.id.clone(),
            self.username.clone(),
            self.mode,
            grid_size,
            now,
            rng,
        )
    }
}
