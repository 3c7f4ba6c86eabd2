use serde::{Deserialize, Serialize};

use crate::games::SessionRng;
use super::settings::SnakeSettings;
use super::snake::Snake;
use super::types::{DeathReason, Direction, GameMode, GameStatus, Point};

/// Cell used when no free cell is left for food.
pub const FOOD_FALLBACK: Point = Point { x: 0, y: 0 };

/// Snapshot of a single-player game. Every transition takes `&self` and returns a new snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub snake: Snake,
    pub food: Point,
    /// Committed heading.
    pub direction: Direction,
    /// Heading queued for the next tick.
    pub next_direction: Direction,
    pub score: u32,
    pub high_score: u32,
    pub status: GameStatus,
    pub mode: GameMode,
    pub grid_size: i32,
    /// Tick interval in milliseconds.
    pub speed: u64,
    pub end_reason: Option<DeathReason>,
    pub settings: SnakeSettings,
}

/// Picks a uniformly random cell not covered by `snake`, or `FOOD_FALLBACK` when the grid is full.
pub fn generate_food(snake: &Snake, grid_size: i32, rng: &mut SessionRng) -> Point {
    let occupied = snake.occupied();
    let available: Vec<Point> = (0..grid_size)
        .flat_map(|x| (0..grid_size).map(move |y| Point::new(x, y)))
        .filter(|pos| !occupied.contains(pos))
        .collect();

    rng.pick(&available).copied().unwrap_or(FOOD_FALLBACK)
}

pub fn is_valid_direction_change(current: Direction, requested: Direction) -> bool {
    !current.is_opposite(&requested)
}

pub fn check_self_collision(head: Point, snake: &Snake) -> bool {
    snake.collides_with_body(head)
}

/// Head position after one step from `head`, applying the boundary rule of `mode`.
pub fn next_head(
    head: Point,
    direction: Direction,
    mode: GameMode,
    grid_size: i32,
) -> Result<Point, DeathReason> {
    let moved = head.offset(direction);
    match mode {
        GameMode::PassThrough => Ok(moved.wrapped(grid_size)),
        GameMode::Walls if moved.is_inside(grid_size) => Ok(moved),
        GameMode::Walls => Err(DeathReason::WallCollision),
    }
}

pub fn score_multiplier(mode: GameMode) -> f64 {
    mode.score_multiplier()
}

pub fn calculate_final_score(score: u32, mode: GameMode) -> u32 {
    (f64::from(score) * score_multiplier(mode)).floor() as u32
}

impl GameState {
    pub fn new(mode: GameMode, settings: SnakeSettings, rng: &mut SessionRng) -> Self {
        let center = settings.grid_size / 2;
        let snake = Snake::horizontal(Point::new(center, center), settings.initial_length);
        let food = generate_food(&snake, settings.grid_size, rng);

        Self {
            snake,
            food,
            direction: Direction::Right,
            next_direction: Direction::Right,
            score: 0,
            high_score: 0,
            status: GameStatus::Idle,
            mode,
            grid_size: settings.grid_size,
            speed: settings.initial_speed_ms,
            end_reason: None,
            settings,
        }
    }

    pub fn create_initial_state(mode: GameMode, rng: &mut SessionRng) -> Self {
        Self::new(mode, SnakeSettings::default(), rng)
    }

    pub fn is_playing(&self) -> bool {
        self.status == GameStatus::Playing
    }

    pub fn final_score(&self) -> u32 {
        calculate_final_score(self.score, self.mode)
    }

    fn fresh(&self, mode: GameMode, rng: &mut SessionRng) -> Self {
        Self {
            high_score: self.high_score,
            ..Self::new(mode, self.settings, rng)
        }
    }

    fn ended(&self, reason: DeathReason) -> Self {
        Self {
            status: GameStatus::GameOver,
            high_score: self.score.max(self.high_score),
            end_reason: Some(reason),
            ..self.clone()
        }
    }

    /// Queues `direction` for the next tick. Reversals of the committed heading are ignored.
    pub fn set_direction(&self, direction: Direction) -> Self {
        if !self.is_playing() || !is_valid_direction_change(self.direction, direction) {
            return self.clone();
        }

        Self {
            next_direction: direction,
            ..self.clone()
        }
    }

    /// Advances the game by one tick.
    pub fn move_snake(&self, rng: &mut SessionRng) -> Self {
        if !self.is_playing() {
            return self.clone();
        }

        let new_head = match next_head(self.snake.head(), self.next_direction, self.mode, self.grid_size) {
            Ok(pos) => pos,
            Err(reason) => return self.ended(reason),
        };

        if check_self_collision(new_head, &self.snake) {
            return self.ended(DeathReason::SelfCollision);
        }

        let ate_food = new_head == self.food;
        let snake = self.snake.advanced(new_head, ate_food);

        let (score, food, speed) = if ate_food {
            (
                self.score + self.settings.food_score,
                generate_food(&snake, self.grid_size, rng),
                self.settings.accelerated(self.speed),
            )
        } else {
            (self.score, self.food, self.speed)
        };

        Self {
            snake,
            food,
            direction: self.next_direction,
            score,
            speed,
            ..self.clone()
        }
    }

    /// Idle and finished games restart from scratch keeping the high score; paused games resume.
    pub fn start_game(&self, rng: &mut SessionRng) -> Self {
        match self.status {
            GameStatus::Playing => self.clone(),
            GameStatus::Idle | GameStatus::GameOver => Self {
                status: GameStatus::Playing,
                ..self.fresh(self.mode, rng)
            },
            GameStatus::Paused => Self {
                status: GameStatus::Playing,
                ..self.clone()
            },
        }
    }

    pub fn pause_game(&self) -> Self {
        if self.status != GameStatus::Playing {
            return self.clone();
        }
        Self {
            status: GameStatus::Paused,
            ..self.clone()
        }
    }

    pub fn resume_game(&self) -> Self {
        if self.status != GameStatus::Paused {
            return self.clone();
        }
        Self {
            status: GameStatus::Playing,
            ..self.clone()
        }
    }

    pub fn toggle_pause(&self) -> Self {
        match self.status {
            GameStatus::Playing => self.pause_game(),
            GameStatus::Paused => self.resume_game(),
            GameStatus::Idle | GameStatus::GameOver => self.clone(),
        }
    }

    pub fn reset_game(&self, rng: &mut SessionRng) -> Self {
        self.fresh(self.mode, rng)
    }

    /// Only accepted while idle or after game over. Always rebuilds the board, even for the same mode.
    pub fn set_game_mode(&self, mode: GameMode, rng: &mut SessionRng) -> Self {
        match self.status {
            GameStatus::Idle | GameStatus::GameOver => self.fresh(mode, rng),
            GameStatus::Playing | GameStatus::Paused => self.clone(),
        }
    }
}
