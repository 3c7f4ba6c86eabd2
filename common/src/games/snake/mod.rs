mod active_player;
mod bot_controller;
mod game_state;
mod settings;
mod snake;
mod types;

pub use active_player::ActivePlayer;
pub use bot_controller::BotController;
pub use game_state::{
    FOOD_FALLBACK, GameState, calculate_final_score, check_self_collision, generate_food,
    is_valid_direction_change, next_head, score_multiplier,
};
pub use settings::{
    FOOD_SCORE, GRID_SIZE, INITIAL_SNAKE_LENGTH, INITIAL_SPEED_MS, MIN_SPEED_MS, SPEED_STEP_MS,
    SnakeSettings,
};
pub use snake::Snake;
pub use types::{DeathReason, Direction, GameMode, GameStatus, Point};
