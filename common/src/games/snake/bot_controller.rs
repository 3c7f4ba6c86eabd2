use chrono::{DateTime, Utc};

use crate::games::SessionRng;
use crate::log_debug;
use super::active_player::ActivePlayer;
use super::game_state::{check_self_collision, generate_food, next_head};
use super::settings::FOOD_SCORE;
use super::types::{Direction, Point};

/// One-step greedy driver for simulated players.
pub struct BotController;

impl BotController {
    /// Best non-reversing move towards the food, or `None` when every candidate is fatal.
    pub fn choose_direction(player: &ActivePlayer, grid_size: i32) -> Option<Direction> {
        let mut best: Option<(Direction, i32)> = None;

        for direction in Self::get_valid_directions(player.direction) {
            let Some(candidate) = Self::safe_next_head(player, direction, grid_size) else {
                continue;
            };

            let distance = candidate.manhattan_distance(player.food);
            if best.is_none_or(|(_, best_distance)| distance < best_distance) {
                best = Some((direction, distance));
            }
        }

        best.map(|(direction, _)| direction)
    }

    pub fn step(player: &ActivePlayer, grid_size: i32, rng: &mut SessionRng) -> ActivePlayer {
        Self::step_at(player, grid_size, rng, Utc::now())
    }

    /// Moves the player one cell. A cornered player keeps its heading; if that move is fatal too
    /// the player respawns on a fresh board started at `now`.
    pub fn step_at(
        player: &ActivePlayer,
        grid_size: i32,
        rng: &mut SessionRng,
        now: DateTime<Utc>,
    ) -> ActivePlayer {
        let direction = Self::choose_direction(player, grid_size).unwrap_or(player.direction);

        let Some(new_head) = Self::safe_next_head(player, direction, grid_size) else {
            log_debug!(
                "[{}] {} cornered at ({}, {}) with score {}, respawning",
                player.id,
                player.username,
                player.snake.head().x,
                player.snake.head().y,
                player.score
            );
            return player.respawned(grid_size, now, rng);
        };

        let ate_food = new_head == player.food;
        let snake = player.snake.advanced(new_head, ate_food);

        let (score, food) = if ate_food {
            (player.score + FOOD_SCORE, generate_food(&snake, grid_size, rng))
        } else {
            (player.score, player.food)
        };

        ActivePlayer {
            snake,
            food,
            score,
            direction,
            ..player.clone()
        }
    }

    fn get_valid_directions(current: Direction) -> impl Iterator<Item = Direction> {
        Direction::ALL
            .into_iter()
            .filter(move |d| !d.is_opposite(&current))
    }

    fn safe_next_head(player: &ActivePlayer, direction: Direction, grid_size: i32) -> Option<Point> {
        let head = next_head(player.snake.head(), direction, player.mode, grid_size).ok()?;
        if check_self_collision(head, &player.snake) {
            return None;
        }
        Some(head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PlayerId;
    use crate::games::snake::{GameMode, Snake};

    fn player(mode: GameMode, segments: &[(i32, i32)], direction: Direction, food: (i32, i32)) -> ActivePlayer {
        ActivePlayer {
            id: PlayerId::new("active-1"),
            username: "LivePlayer1".to_string(),
            score: 0,
            mode,
            snake: Snake::from_segments(segments.iter().map(|&(x, y)| Point::new(x, y))),
            food: Point::new(food.0, food.1),
            direction,
            started_at: Utc::now(),
        }
    }

    #[test]
    fn test_moves_towards_food() {
        let p = player(GameMode::Walls, &[(10, 10), (9, 10), (8, 10)], Direction::Right, (15, 10));
        let next = BotController::step(&p, 20, &mut SessionRng::new(42));
        assert_eq!(next.direction, Direction::Right);
        assert_eq!(next.snake.head(), Point::new(11, 10));
        assert_eq!(next.snake.len(), 3);
        assert_eq!(next.score, 0);
    }

    #[test]
    fn test_turns_towards_food() {
        let p = player(GameMode::Walls, &[(10, 10), (9, 10), (8, 10)], Direction::Right, (10, 2));
        assert_eq!(BotController::choose_direction(&p, 20), Some(Direction::Up));
    }

    #[test]
    fn test_never_reverses_and_breaks_ties_in_order() {
        let p = player(GameMode::Walls, &[(10, 10), (9, 10), (8, 10)], Direction::Right, (0, 10));
        let direction = BotController::choose_direction(&p, 20);
        assert_ne!(direction, Some(Direction::Left));
        assert_eq!(direction, Some(Direction::Up));
    }

    #[test]
    fn test_eats_food() {
        let p = player(GameMode::Walls, &[(10, 10), (9, 10), (8, 10)], Direction::Right, (11, 10));
        let next = BotController::step(&p, 20, &mut SessionRng::new(42));
        assert_eq!(next.score, 10);
        assert_eq!(next.snake.len(), 4);
        assert!(!next.snake.contains(next.food));
    }

    #[test]
    fn test_wraps_in_pass_through_mode() {
        let p = player(GameMode::PassThrough, &[(19, 10), (18, 10), (17, 10)], Direction::Right, (0, 10));
        let next = BotController::step(&p, 20, &mut SessionRng::new(42));
        assert_eq!(next.direction, Direction::Right);
        assert_eq!(next.snake.head(), Point::new(0, 10));
        assert_eq!(next.score, 10);
    }

    #[test]
    fn test_avoids_walls_in_walls_mode() {
        let p = player(GameMode::Walls, &[(19, 10), (18, 10), (17, 10)], Direction::Right, (0, 10));
        let next = BotController::step(&p, 20, &mut SessionRng::new(42));
        assert_eq!(next.direction, Direction::Up);
        assert!(next.snake.head().is_inside(20));
    }

    #[test]
    fn test_avoids_own_body() {
        let p = player(
            GameMode::Walls,
            &[(5, 5), (5, 6), (6, 6), (6, 5), (6, 4)],
            Direction::Up,
            (9, 5),
        );
        let direction = BotController::choose_direction(&p, 20);
        assert_ne!(direction, Some(Direction::Right));
        assert_eq!(direction, Some(Direction::Up));
    }

    #[test]
    fn test_cornered_player_respawns() {
        let p = player(GameMode::Walls, &[(0, 0), (1, 0), (1, 1), (0, 1)], Direction::Left, (5, 5));
        assert_eq!(BotController::choose_direction(&p, 20), None);

        let now = Utc::now();
        let next = BotController::step_at(&p, 20, &mut SessionRng::new(42), now);
        assert_eq!(next.id, p.id);
        assert_eq!(next.score, 0);
        assert_eq!(next.snake.head(), Point::new(10, 10));
        assert_eq!(next.snake.len(), 3);
        assert_eq!(next.direction, Direction::Right);
        assert_eq!(next.started_at, now);
    }

    #[test]
    fn test_long_run_stays_on_grid() {
        let mut rng = SessionRng::new(7);
        let mut p = ActivePlayer::spawn(
            PlayerId::new("active-3"),
            "ProGamer99".to_string(),
            GameMode::Walls,
            20,
            Utc::now(),
            &mut rng,
        );
        for _ in 0..2000 {
            p = BotController::step(&p, 20, &mut rng);
            assert!(p.snake.segments().all(|s| s.is_inside(20)));
            assert!(!p.snake.collides_with_body(p.snake.head()));
        }
    }
}
