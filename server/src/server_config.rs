use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use snake_common::config::Validate;
use snake_common::games::snake::SnakeSettings;
use snake_common::logger::LogLevel;

pub const DEFAULT_CONFIG_PATH: &str = "snake_server.yaml";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub static_dir: Option<String>,
    pub grid_size: i32,
    pub initial_speed_ms: u64,
    pub min_speed_ms: u64,
    pub speed_step_ms: u64,
    pub watch_tick_interval_ms: u64,
    pub simulated_players: usize,
    pub log_level: LogLevel,
    pub seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let snake = SnakeSettings::default();
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
            static_dir: None,
            grid_size: snake.grid_size,
            initial_speed_ms: snake.initial_speed_ms,
            min_speed_ms: snake.min_speed_ms,
            speed_step_ms: snake.speed_step_ms,
            watch_tick_interval_ms: 200,
            simulated_players: 3,
            log_level: LogLevel::Info,
            seed: None,
        }
    }
}

impl ServerConfig {
    pub fn snake_settings(&self) -> SnakeSettings {
        SnakeSettings {
            grid_size: self.grid_size,
            initial_speed_ms: self.initial_speed_ms,
            min_speed_ms: self.min_speed_ms,
            speed_step_ms: self.speed_step_ms,
            ..SnakeSettings::default()
        }
    }

    pub fn watch_tick_interval(&self) -> Duration {
        Duration::from_millis(self.watch_tick_interval_ms)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        self.bind_address
            .parse()
            .map_err(|e| format!("Invalid bind address '{}': {}", self.bind_address, e))
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), String> {
        self.socket_addr()?;
        if !(5..=100).contains(&self.grid_size) {
            return Err("Grid size must be between 5 and 100".to_string());
        }
        if self.min_speed_ms < 1 {
            return Err("Minimum speed must be at least 1ms".to_string());
        }
        if !(50..=5000).contains(&self.initial_speed_ms) {
            return Err("Initial speed must be between 50ms and 5000ms".to_string());
        }
        if self.initial_speed_ms < self.min_speed_ms {
            return Err("Initial speed must not be below the minimum speed".to_string());
        }
        if !(20..=5000).contains(&self.watch_tick_interval_ms) {
            return Err("Watch tick interval must be between 20ms and 5000ms".to_string());
        }
        if self.simulated_players > 32 {
            return Err("At most 32 simulated players are supported".to_string());
        }
        Ok(())
    }
}
