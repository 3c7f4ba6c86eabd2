use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant, sleep_until};

use snake_common::games::SessionRng;
use snake_common::games::snake::{Direction, GameMode, GameState, GameStatus, SnakeSettings};
use snake_common::{SessionToken, log, log_debug, log_warn};

use crate::store::Store;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlayCommand {
    Direction { direction: Direction },
    Start,
    TogglePause,
    Reset,
    SetMode { mode: GameMode },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlayEvent {
    State {
        state: GameState,
    },
    GameOver {
        score: u32,
        final_score: u32,
        mode: GameMode,
        submitted: bool,
    },
}

/// Driving loop of one player's game. The session task is the only writer of its `GameState`.
pub struct PlaySession {
    label: String,
    state: GameState,
    rng: SessionRng,
    store: Store,
    token: Option<SessionToken>,
}

impl PlaySession {
    pub fn new(
        label: String,
        settings: SnakeSettings,
        store: Store,
        token: Option<SessionToken>,
        mut rng: SessionRng,
    ) -> Self {
        let state = GameState::new(GameMode::default(), settings, &mut rng);
        Self {
            label,
            state,
            rng,
            store,
            token,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn apply(&mut self, command: PlayCommand) {
        self.state = match command {
            PlayCommand::Direction { direction } => self.state.set_direction(direction),
            PlayCommand::Start => self.state.start_game(&mut self.rng),
            PlayCommand::TogglePause => self.state.toggle_pause(),
            PlayCommand::Reset => self.state.reset_game(&mut self.rng),
            PlayCommand::SetMode { mode } => self.state.set_game_mode(mode, &mut self.rng),
        };
    }

    /// Advances one tick. Returns true when this tick ended the game.
    pub fn tick(&mut self) -> bool {
        let was_playing = self.state.is_playing();
        self.state = self.state.move_snake(&mut self.rng);
        was_playing && self.state.status == GameStatus::GameOver
    }

    /// Reports the finished game and submits its final score for signed-in players.
    pub async fn finish_game(&self) -> PlayEvent {
        let score = self.state.score;
        let mode = self.state.mode;
        let final_score = self.state.final_score();

        log!(
            "[{}] game over ({:?}): score {}, final {} in {} mode",
            self.label,
            self.state.end_reason,
            score,
            final_score,
            mode
        );

        let submitted = match &self.token {
            Some(token) if score > 0 => match self.store.submit_score(token, final_score, mode).await {
                Ok(_) => true,
                Err(e) => {
                    log_warn!("[{}] score not submitted: {}", self.label, e);
                    false
                }
            },
            _ => false,
        };

        PlayEvent::GameOver {
            score,
            final_score,
            mode,
            submitted,
        }
    }

    fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.state.speed)
    }

    /// Runs until the command channel closes or the event receiver goes away.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<PlayCommand>,
        events: mpsc::Sender<PlayEvent>,
    ) {
        log_debug!("[{}] play session started", self.label);

        if !self.emit_state(&events).await {
            return;
        }

        let mut next_tick = Instant::now() + self.tick_interval();

        loop {
            let playing = self.state.is_playing();

            tokio::select! {
                command = commands.recv() => {
                    let Some(command) = command else {
                        break;
                    };
                    self.apply(command);
                    if !playing && self.state.is_playing() {
                        next_tick = Instant::now() + self.tick_interval();
                    }
                    if !self.emit_state(&events).await {
                        break;
                    }
                }
                _ = sleep_until(next_tick), if playing => {
                    let ended = self.tick();
                    next_tick = Instant::now() + self.tick_interval();
                    if !self.emit_state(&events).await {
                        break;
                    }
                    if ended && events.send(self.finish_game().await).await.is_err() {
                        break;
                    }
                }
            }
        }

        log_debug!("[{}] play session closed", self.label);
    }

    async fn emit_state(&self, events: &mpsc::Sender<PlayEvent>) -> bool {
        events
            .send(PlayEvent::State {
                state: self.state.clone(),
            })
            .await
            .is_ok()
    }
}
