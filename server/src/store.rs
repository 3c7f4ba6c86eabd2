use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use snake_common::games::SessionRng;
use snake_common::games::snake::{ActivePlayer, GameMode};
use snake_common::id_generator::{generate_player_name, generate_session_token};
use snake_common::{EntryId, PlayerId, SessionToken, UserId, log};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub id: EntryId,
    pub username: String,
    pub score: u32,
    pub mode: GameMode,
    pub date: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: SessionToken,
    pub user: User,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreError {
    UserExists,
    InvalidCredentials,
    NotAuthenticated,
    InvalidInput(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::UserExists => write!(f, "User already exists"),
            StoreError::InvalidCredentials => write!(f, "Invalid email or password"),
            StoreError::NotAuthenticated => write!(f, "Must be logged in to submit score"),
            StoreError::InvalidInput(reason) => write!(f, "Invalid input: {}", reason),
        }
    }
}

impl std::error::Error for StoreError {}

struct StoreInner {
    users: Vec<User>,
    sessions: HashMap<SessionToken, UserId>,
    leaderboard: Vec<LeaderboardEntry>,
    active_players: Vec<ActivePlayer>,
    token_rng: SessionRng,
}

impl StoreInner {
    /// A user holds at most one session; logging in again hands back the live token.
    fn open_session(&mut self, user: User) -> Session {
        let existing = self
            .sessions
            .iter()
            .find(|(_, user_id)| **user_id == user.id)
            .map(|(token, _)| token.clone());

        let token = existing.unwrap_or_else(|| {
            let token = SessionToken::new(generate_session_token(&mut self.token_rng));
            self.sessions.insert(token.clone(), user.id.clone());
            token
        });
        Session { token, user }
    }

    fn user_for(&self, token: &SessionToken) -> Option<&User> {
        let user_id = self.sessions.get(token)?;
        self.users.iter().find(|u| &u.id == user_id)
    }
}

/// In-memory users, sessions, leaderboard and watch list. Created once per process and shared by
/// cloning the handle.
#[derive(Clone)]
pub struct Store {
    inner: Arc<Mutex<StoreInner>>,
}

const DEMO_PLAYER_NAMES: [&str; 3] = ["LivePlayer1", "StreamSnake", "ProGamer99"];

fn seed_date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| d.and_utc())
        .unwrap_or_else(Utc::now)
}

fn require(field: &str, value: &str) -> Result<(), StoreError> {
    if value.trim().is_empty() {
        return Err(StoreError::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(())
}

impl Store {
    /// Demo users, a pre-filled leaderboard and `simulated_players` watchable players.
    ///
    /// `rng` only shapes the demo players; session tokens always come from an unseeded generator.
    pub fn with_demo_data(simulated_players: usize, grid_size: i32, mut rng: SessionRng) -> Self {
        let users = vec![
            User {
                id: UserId::new("1"),
                username: "SnakeMaster".to_string(),
                email: "snake@example.com".to_string(),
                created_at: seed_date(2024, 1, 1),
            },
            User {
                id: UserId::new("2"),
                username: "NeonGamer".to_string(),
                email: "neon@example.com".to_string(),
                created_at: seed_date(2024, 2, 15),
            },
        ];

        let leaderboard = [
            ("SnakeMaster", 2500, GameMode::Walls, 1),
            ("NeonGamer", 2100, GameMode::Walls, 5),
            ("PixelPro", 1850, GameMode::PassThrough, 3),
            ("RetroKing", 1720, GameMode::Walls, 2),
            ("ArcadeQueen", 1650, GameMode::PassThrough, 4),
            ("CyberSnake", 1500, GameMode::Walls, 6),
            ("GlowWorm", 1420, GameMode::PassThrough, 1),
            ("NightCrawler", 1350, GameMode::Walls, 5),
            ("ElectricEel", 1280, GameMode::PassThrough, 3),
            ("GridRunner", 1200, GameMode::Walls, 2),
        ]
        .into_iter()
        .enumerate()
        .map(|(idx, (username, score, mode, day))| LeaderboardEntry {
            id: EntryId::new((idx + 1).to_string()),
            username: username.to_string(),
            score,
            mode,
            date: seed_date(2024, 12, day),
        })
        .collect();

        let now = Utc::now();
        let active_players = (0..simulated_players)
            .map(|idx| {
                let mode = if idx % 2 == 0 {
                    GameMode::Walls
                } else {
                    GameMode::PassThrough
                };
                let started_at = now - Duration::seconds(rng.random_range(0..300));
                let username = match DEMO_PLAYER_NAMES.get(idx) {
                    Some(name) => name.to_string(),
                    None => generate_player_name(&mut rng),
                };
                let mut player = ActivePlayer::spawn(
                    PlayerId::new(format!("active-{}", idx + 1)),
                    username,
                    mode,
                    grid_size,
                    started_at,
                    &mut rng,
                );
                player.score = rng.random_range(0..50) * 10;
                player
            })
            .collect();

        Self {
            inner: Arc::new(Mutex::new(StoreInner {
                users,
                sessions: HashMap::new(),
                leaderboard,
                active_players,
                token_rng: SessionRng::from_random(),
            })),
        }
    }

    pub async fn signup(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Session, StoreError> {
        require("username", username)?;
        require("email", email)?;
        require("password", password)?;

        let mut inner = self.inner.lock().await;
        if inner
            .users
            .iter()
            .any(|u| u.email == email || u.username == username)
        {
            return Err(StoreError::UserExists);
        }

        let user = User {
            id: UserId::new((inner.users.len() + 1).to_string()),
            username: username.to_string(),
            email: email.to_string(),
            created_at: Utc::now(),
        };
        inner.users.push(user.clone());
        log!("User {} signed up", user.username);

        Ok(inner.open_session(user))
    }

    /// The mock backend only checks that the e-mail belongs to a known user.
    pub async fn login(&self, email: &str, _password: &str) -> Result<Session, StoreError> {
        let mut inner = self.inner.lock().await;
        let user = inner
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(StoreError::InvalidCredentials)?;

        log!("User {} logged in", user.username);
        Ok(inner.open_session(user))
    }

    pub async fn logout(&self, token: &SessionToken) -> bool {
        self.inner.lock().await.sessions.remove(token).is_some()
    }

    pub async fn current_user(&self, token: &SessionToken) -> Option<User> {
        self.inner.lock().await.user_for(token).cloned()
    }

    /// Entries sorted by score, highest first, optionally restricted to one mode.
    pub async fn leaderboard(&self, mode: Option<GameMode>) -> Vec<LeaderboardEntry> {
        let inner = self.inner.lock().await;
        let mut entries: Vec<LeaderboardEntry> = inner
            .leaderboard
            .iter()
            .filter(|e| mode.is_none_or(|m| e.mode == m))
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries
    }

    pub async fn submit_score(
        &self,
        token: &SessionToken,
        score: u32,
        mode: GameMode,
    ) -> Result<LeaderboardEntry, StoreError> {
        let mut inner = self.inner.lock().await;
        let username = inner
            .user_for(token)
            .map(|u| u.username.clone())
            .ok_or(StoreError::NotAuthenticated)?;

        let entry = LeaderboardEntry {
            id: EntryId::new((inner.leaderboard.len() + 1).to_string()),
            username,
            score,
            mode,
            date: Utc::now(),
        };
        inner.leaderboard.push(entry.clone());
        log!("{} submitted {} points in {} mode", entry.username, score, mode);

        Ok(entry)
    }

    pub async fn active_players(&self) -> Vec<ActivePlayer> {
        self.inner.lock().await.active_players.clone()
    }

    pub async fn active_player(&self, id: &PlayerId) -> Option<ActivePlayer> {
        self.inner
            .lock()
            .await
            .active_players
            .iter()
            .find(|p| &p.id == id)
            .cloned()
    }

    pub async fn replace_active_player(&self, player: ActivePlayer) -> bool {
        let mut inner = self.inner.lock().await;
        match inner.active_players.iter_mut().find(|p| p.id == player.id) {
            Some(slot) => {
                *slot = player;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> Store {
        Store::with_demo_data(3, 20, SessionRng::new(42))
    }

    #[tokio::test]
    async fn test_login_with_known_email() {
        let session = store().login("snake@example.com", "password").await.unwrap();
        assert_eq!(session.user.username, "SnakeMaster");
        assert!(!session.token.as_str().is_empty());
    }

    #[tokio::test]
    async fn test_tokens_do_not_follow_the_seed() {
        let first = Store::with_demo_data(3, 20, SessionRng::new(1));
        let second = Store::with_demo_data(3, 20, SessionRng::new(1));
        let a = first.login("snake@example.com", "").await.unwrap().token;
        let b = second.login("snake@example.com", "").await.unwrap().token;
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_login_again_reuses_session() {
        let store = store();
        let first = store.login("snake@example.com", "").await.unwrap();
        let second = store.login("snake@example.com", "").await.unwrap();
        assert_eq!(first.token, second.token);
        assert_eq!(store.inner.lock().await.sessions.len(), 1);

        let other = store.login("neon@example.com", "").await.unwrap();
        assert_ne!(other.token, first.token);
        assert_eq!(store.inner.lock().await.sessions.len(), 2);
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let err = store().login("nobody@example.com", "password").await.unwrap_err();
        assert_eq!(err, StoreError::InvalidCredentials);
        assert_eq!(err.to_string(), "Invalid email or password");
    }

    #[tokio::test]
    async fn test_signup_new_user() {
        let store = store();
        let session = store.signup("NewPlayer", "new@example.com", "secret").await.unwrap();
        assert_eq!(session.user.username, "NewPlayer");
        assert_eq!(session.user.id, UserId::new("3"));
        assert_eq!(store.current_user(&session.token).await, Some(session.user));
    }

    #[tokio::test]
    async fn test_signup_existing_user() {
        let store = store();
        let by_email = store.signup("Other", "snake@example.com", "secret").await;
        assert_eq!(by_email.unwrap_err(), StoreError::UserExists);
        let by_name = store.signup("NeonGamer", "fresh@example.com", "secret").await;
        assert_eq!(by_name.unwrap_err(), StoreError::UserExists);
    }

    #[tokio::test]
    async fn test_signup_requires_fields() {
        let err = store().signup("  ", "a@example.com", "secret").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_logout_clears_session() {
        let store = store();
        let session = store.login("neon@example.com", "password").await.unwrap();
        assert!(store.logout(&session.token).await);
        assert_eq!(store.current_user(&session.token).await, None);
        assert!(!store.logout(&session.token).await);
    }

    #[tokio::test]
    async fn test_leaderboard_sorted_descending() {
        let entries = store().leaderboard(None).await;
        assert_eq!(entries.len(), 10);
        assert!(entries.windows(2).all(|w| w[0].score >= w[1].score));
        assert_eq!(entries[0].username, "SnakeMaster");
    }

    #[tokio::test]
    async fn test_leaderboard_filtered_by_mode() {
        let entries = store().leaderboard(Some(GameMode::PassThrough)).await;
        assert_eq!(entries.len(), 4);
        assert!(entries.iter().all(|e| e.mode == GameMode::PassThrough));
    }

    #[tokio::test]
    async fn test_submit_score_when_logged_in() {
        let store = store();
        let session = store.login("snake@example.com", "password").await.unwrap();
        let entry = store
            .submit_score(&session.token, 3000, GameMode::Walls)
            .await
            .unwrap();
        assert_eq!(entry.username, "SnakeMaster");
        assert_eq!(entry.id, EntryId::new("11"));
        let top = store.leaderboard(Some(GameMode::Walls)).await;
        assert_eq!(top[0].score, 3000);
    }

    #[tokio::test]
    async fn test_submit_score_requires_session() {
        let err = store()
            .submit_score(&SessionToken::new("bogus"), 100, GameMode::Walls)
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::NotAuthenticated);
    }

    #[tokio::test]
    async fn test_active_players_seeded() {
        let players = store().active_players().await;
        assert_eq!(players.len(), 3);
        assert_eq!(players[0].id, PlayerId::new("active-1"));
        let names: Vec<&str> = players.iter().map(|p| p.username.as_str()).collect();
        assert_eq!(names, ["LivePlayer1", "StreamSnake", "ProGamer99"]);
        assert_eq!(players[0].mode, GameMode::Walls);
        assert_eq!(players[1].mode, GameMode::PassThrough);
        assert!(players.iter().all(|p| p.score < 500 && p.score % 10 == 0));
    }

    #[tokio::test]
    async fn test_extra_players_get_generated_names() {
        let players = Store::with_demo_data(5, 20, SessionRng::new(42)).active_players().await;
        assert_eq!(players.len(), 5);
        assert_eq!(players[2].username, "ProGamer99");
        assert!(players[3..].iter().all(|p| !p.username.is_empty()));
        assert_eq!(players[4].id, PlayerId::new("active-5"));
    }

    #[tokio::test]
    async fn test_active_player_lookup_and_replace() {
        let store = store();
        let id = PlayerId::new("active-2");
        let mut player = store.active_player(&id).await.unwrap();
        player.score += 10;
        assert!(store.replace_active_player(player.clone()).await);
        assert_eq!(store.active_player(&id).await, Some(player));
        assert_eq!(store.active_player(&PlayerId::new("missing")).await, None);
    }
}
