use crate::games::SessionRng;

const ADJECTIVES: &[&str] = &[
    "Swift", "Neon", "Retro", "Pixel", "Silent", "Golden", "Wild", "Electric",
    "Cyber", "Glow", "Quick", "Arcade", "Bold", "Night", "Cunning", "Sly",
];

const NOUNS: &[&str] = &[
    "Cobra", "Viper", "Python", "Adder", "Mamba", "Worm", "Eel", "Crawler",
    "Runner", "Gamer", "Racer", "Striker", "Coil", "Fang", "Slither", "Sidewinder",
];

/// Display name for a simulated player, e.g. `NeonViper42`.
pub fn generate_player_name(rng: &mut SessionRng) -> String {
    let adjective = rng.pick(ADJECTIVES).copied().unwrap_or("Lone");
    let noun = rng.pick(NOUNS).copied().unwrap_or("Snake");
    let suffix: u32 = rng.random_range(1..100);
    format!("{}{}{}", adjective, noun, suffix)
}

/// Opaque hex token for an authenticated session.
pub fn generate_session_token(rng: &mut SessionRng) -> String {
    let high: u64 = rng.random();
    let low: u64 = rng.random();
    format!("{:016x}{:016x}", high, low)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_name_shape() {
        let mut rng = SessionRng::new(42);
        let name = generate_player_name(&mut rng);
        assert!(ADJECTIVES.iter().any(|a| name.starts_with(a)));
        assert!(name.chars().last().is_some_and(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_session_token_is_hex() {
        let mut rng = SessionRng::new(42);
        let token = generate_session_token(&mut rng);
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
