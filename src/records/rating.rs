/// Standard ELO with a fixed K-factor over the binary match outcome.
pub const K_FACTOR: f64 = 32.0;
/// Rating assigned to a player's first recorded match.
pub const BASE_RATING: f64 = 1200.0;

/// Expected score of `rating` against `opponent`.
pub fn expected(rating: f64, opponent: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((opponent - rating) / 400.0))
}

/// Rating delta for one player given the match outcome.
pub fn delta(rating: f64, opponent: f64, won: bool) -> f64 {
    let outcome = if won { 1.0 } else { 0.0 };
    K_FACTOR * (outcome - expected(rating, opponent))
}
