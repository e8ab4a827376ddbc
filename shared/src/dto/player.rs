use serde::{Deserialize, Serialize};

/// A roster entry with its season standing: current rating, participation,
/// and win rate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatedPlayerDto {
    pub id: String,
    pub name: String,
    pub color: String,
    pub rating: f64,
    pub game_count: u32,
    pub win_count: u32,
    pub win_rate: f64,
}

impl RatedPlayerDto {
    pub fn win_rate_for(wins: u32, games: u32) -> f64 {
        if games == 0 {
            0.0
        } else {
            f64::from(wins) / f64::from(games)
        }
    }
}
