use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound for a point-in-time rating lookup
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "bound")]
pub enum AsOf {
    /// The most recent committed point
    Latest,
    /// Points with game sequence number less than or equal to the bound
    Sequence(u32),
    /// Points from games played at or before the bound
    Date(DateTime<Utc>),
}

impl Default for AsOf {
    fn default() -> Self {
        AsOf::Latest
    }
}

/// A player's rating at the requested point in time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerRatingDto {
    pub player_id: String,
    pub rating: f64,
}

/// Per-player season participation counts, aggregated over time-series points
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerParticipation {
    pub player_id: String,
    pub games: u32,
    pub wins: u32,
}
