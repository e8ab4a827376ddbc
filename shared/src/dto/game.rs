use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::game::Game;
use crate::models::timeseries::TimeSeriesPoint;

/// Inbound game submission.
///
/// `season_id` is optional; when present it must name the active season.
/// `played_at` defaults to the submission time — an earlier timestamp makes
/// this a backdated submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitGameRequest {
    pub season_id: Option<i64>,
    pub yellow_offense: String,
    pub yellow_defense: String,
    pub yellow_score: i32,
    pub black_offense: String,
    pub black_defense: String,
    pub black_score: i32,
    pub played_at: Option<DateTime<Utc>>,
}

/// A persisted game together with its four time-series points
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmittedGame {
    pub game: Game,
    pub points: Vec<TimeSeriesPoint>,
}

/// A game with the participants' post-game ratings and deltas attached,
/// as served by the game listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameWithRatingsDto {
    pub id: Uuid,
    pub season_id: i64,
    pub seq: u32,
    pub played_at: DateTime<Utc>,

    pub yellow_offense: String,
    pub yellow_defense: String,
    pub yellow_score: i32,
    pub black_offense: String,
    pub black_defense: String,
    pub black_score: i32,

    pub yellow_offense_rating: f64,
    pub yellow_offense_delta: f64,
    pub yellow_defense_rating: f64,
    pub yellow_defense_delta: f64,
    pub black_offense_rating: f64,
    pub black_offense_delta: f64,
    pub black_defense_rating: f64,
    pub black_defense_delta: f64,
}
