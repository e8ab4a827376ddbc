use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One player's recorded outcome for one game: the rating immediately after
/// the game, the signed delta that produced it, and whether the player was on
/// the winning side.
///
/// Points are owned by their game (deleted with it) and, ordered by the
/// game's seq, form each player's season rating walk: every point's rating
/// equals the previous point's rating (or the season base rating) plus this
/// point's delta.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeSeriesPoint {
    pub game_id: Uuid,
    pub player_id: String,
    pub rating: f64,
    pub delta: f64,
    pub win: bool,
}
