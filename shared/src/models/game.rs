use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::{Result, SharedError};

/// A recorded two-on-two game.
///
/// `seq` is the game's position in its season's scored history: unique,
/// gap-free from 1, and consistent with non-decreasing `played_at` order.
/// The sequencer owns its assignment; everything else treats it as read-only.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct Game {
    /// Game id, assigned at submission
    pub id: Uuid,

    /// Season this game was recorded in
    pub season_id: i64,

    pub yellow_offense: String,
    pub yellow_defense: String,
    #[validate(range(min = 0, message = "Score must be non-negative"))]
    pub yellow_score: i32,

    pub black_offense: String,
    pub black_defense: String,
    #[validate(range(min = 0, message = "Score must be non-negative"))]
    pub black_score: i32,

    /// When the game was played. Backdated submissions carry an earlier
    /// timestamp than the season's latest game.
    pub played_at: DateTime<Utc>,

    /// Position in the season's scored history
    pub seq: u32,
}

impl Game {
    /// The four participants in slot order: yellow offense, yellow defense,
    /// black offense, black defense.
    pub fn player_ids(&self) -> [&str; 4] {
        [
            &self.yellow_offense,
            &self.yellow_defense,
            &self.black_offense,
            &self.black_defense,
        ]
    }

    /// Rejects ties, negative scores, and repeated players.
    pub fn validate_match(&self) -> Result<()> {
        self.validate()
            .map_err(|e| SharedError::InvalidMatch(e.to_string()))?;
        if self.yellow_score == self.black_score {
            return Err(SharedError::InvalidMatch(format!(
                "tie game ({}-{})",
                self.yellow_score, self.black_score
            )));
        }
        let players = self.player_ids();
        for i in 0..players.len() {
            for j in (i + 1)..players.len() {
                if players[i] == players[j] {
                    return Err(SharedError::InvalidMatch(format!(
                        "player {} appears in more than one slot",
                        players[i]
                    )));
                }
            }
        }
        Ok(())
    }
}
