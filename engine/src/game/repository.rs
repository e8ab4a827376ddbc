use std::collections::HashMap;

use async_trait::async_trait;
use shared::{Game, Result, Season, TimeSeriesPoint};
use uuid::Uuid;

/// Storage collaborator for the game write path.
///
/// The store is expected to provide transactional atomicity for
/// `apply_insert`: a failed call must leave sequence numbers and time series
/// exactly as they were. Serialization of same-season writers is the
/// usecase's job, not the store's.
#[async_trait]
pub trait GameRepository: Send + Sync {
    /// The season new games are recorded against, if any
    async fn active_season(&self) -> Result<Option<Season>>;

    /// A season by id; `NotFound` when it does not exist
    async fn season(&self, season_id: i64) -> Result<Season>;

    /// All games of a season in ascending seq order
    async fn season_games(&self, season_id: i64) -> Result<Vec<Game>>;

    /// The subset of `player_ids` that is not on the roster
    async fn missing_players(&self, player_ids: &[String]) -> Result<Vec<String>>;

    /// Each requested player's rating from their latest time-series point
    /// with seq strictly below `before_seq`. Players with no qualifying
    /// point are absent from the result.
    async fn ratings_before(
        &self,
        season_id: i64,
        player_ids: &[String],
        before_seq: u32,
    ) -> Result<HashMap<String, f64>>;

    /// Atomically persists a submission: inserts `game`, applies the
    /// renumbering, drops every time-series point belonging to the affected
    /// games, and inserts `points` in their place. All or nothing.
    async fn apply_insert(
        &self,
        game: Game,
        renumbered: &[(Uuid, u32)],
        points: Vec<TimeSeriesPoint>,
    ) -> Result<Game>;

    /// Removes the season's greatest-seq game, cascading to its time-series
    /// points. Never renumbers the remaining games. `NotFound` when the
    /// season has no games.
    async fn delete_latest(&self, season_id: i64) -> Result<Game>;
}
