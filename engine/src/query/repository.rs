use std::collections::HashMap;

use async_trait::async_trait;
use shared::{AsOf, Game, Player, PlayerParticipation, Result, Season, TimeSeriesPoint};

/// Read-only storage collaborator for the query layer. Implementations must
/// only ever expose fully committed state: a reader can never observe a
/// partially renumbered sequence or a half-replaced time-series suffix.
#[async_trait]
pub trait QueryRepository: Send + Sync {
    /// A season by id; `NotFound` when it does not exist
    async fn season(&self, season_id: i64) -> Result<Season>;

    /// The full roster
    async fn players(&self) -> Result<Vec<Player>>;

    /// Each requested player's most recent time-series point within the
    /// bound. Players with no qualifying point are absent from the result.
    async fn latest_points(
        &self,
        season_id: i64,
        player_ids: &[String],
        as_of: AsOf,
    ) -> Result<HashMap<String, TimeSeriesPoint>>;

    /// Per-player game and win counts over the season's time series
    async fn participation(&self, season_id: i64) -> Result<Vec<PlayerParticipation>>;

    /// Season games newest-first with their four points in slot order
    async fn games_with_points(
        &self,
        season_id: i64,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<(Game, Vec<TimeSeriesPoint>)>>;
}
