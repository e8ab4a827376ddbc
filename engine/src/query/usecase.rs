use std::collections::HashMap;

use async_trait::async_trait;
use shared::{
    AsOf, GameWithRatingsDto, PlayerRatingDto, RatedPlayerDto, Result, SharedError,
    TimeSeriesPoint,
};

use crate::query::repository::QueryRepository;

#[async_trait]
pub trait QueryUseCase: Send + Sync {
    /// Each requested player's rating as of the given bound, defaulting to
    /// the season base rating for players with no qualifying point
    async fn latest_ratings(
        &self,
        season_id: i64,
        player_ids: &[String],
        as_of: AsOf,
    ) -> Result<Vec<PlayerRatingDto>>;

    /// Season standings per participating player: current rating, games,
    /// wins, win rate. Ordered by player name.
    async fn season_stats(&self, season_id: i64) -> Result<Vec<RatedPlayerDto>>;

    /// Season games newest-first with the participants' post-game ratings
    /// and deltas attached
    async fn recent_games(
        &self,
        season_id: i64,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<GameWithRatingsDto>>;
}

pub struct QueryUseCaseImpl<R: QueryRepository> {
    repo: R,
}

impl<R: QueryRepository> QueryUseCaseImpl<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl<R: QueryRepository> QueryUseCase for QueryUseCaseImpl<R> {
    async fn latest_ratings(
        &self,
        season_id: i64,
        player_ids: &[String],
        as_of: AsOf,
    ) -> Result<Vec<PlayerRatingDto>> {
        let season = self.repo.season(season_id).await?;
        let points = self.repo.latest_points(season_id, player_ids, as_of).await?;

        Ok(player_ids
            .iter()
            .map(|player_id| PlayerRatingDto {
                player_id: player_id.clone(),
                rating: points
                    .get(player_id)
                    .map_or(season.base_rating, |p| p.rating),
            })
            .collect())
    }

    async fn season_stats(&self, season_id: i64) -> Result<Vec<RatedPlayerDto>> {
        let participation = self.repo.participation(season_id).await?;
        let player_ids: Vec<String> = participation.iter().map(|p| p.player_id.clone()).collect();
        let points = self
            .repo
            .latest_points(season_id, &player_ids, AsOf::Latest)
            .await?;
        let roster: HashMap<String, _> = self
            .repo
            .players()
            .await?
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();
        let season = self.repo.season(season_id).await?;

        let mut stats = Vec::with_capacity(participation.len());
        for entry in participation {
            let player = roster.get(&entry.player_id).ok_or_else(|| {
                SharedError::Internal(format!("player {} missing from roster", entry.player_id))
            })?;
            stats.push(RatedPlayerDto {
                id: player.id.clone(),
                name: player.name.clone(),
                color: player.color.clone(),
                rating: points
                    .get(&entry.player_id)
                    .map_or(season.base_rating, |p| p.rating),
                game_count: entry.games,
                win_count: entry.wins,
                win_rate: RatedPlayerDto::win_rate_for(entry.wins, entry.games),
            });
        }
        stats.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(stats)
    }

    async fn recent_games(
        &self,
        season_id: i64,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<GameWithRatingsDto>> {
        let games = self
            .repo
            .games_with_points(season_id, limit, offset)
            .await?;

        games
            .into_iter()
            .map(|(game, points)| {
                let (yo_rating, yo_delta) = slot_point(&points, &game, &game.yellow_offense)?;
                let (yd_rating, yd_delta) = slot_point(&points, &game, &game.yellow_defense)?;
                let (bo_rating, bo_delta) = slot_point(&points, &game, &game.black_offense)?;
                let (bd_rating, bd_delta) = slot_point(&points, &game, &game.black_defense)?;
                Ok(GameWithRatingsDto {
                    yellow_offense_rating: yo_rating,
                    yellow_offense_delta: yo_delta,
                    yellow_defense_rating: yd_rating,
                    yellow_defense_delta: yd_delta,
                    black_offense_rating: bo_rating,
                    black_offense_delta: bo_delta,
                    black_defense_rating: bd_rating,
                    black_defense_delta: bd_delta,
                    id: game.id,
                    season_id: game.season_id,
                    seq: game.seq,
                    played_at: game.played_at,
                    yellow_offense: game.yellow_offense,
                    yellow_defense: game.yellow_defense,
                    yellow_score: game.yellow_score,
                    black_offense: game.black_offense,
                    black_defense: game.black_defense,
                    black_score: game.black_score,
                })
            })
            .collect()
    }
}

fn slot_point(
    points: &[TimeSeriesPoint],
    game: &shared::Game,
    player_id: &str,
) -> Result<(f64, f64)> {
    points
        .iter()
        .find(|p| p.player_id == player_id)
        .map(|p| (p.rating, p.delta))
        .ok_or_else(|| {
            SharedError::Internal(format!(
                "game {} has no time-series point for {}",
                game.id, player_id
            ))
        })
}
