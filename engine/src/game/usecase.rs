use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info};
use shared::{Game, Result, SharedError, SubmitGameRequest, SubmittedGame};
use uuid::Uuid;

use crate::game::repository::GameRepository;
use crate::game::sequencer;
use crate::rating::delta::StrategyRegistry;
use crate::rating::recompute::replay;

#[async_trait]
pub trait GameUseCase: Send + Sync {
    /// Records a game against the active season and derives its time-series
    /// points, renumbering and recomputing the affected suffix when the
    /// submission is backdated.
    async fn submit_game(&self, request: SubmitGameRequest) -> Result<SubmittedGame>;

    /// Removes the season's most recent game and its points. The tail-only
    /// rule means no other game is ever renumbered by a deletion.
    async fn delete_latest_game(&self, season_id: i64) -> Result<Game>;
}

/// One writer per season at a time. Writers to different seasons take
/// different locks and never wait on each other.
#[derive(Default)]
struct SeasonLocks {
    locks: Mutex<HashMap<i64, Arc<tokio::sync::Mutex<()>>>>,
}

impl SeasonLocks {
    fn for_season(&self, season_id: i64) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(season_id).or_default().clone()
    }
}

pub struct GameUseCaseImpl<R: GameRepository> {
    repo: R,
    strategies: StrategyRegistry,
    season_locks: SeasonLocks,
}

impl<R: GameRepository> GameUseCaseImpl<R> {
    pub fn new(repo: R, strategies: StrategyRegistry) -> Self {
        Self {
            repo,
            strategies,
            season_locks: SeasonLocks::default(),
        }
    }
}

#[async_trait]
impl<R: GameRepository> GameUseCase for GameUseCaseImpl<R> {
    async fn submit_game(&self, request: SubmitGameRequest) -> Result<SubmittedGame> {
        let season = self
            .repo
            .active_season()
            .await?
            .ok_or_else(|| SharedError::NoActiveSeason("no season is currently active".into()))?;
        if let Some(target) = request.season_id {
            if target != season.id {
                return Err(SharedError::NoActiveSeason(format!(
                    "season {} is not the active season",
                    target
                )));
            }
        }

        // Resolve before touching anything; an unknown method must never
        // leave a game behind without points
        let strategy = self.strategies.resolve(&season.rating_method)?;

        let mut game = Game {
            id: Uuid::new_v4(),
            season_id: season.id,
            yellow_offense: request.yellow_offense,
            yellow_defense: request.yellow_defense,
            yellow_score: request.yellow_score,
            black_offense: request.black_offense,
            black_defense: request.black_defense,
            black_score: request.black_score,
            played_at: request.played_at.unwrap_or_else(Utc::now),
            seq: 0,
        };
        game.validate_match()?;

        let participants: Vec<String> = game.player_ids().map(str::to_string).to_vec();
        let missing = self.repo.missing_players(&participants).await?;
        if !missing.is_empty() {
            return Err(SharedError::NotFound(format!(
                "players not on the roster: {}",
                missing.join(", ")
            )));
        }

        let season_lock = self.season_locks.for_season(season.id);
        let _writer = season_lock.lock().await;

        let existing = self.repo.season_games(season.id).await?;
        let plan = sequencer::plan_insert(&existing, game.played_at);
        game.seq = plan.seq;

        // Affected suffix in final seq order: the new game first, then the
        // shifted games in their preserved relative order
        let shifted: HashMap<Uuid, u32> = plan.renumbered.iter().copied().collect();
        let mut affected = Vec::with_capacity(plan.renumbered.len() + 1);
        affected.push(game.clone());
        for g in &existing {
            if let Some(&new_seq) = shifted.get(&g.id) {
                let mut g = g.clone();
                g.seq = new_seq;
                affected.push(g);
            }
        }

        let mut players: Vec<String> = affected
            .iter()
            .flat_map(|g| g.player_ids().map(str::to_string))
            .collect();
        players.sort();
        players.dedup();

        let snapshot = self
            .repo
            .ratings_before(season.id, &players, plan.seq)
            .await?;
        let points = replay(&affected, &snapshot, season.base_rating, strategy.as_ref())?;

        let game = self
            .repo
            .apply_insert(game, &plan.renumbered, points.clone())
            .await?;

        if plan.is_backdated() {
            info!(
                "Backdated game {} into season {} at seq {}: {} games renumbered, {} points replaced",
                game.id,
                season.id,
                game.seq,
                plan.renumbered.len(),
                points.len()
            );
        } else {
            debug!("Recorded game {} in season {} at seq {}", game.id, season.id, game.seq);
        }

        let own_points = points
            .into_iter()
            .filter(|p| p.game_id == game.id)
            .collect();
        Ok(SubmittedGame {
            game,
            points: own_points,
        })
    }

    async fn delete_latest_game(&self, season_id: i64) -> Result<Game> {
        let season_lock = self.season_locks.for_season(season_id);
        let _writer = season_lock.lock().await;

        let game = self.repo.delete_latest(season_id).await?;
        info!(
            "Deleted latest game {} (seq {}) from season {}",
            game.id, game.seq, season_id
        );
        Ok(game)
    }
}
