use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use log::debug;
use shared::{
    AsOf, Game, Player, PlayerParticipation, Result, Season, SharedError, TimeSeriesPoint,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::game::repository::GameRepository;
use crate::query::repository::QueryRepository;

#[derive(Debug, Default)]
struct StoreState {
    players: HashMap<String, Player>,
    seasons: BTreeMap<i64, Season>,
    games: HashMap<Uuid, Game>,
    points: Vec<TimeSeriesPoint>,
    next_season_id: i64,
}

impl StoreState {
    fn season_games_sorted(&self, season_id: i64) -> Vec<Game> {
        let mut games: Vec<Game> = self
            .games
            .values()
            .filter(|g| g.season_id == season_id)
            .cloned()
            .collect();
        games.sort_by_key(|g| g.seq);
        games
    }

    fn season_or_not_found(&self, season_id: i64) -> Result<Season> {
        self.seasons
            .get(&season_id)
            .cloned()
            .ok_or_else(|| SharedError::NotFound(format!("season {}", season_id)))
    }
}

/// In-memory store backing the engine where no database is wired up (tests,
/// tooling, embedded use). Clones are handles onto the same state.
///
/// A single `RwLock` makes every mutation one write section, so readers only
/// ever see fully committed state — `apply_insert` checks everything first
/// and mutates after, which is what makes it all-or-nothing.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<StoreState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a player to the roster; `Conflict` when the derived id is taken
    pub async fn create_player(&self, name: &str, color: &str) -> Result<Player> {
        let player = Player::new(name, color)?;
        let mut state = self.state.write().await;
        if state.players.contains_key(&player.id) {
            return Err(SharedError::Conflict(format!(
                "player {} already exists",
                player.id
            )));
        }
        state.players.insert(player.id.clone(), player.clone());
        Ok(player)
    }

    /// Opens a season. An active season deactivates whichever season was
    /// active before, so at most one is active at a time.
    pub async fn create_season(
        &self,
        name: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        rating_method: &str,
        base_rating: f64,
        active: bool,
    ) -> Result<Season> {
        let mut state = self.state.write().await;
        state.next_season_id += 1;
        let season = Season::new(
            state.next_season_id,
            name,
            start_date,
            end_date,
            active,
            rating_method,
            base_rating,
        )?;
        if active {
            for existing in state.seasons.values_mut() {
                existing.active = false;
            }
        }
        state.seasons.insert(season.id, season.clone());
        Ok(season)
    }

    /// Makes the given season the active one
    pub async fn set_active_season(&self, season_id: i64) -> Result<Season> {
        let mut state = self.state.write().await;
        if !state.seasons.contains_key(&season_id) {
            return Err(SharedError::NotFound(format!("season {}", season_id)));
        }
        for season in state.seasons.values_mut() {
            season.active = season.id == season_id;
        }
        state.season_or_not_found(season_id)
    }

    /// Total number of stored time-series points, all seasons
    pub async fn point_count(&self) -> usize {
        self.state.read().await.points.len()
    }

    /// Number of games recorded in a season
    pub async fn game_count(&self, season_id: i64) -> usize {
        self.state
            .read()
            .await
            .games
            .values()
            .filter(|g| g.season_id == season_id)
            .count()
    }
}

#[async_trait]
impl GameRepository for MemoryStore {
    async fn active_season(&self) -> Result<Option<Season>> {
        let state = self.state.read().await;
        Ok(state.seasons.values().find(|s| s.active).cloned())
    }

    async fn season(&self, season_id: i64) -> Result<Season> {
        self.state.read().await.season_or_not_found(season_id)
    }

    async fn season_games(&self, season_id: i64) -> Result<Vec<Game>> {
        Ok(self.state.read().await.season_games_sorted(season_id))
    }

    async fn missing_players(&self, player_ids: &[String]) -> Result<Vec<String>> {
        let state = self.state.read().await;
        Ok(player_ids
            .iter()
            .filter(|id| !state.players.contains_key(*id))
            .cloned()
            .collect())
    }

    async fn ratings_before(
        &self,
        season_id: i64,
        player_ids: &[String],
        before_seq: u32,
    ) -> Result<HashMap<String, f64>> {
        let state = self.state.read().await;
        let seq_by_game: HashMap<Uuid, u32> = state
            .games
            .values()
            .filter(|g| g.season_id == season_id && g.seq < before_seq)
            .map(|g| (g.id, g.seq))
            .collect();

        let mut latest: HashMap<String, (u32, f64)> = HashMap::new();
        for point in &state.points {
            let Some(&seq) = seq_by_game.get(&point.game_id) else {
                continue;
            };
            if !player_ids.contains(&point.player_id) {
                continue;
            }
            let entry = latest.entry(point.player_id.clone()).or_insert((seq, point.rating));
            if seq >= entry.0 {
                *entry = (seq, point.rating);
            }
        }
        Ok(latest
            .into_iter()
            .map(|(player_id, (_, rating))| (player_id, rating))
            .collect())
    }

    async fn apply_insert(
        &self,
        game: Game,
        renumbered: &[(Uuid, u32)],
        points: Vec<TimeSeriesPoint>,
    ) -> Result<Game> {
        let mut state = self.state.write().await;

        // Validate the whole mutation before touching anything, so a bad
        // call leaves the store untouched
        if !state.seasons.contains_key(&game.season_id) {
            return Err(SharedError::Recompute(format!(
                "season {} does not exist",
                game.season_id
            )));
        }
        if state.games.contains_key(&game.id) {
            return Err(SharedError::Recompute(format!(
                "game {} already exists",
                game.id
            )));
        }
        for (id, _) in renumbered {
            match state.games.get(id) {
                Some(existing) if existing.season_id == game.season_id => {}
                Some(_) => {
                    return Err(SharedError::Recompute(format!(
                        "game {} belongs to another season",
                        id
                    )))
                }
                None => {
                    return Err(SharedError::Recompute(format!("game {} does not exist", id)))
                }
            }
        }

        let affected: HashSet<Uuid> = renumbered
            .iter()
            .map(|(id, _)| *id)
            .chain(std::iter::once(game.id))
            .collect();
        for point in &points {
            if !affected.contains(&point.game_id) {
                return Err(SharedError::Recompute(format!(
                    "point for game {} outside the affected set",
                    point.game_id
                )));
            }
        }

        // Final sequence numbers must stay unique within the season
        let new_seq: HashMap<Uuid, u32> = renumbered.iter().copied().collect();
        let mut seen = HashSet::new();
        let final_seqs = state
            .games
            .values()
            .filter(|g| g.season_id == game.season_id)
            .map(|g| new_seq.get(&g.id).copied().unwrap_or(g.seq))
            .chain(std::iter::once(game.seq));
        for seq in final_seqs {
            if !seen.insert(seq) {
                return Err(SharedError::Recompute(format!(
                    "duplicate sequence number {} in season {}",
                    seq, game.season_id
                )));
            }
        }

        // Commit
        for (id, seq) in renumbered {
            if let Some(existing) = state.games.get_mut(id) {
                existing.seq = *seq;
            }
        }
        state.points.retain(|p| !affected.contains(&p.game_id));
        state.points.extend(points);
        state.games.insert(game.id, game.clone());
        debug!(
            "Committed game {} at seq {} ({} renumbered)",
            game.id,
            game.seq,
            renumbered.len()
        );
        Ok(game)
    }

    async fn delete_latest(&self, season_id: i64) -> Result<Game> {
        let mut state = self.state.write().await;
        let latest = state
            .games
            .values()
            .filter(|g| g.season_id == season_id)
            .max_by_key(|g| g.seq)
            .cloned();
        let Some(game) = latest else {
            return Err(SharedError::NotFound(format!(
                "no games in season {}",
                season_id
            )));
        };
        state.games.remove(&game.id);
        state.points.retain(|p| p.game_id != game.id);
        Ok(game)
    }
}

#[async_trait]
impl QueryRepository for MemoryStore {
    async fn season(&self, season_id: i64) -> Result<Season> {
        self.state.read().await.season_or_not_found(season_id)
    }

    async fn players(&self) -> Result<Vec<Player>> {
        let state = self.state.read().await;
        let mut players: Vec<Player> = state.players.values().cloned().collect();
        players.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(players)
    }

    async fn latest_points(
        &self,
        season_id: i64,
        player_ids: &[String],
        as_of: AsOf,
    ) -> Result<HashMap<String, TimeSeriesPoint>> {
        let state = self.state.read().await;
        let in_bound: HashMap<Uuid, u32> = state
            .games
            .values()
            .filter(|g| g.season_id == season_id)
            .filter(|g| match as_of {
                AsOf::Latest => true,
                AsOf::Sequence(bound) => g.seq <= bound,
                AsOf::Date(bound) => g.played_at <= bound,
            })
            .map(|g| (g.id, g.seq))
            .collect();

        let mut latest: HashMap<String, (u32, TimeSeriesPoint)> = HashMap::new();
        for point in &state.points {
            let Some(&seq) = in_bound.get(&point.game_id) else {
                continue;
            };
            if !player_ids.contains(&point.player_id) {
                continue;
            }
            match latest.get(&point.player_id) {
                Some((existing_seq, _)) if *existing_seq > seq => {}
                _ => {
                    latest.insert(point.player_id.clone(), (seq, point.clone()));
                }
            }
        }
        Ok(latest
            .into_iter()
            .map(|(player_id, (_, point))| (player_id, point))
            .collect())
    }

    async fn participation(&self, season_id: i64) -> Result<Vec<PlayerParticipation>> {
        let state = self.state.read().await;
        let season_game_ids: HashSet<Uuid> = state
            .games
            .values()
            .filter(|g| g.season_id == season_id)
            .map(|g| g.id)
            .collect();

        let mut by_player: BTreeMap<String, PlayerParticipation> = BTreeMap::new();
        for point in &state.points {
            if !season_game_ids.contains(&point.game_id) {
                continue;
            }
            let entry = by_player
                .entry(point.player_id.clone())
                .or_insert_with(|| PlayerParticipation {
                    player_id: point.player_id.clone(),
                    games: 0,
                    wins: 0,
                });
            entry.games += 1;
            if point.win {
                entry.wins += 1;
            }
        }
        Ok(by_player.into_values().collect())
    }

    async fn games_with_points(
        &self,
        season_id: i64,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<(Game, Vec<TimeSeriesPoint>)>> {
        let state = self.state.read().await;
        let mut games = state.season_games_sorted(season_id);
        games.reverse();

        games
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|game| {
                let mut points = Vec::with_capacity(4);
                for player_id in game.player_ids() {
                    let point = state
                        .points
                        .iter()
                        .find(|p| p.game_id == game.id && p.player_id == player_id)
                        .cloned()
                        .ok_or_else(|| {
                            SharedError::Internal(format!(
                                "game {} has no point for {}",
                                game.id, player_id
                            ))
                        })?;
                    points.push(point);
                }
                Ok((game, points))
            })
            .collect()
    }
}
