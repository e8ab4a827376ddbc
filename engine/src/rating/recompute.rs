use std::collections::HashMap;

use shared::{Game, Result, SharedError, TimeSeriesPoint};

use super::delta::DeltaStrategy;
use super::engine::apply_match;

/// Replays the affected suffix of a season, producing the replacement
/// time-series points.
///
/// `games` must be the affected games in ascending final sequence order;
/// `snapshot` is each touched player's rating immediately before the first of
/// them (players absent from it start from `base_rating`). The fold carries
/// the evolving ratings forward, so a player skipping a game keeps their
/// carried rating for the next one.
///
/// Pure and deterministic: identical inputs produce identical points, which
/// is what makes the atomic replace idempotent.
pub fn replay(
    games: &[Game],
    snapshot: &HashMap<String, f64>,
    base_rating: f64,
    strategy: &dyn DeltaStrategy,
) -> Result<Vec<TimeSeriesPoint>> {
    debug_assert!(
        games.windows(2).all(|w| w[0].seq < w[1].seq),
        "affected games must be in ascending sequence order"
    );

    let mut current = snapshot.clone();
    let mut points = Vec::with_capacity(games.len() * 4);
    for game in games {
        let mut pre_ratings = HashMap::with_capacity(4);
        for player_id in game.player_ids() {
            let rating = current.get(player_id).copied().unwrap_or(base_rating);
            pre_ratings.insert(player_id.to_string(), rating);
        }

        let updates = apply_match(game, &pre_ratings, strategy)?;
        for player_id in game.player_ids() {
            let update = updates.get(player_id).ok_or_else(|| {
                SharedError::Internal(format!("no rating update produced for {}", player_id))
            })?;
            points.push(TimeSeriesPoint {
                game_id: game.id,
                player_id: player_id.to_string(),
                rating: update.rating,
                delta: update.delta,
                win: update.win,
            });
            current.insert(player_id.to_string(), update.rating);
        }
    }
    Ok(points)
}
