use std::collections::HashMap;

use shared::{Game, Result, SharedError};

use super::delta::DeltaStrategy;

/// One player's outcome of applying a game: the post-game rating, the signed
/// delta, and whether the player was on the winning side
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchUpdate {
    pub rating: f64,
    pub delta: f64,
    pub win: bool,
}

struct Team<'a> {
    offense: &'a str,
    defense: &'a str,
    score: i32,
}

impl<'a> Team<'a> {
    fn rating(&self, pre_ratings: &HashMap<String, f64>) -> Result<f64> {
        Ok((pre_rating(pre_ratings, self.offense)? + pre_rating(pre_ratings, self.defense)?) / 2.0)
    }
}

fn pre_rating(pre_ratings: &HashMap<String, f64>, player_id: &str) -> Result<f64> {
    pre_ratings
        .get(player_id)
        .copied()
        .ok_or_else(|| SharedError::Internal(format!("missing pre-game rating for {}", player_id)))
}

/// Applies one game to the given pre-game ratings.
///
/// Team ratings are the mean of the two players' pre-game ratings; the
/// strategy's delta is added to both winners and subtracted from both losers.
/// Pure: reads nothing but its arguments, touches no storage.
///
/// Invalid games (tie, negative score, repeated player) are rejected here
/// again even though submission already validates, so a corrupted record can
/// never silently score.
pub fn apply_match(
    game: &Game,
    pre_ratings: &HashMap<String, f64>,
    strategy: &dyn DeltaStrategy,
) -> Result<HashMap<String, MatchUpdate>> {
    game.validate_match()?;

    let yellow = Team {
        offense: &game.yellow_offense,
        defense: &game.yellow_defense,
        score: game.yellow_score,
    };
    let black = Team {
        offense: &game.black_offense,
        defense: &game.black_defense,
        score: game.black_score,
    };
    let (win_team, lose_team) = if yellow.score > black.score {
        (yellow, black)
    } else {
        (black, yellow)
    };

    let rating_diff = win_team.rating(pre_ratings)? - lose_team.rating(pre_ratings)?;
    let actual_score_diff = f64::from(win_team.score - lose_team.score);
    let d = strategy.delta(
        actual_score_diff,
        rating_diff,
        strategy.win_score_reference(win_team.score),
    );

    let mut updates = HashMap::with_capacity(4);
    for player_id in [win_team.offense, win_team.defense] {
        let pre = pre_rating(pre_ratings, player_id)?;
        updates.insert(
            player_id.to_string(),
            MatchUpdate {
                rating: pre + d,
                delta: d,
                win: true,
            },
        );
    }
    for player_id in [lose_team.offense, lose_team.defense] {
        let pre = pre_rating(pre_ratings, player_id)?;
        updates.insert(
            player_id.to_string(),
            MatchUpdate {
                rating: pre - d,
                delta: -d,
                win: false,
            },
        );
    }
    Ok(updates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::delta::{SigmoidDifferential, SquareDifferential};
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn game(yellow_score: i32, black_score: i32) -> Game {
        Game {
            id: Uuid::new_v4(),
            season_id: 1,
            yellow_offense: "ann".to_string(),
            yellow_defense: "bob".to_string(),
            yellow_score,
            black_offense: "cat".to_string(),
            black_defense: "dan".to_string(),
            black_score,
            played_at: Utc.with_ymd_and_hms(2025, 1, 1, 18, 0, 0).unwrap(),
            seq: 1,
        }
    }

    fn even_ratings() -> HashMap<String, f64> {
        ["ann", "bob", "cat", "dan"]
            .iter()
            .map(|id| (id.to_string(), 500.0))
            .collect()
    }

    #[test]
    fn test_square_differential_five_two() {
        // 5-2 under square_differential moves everyone by exactly 9
        let updates = apply_match(&game(5, 2), &even_ratings(), &SquareDifferential).unwrap();

        assert_eq!(updates["ann"].rating, 509.0);
        assert_eq!(updates["ann"].delta, 9.0);
        assert!(updates["ann"].win);
        assert_eq!(updates["bob"].rating, 509.0);
        assert_eq!(updates["cat"].rating, 491.0);
        assert_eq!(updates["cat"].delta, -9.0);
        assert!(!updates["cat"].win);
        assert_eq!(updates["dan"].rating, 491.0);
    }

    #[test]
    fn test_black_side_can_win() {
        let updates = apply_match(&game(1, 4), &even_ratings(), &SquareDifferential).unwrap();

        assert!(updates["cat"].win);
        assert!(updates["dan"].win);
        assert!(!updates["ann"].win);
        assert_eq!(updates["cat"].delta, 9.0);
        assert_eq!(updates["ann"].delta, -9.0);
    }

    #[test]
    fn test_team_rating_is_mean() {
        let mut pre = even_ratings();
        pre.insert("ann".to_string(), 600.0);
        pre.insert("bob".to_string(), 400.0);
        // Yellow's mean is 500, same as black's, so the rating gap is zero
        let updates = apply_match(&game(5, 2), &pre, &SigmoidDifferential).unwrap();
        let zero_gap = SigmoidDifferential.delta(3.0, 0.0, 5.0);
        assert!((updates["ann"].delta - zero_gap).abs() < 1e-12);
    }

    #[test]
    fn test_symmetric_under_side_swap() {
        // Relabelling the teams (and swapping the scores with them) must not
        // change anyone's outcome
        let pre = even_ratings();
        let straight = apply_match(&game(5, 2), &pre, &SigmoidDifferential).unwrap();

        let mut swapped_game = game(2, 5);
        swapped_game.yellow_offense = "cat".to_string();
        swapped_game.yellow_defense = "dan".to_string();
        swapped_game.black_offense = "ann".to_string();
        swapped_game.black_defense = "bob".to_string();
        let swapped = apply_match(&swapped_game, &pre, &SigmoidDifferential).unwrap();

        for id in ["ann", "bob", "cat", "dan"] {
            assert_eq!(straight[id], swapped[id], "outcome changed for {}", id);
        }
    }

    #[test]
    fn test_winner_and_loser_deltas_negate() {
        let updates = apply_match(&game(5, 2), &even_ratings(), &SigmoidDifferential).unwrap();
        assert_eq!(updates["ann"].delta, -updates["cat"].delta);
        assert_eq!(updates["bob"].delta, -updates["dan"].delta);
    }

    #[test]
    fn test_tie_rejected_defensively() {
        let result = apply_match(&game(3, 3), &even_ratings(), &SquareDifferential);
        assert!(matches!(result, Err(SharedError::InvalidMatch(_))));
    }

    #[test]
    fn test_negative_score_rejected_defensively() {
        let result = apply_match(&game(-1, 3), &even_ratings(), &SquareDifferential);
        assert!(matches!(result, Err(SharedError::InvalidMatch(_))));
    }

    #[test]
    fn test_repeated_player_rejected_defensively() {
        let mut g = game(5, 2);
        g.black_offense = "ann".to_string();
        let result = apply_match(&g, &even_ratings(), &SquareDifferential);
        assert!(matches!(result, Err(SharedError::InvalidMatch(_))));
    }

    #[test]
    fn test_missing_pre_rating_is_internal_error() {
        let mut pre = even_ratings();
        pre.remove("dan");
        let result = apply_match(&game(5, 2), &pre, &SquareDifferential);
        assert!(matches!(result, Err(SharedError::Internal(_))));
    }
}
