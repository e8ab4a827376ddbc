use chrono::{DateTime, Utc};
use shared::Game;
use uuid::Uuid;

/// Where a new game lands in its season's sequence, and which existing games
/// must shift to make room.
///
/// The new game's seq is the start of the affected suffix; `renumbered` holds
/// `(game_id, new_seq)` for every existing game whose number moved, in
/// ascending order.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertPlan {
    pub seq: u32,
    pub renumbered: Vec<(Uuid, u32)>,
}

impl InsertPlan {
    pub fn is_backdated(&self) -> bool {
        !self.renumbered.is_empty()
    }
}

/// Plans the sequence assignment for a game played at `played_at`.
///
/// `ordered` is the season's games in ascending seq order. A timestamp at or
/// after the season's latest game appends (`last + 1`, nothing moves). An
/// earlier timestamp is a backdated insert: the new game takes `k + 1`, where
/// `k` is the greatest seq among games played at or before `played_at`, and
/// every seq from `k + 1` up shifts by one, preserving relative order.
///
/// Keeps seq numbers a gap-free `1..=count` and never orders an earlier
/// timestamp after a later one.
pub fn plan_insert(ordered: &[Game], played_at: DateTime<Utc>) -> InsertPlan {
    debug_assert!(
        ordered.windows(2).all(|w| w[0].seq < w[1].seq),
        "season games must be in ascending sequence order"
    );

    match ordered.last() {
        None => InsertPlan {
            seq: 1,
            renumbered: Vec::new(),
        },
        Some(last) if played_at >= last.played_at => InsertPlan {
            seq: last.seq + 1,
            renumbered: Vec::new(),
        },
        Some(_) => {
            let k = ordered
                .iter()
                .filter(|g| g.played_at <= played_at)
                .map(|g| g.seq)
                .max()
                .unwrap_or(0);
            let seq = k + 1;
            let renumbered = ordered
                .iter()
                .filter(|g| g.seq >= seq)
                .map(|g| (g.id, g.seq + 1))
                .collect();
            InsertPlan { seq, renumbered }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, hour, 0, 0).unwrap()
    }

    fn game(seq: u32, played_at: DateTime<Utc>) -> Game {
        Game {
            id: Uuid::new_v4(),
            season_id: 1,
            yellow_offense: "ann".to_string(),
            yellow_defense: "bob".to_string(),
            yellow_score: 5,
            black_offense: "cat".to_string(),
            black_defense: "dan".to_string(),
            black_score: 2,
            played_at,
            seq,
        }
    }

    #[test]
    fn test_first_game_takes_seq_one() {
        let plan = plan_insert(&[], at(12));
        assert_eq!(plan.seq, 1);
        assert!(!plan.is_backdated());
    }

    #[test]
    fn test_append_takes_next_seq() {
        let games = vec![game(1, at(10)), game(2, at(11))];
        let plan = plan_insert(&games, at(12));
        assert_eq!(plan.seq, 3);
        assert!(plan.renumbered.is_empty());
    }

    #[test]
    fn test_equal_timestamp_appends() {
        // A game sharing the latest timestamp lands after it, not before
        let games = vec![game(1, at(10)), game(2, at(11))];
        let plan = plan_insert(&games, at(11));
        assert_eq!(plan.seq, 3);
        assert!(plan.renumbered.is_empty());
    }

    #[test]
    fn test_backdated_insert_shifts_suffix() {
        let games = vec![game(1, at(9)), game(2, at(10)), game(3, at(11))];
        let plan = plan_insert(&games, at(10).checked_add_signed(chrono::Duration::minutes(30)).unwrap());

        assert_eq!(plan.seq, 3);
        assert_eq!(plan.renumbered, vec![(games[2].id, 4)]);
        assert!(plan.is_backdated());
    }

    #[test]
    fn test_backdated_before_everything() {
        let games = vec![game(1, at(9)), game(2, at(10))];
        let plan = plan_insert(&games, at(8));

        assert_eq!(plan.seq, 1);
        assert_eq!(
            plan.renumbered,
            vec![(games[0].id, 2), (games[1].id, 3)]
        );
    }

    #[test]
    fn test_backdated_equal_timestamp_lands_after_it() {
        let games = vec![game(1, at(9)), game(2, at(10)), game(3, at(11))];
        let plan = plan_insert(&games, at(9));

        // Goes after the existing 09:00 game, shifting the later two
        assert_eq!(plan.seq, 2);
        assert_eq!(
            plan.renumbered,
            vec![(games[1].id, 3), (games[2].id, 4)]
        );
    }

    proptest! {
        #[test]
        fn prop_final_seqs_are_contiguous(hours in proptest::collection::vec(0u32..24, 1..12), new_hour in 0u32..24) {
            // Build a season by inserting in the given timestamp order,
            // applying each plan as the store would
            let mut games: Vec<Game> = Vec::new();
            for hour in hours {
                let plan = plan_insert(&games, at(hour));
                for (id, seq) in &plan.renumbered {
                    let g = games.iter_mut().find(|g| g.id == *id).unwrap();
                    g.seq = *seq;
                }
                games.push(game(plan.seq, at(hour)));
                games.sort_by_key(|g| g.seq);
            }

            let plan = plan_insert(&games, at(new_hour));
            for (id, seq) in &plan.renumbered {
                let g = games.iter_mut().find(|g| g.id == *id).unwrap();
                g.seq = *seq;
            }
            games.push(game(plan.seq, at(new_hour)));
            games.sort_by_key(|g| g.seq);

            // Gap-free 1..=count
            for (i, g) in games.iter().enumerate() {
                prop_assert_eq!(g.seq as usize, i + 1);
            }
            // Order consistent with timestamps
            for w in games.windows(2) {
                prop_assert!(w[0].played_at <= w[1].played_at);
            }
        }
    }
}
