use std::collections::HashMap;
use std::sync::Arc;

use shared::{Result, SharedError};

use crate::config::RatingConfig;

/// Fixed win-score reference used by the legacy flat strategy, which was
/// calibrated against games played to five
pub const FLAT_WIN_SCORE: f64 = 5.0;

/// A pure, deterministic rating adjustment for one game.
///
/// `actual_score_diff` is always positive (ties are rejected upstream);
/// `rating_diff` is the winning team's pre-game rating minus the losing
/// team's, so favourites have it positive and upsets negative. The returned
/// delta is non-negative and is applied `+d` to the winners and `-d` to the
/// losers.
pub trait DeltaStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn delta(&self, actual_score_diff: f64, rating_diff: f64, win_score: f64) -> f64;

    /// The `win_score` the strategy was calibrated with: the winning team's
    /// literal score for the score-aware variants, a fixed reference for the
    /// flat one. Changing a strategy's convention would change historical
    /// rating values.
    fn win_score_reference(&self, winning_score: i32) -> f64 {
        f64::from(winning_score)
    }
}

/// Score differential the rating gap predicts: a logistic curve centred at 0
/// with horizontal scale 40, spanning (-win_score, win_score)
fn expected_score_diff(rating_diff: f64, win_score: f64) -> f64 {
    (2.0 / (1.0 + (-rating_diff / 40.0).exp()) - 1.0) * win_score
}

/// Large when the winners scored more than expected, small when less;
/// bounded in (0.25, 1.75)
fn error_coef(error: f64) -> f64 {
    1.5 / (1.0 + (-error).exp()) + 0.25
}

/// Small for favourites, large for underdogs; bounded in (0.25, 1.75)
fn rating_diff_coef(rating_diff: f64, scale: f64) -> f64 {
    1.5 / (1.0 + (rating_diff / scale).exp()) + 0.25
}

/// `delta = actual_score_diff²`. Ignores the rating gap entirely.
pub struct SquareDifferential;

impl DeltaStrategy for SquareDifferential {
    fn name(&self) -> &'static str {
        "square_differential"
    }

    fn delta(&self, actual_score_diff: f64, _rating_diff: f64, _win_score: f64) -> f64 {
        actual_score_diff.powi(2)
    }
}

/// Current tuning: compares the actual score differential against the one the
/// rating gap predicted, then squashes the combined result so a single game
/// moves a rating by less than 40 points either way.
pub struct SigmoidDifferential;

impl DeltaStrategy for SigmoidDifferential {
    fn name(&self) -> &'static str {
        "sigmoid_differential"
    }

    fn delta(&self, actual_score_diff: f64, rating_diff: f64, win_score: f64) -> f64 {
        let error = actual_score_diff - expected_score_diff(rating_diff, win_score);
        let delta = actual_score_diff.powf(1.3)
            * error_coef(error)
            * rating_diff_coef(rating_diff, 40.0);
        // Squash into (-40, 40)
        (40.0 / (1.0 + (-delta / 30.0).exp()) - 20.0) * 2.0
    }
}

/// Flat delta magnitude attenuated by the rating gap only: favourites who win
/// collect less than underdogs who win. Calibrated against a fixed win score,
/// not the game's.
pub struct MinScaledFlatScore {
    pub flat_delta: f64,
}

impl DeltaStrategy for MinScaledFlatScore {
    fn name(&self) -> &'static str {
        "min_scaled_flat_score"
    }

    fn delta(&self, _actual_score_diff: f64, rating_diff: f64, _win_score: f64) -> f64 {
        self.flat_delta * (1.0 / (1.0 + (rating_diff / 40.0).exp()))
    }

    fn win_score_reference(&self, _winning_score: i32) -> f64 {
        FLAT_WIN_SCORE
    }
}

/// Earlier tuning revision, kept selectable so seasons scored with it stay
/// reproducible: squared differential with the error and rating-gap
/// coefficients, the gap coefficient on a tighter scale, and no squashing.
pub struct ScaledSquareDifferential;

impl DeltaStrategy for ScaledSquareDifferential {
    fn name(&self) -> &'static str {
        "scaled_square_differential"
    }

    fn delta(&self, actual_score_diff: f64, rating_diff: f64, win_score: f64) -> f64 {
        let error = actual_score_diff - expected_score_diff(rating_diff, win_score);
        actual_score_diff.powi(2) * error_coef(error) * rating_diff_coef(rating_diff, 10.0)
    }
}

/// Earlier tuning revision between `scaled_square_differential` and
/// `sigmoid_differential`: the softened exponent and wide gap scale, without
/// the final squash
pub struct ScaledTranslatedDifferential;

impl DeltaStrategy for ScaledTranslatedDifferential {
    fn name(&self) -> &'static str {
        "scaled_translated_differential"
    }

    fn delta(&self, actual_score_diff: f64, rating_diff: f64, win_score: f64) -> f64 {
        let error = actual_score_diff - expected_score_diff(rating_diff, win_score);
        actual_score_diff.powf(1.3) * error_coef(error) * rating_diff_coef(rating_diff, 40.0)
    }
}

/// Maps season rating-method names to their strategy implementation.
///
/// Seasons reference strategies by name; resolution fails loudly on an
/// unknown name rather than falling back to a default, which would silently
/// rescore history.
pub struct StrategyRegistry {
    strategies: HashMap<&'static str, Arc<dyn DeltaStrategy>>,
}

impl StrategyRegistry {
    pub fn empty() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    /// All known strategies, flat delta taken from config
    pub fn with_defaults(config: &RatingConfig) -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(SquareDifferential));
        registry.register(Arc::new(SigmoidDifferential));
        registry.register(Arc::new(MinScaledFlatScore {
            flat_delta: config.flat_delta,
        }));
        registry.register(Arc::new(ScaledSquareDifferential));
        registry.register(Arc::new(ScaledTranslatedDifferential));
        registry
    }

    pub fn register(&mut self, strategy: Arc<dyn DeltaStrategy>) {
        self.strategies.insert(strategy.name(), strategy);
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<dyn DeltaStrategy>> {
        self.strategies
            .get(name)
            .cloned()
            .ok_or_else(|| SharedError::UnknownRatingMethod(name.to_string()))
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::with_defaults(&RatingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use test_case::test_case;

    #[test_case(1.0, 1.0; "one goal margin")]
    #[test_case(3.0, 9.0; "three goal margin")]
    #[test_case(5.0, 25.0; "shutout at five")]
    fn test_square_differential(diff: f64, expected: f64) {
        let strategy = SquareDifferential;
        assert_relative_eq!(strategy.delta(diff, 0.0, 5.0), expected);
        // Rating gap must not matter
        assert_relative_eq!(strategy.delta(diff, 250.0, 5.0), expected);
        assert_relative_eq!(strategy.delta(diff, -250.0, 5.0), expected);
    }

    #[test]
    fn test_expected_score_diff_bounds() {
        // Even teams predict an even game
        assert_relative_eq!(expected_score_diff(0.0, 5.0), 0.0);
        // The prediction saturates at the win score
        assert!(expected_score_diff(1000.0, 5.0) < 5.0);
        assert!(expected_score_diff(1000.0, 5.0) > 4.9);
        assert!(expected_score_diff(-1000.0, 5.0) > -5.0);
    }

    #[test]
    fn test_sigmoid_differential_bounded() {
        let strategy = SigmoidDifferential;
        for rating_diff in [-400.0, -40.0, 0.0, 40.0, 400.0] {
            for score_diff in [1.0, 3.0, 5.0] {
                let d = strategy.delta(score_diff, rating_diff, 5.0);
                assert!(d > -40.0 && d < 40.0, "delta {} out of bounds", d);
                assert!(d > 0.0, "delta {} should be positive", d);
            }
        }
    }

    #[test]
    fn test_sigmoid_differential_rewards_upsets() {
        let strategy = SigmoidDifferential;
        let upset = strategy.delta(3.0, -100.0, 5.0);
        let expected_win = strategy.delta(3.0, 100.0, 5.0);
        assert!(upset > expected_win);
    }

    #[test]
    fn test_sigmoid_differential_grows_with_margin() {
        let strategy = SigmoidDifferential;
        let narrow = strategy.delta(1.0, 0.0, 5.0);
        let wide = strategy.delta(5.0, 0.0, 5.0);
        assert!(wide > narrow);
    }

    #[test]
    fn test_min_scaled_flat_score() {
        let strategy = MinScaledFlatScore { flat_delta: 20.0 };
        // Even teams split the flat delta exactly in half
        assert_relative_eq!(strategy.delta(3.0, 0.0, FLAT_WIN_SCORE), 10.0);
        // Margin is ignored
        assert_relative_eq!(
            strategy.delta(1.0, 0.0, FLAT_WIN_SCORE),
            strategy.delta(5.0, 0.0, FLAT_WIN_SCORE)
        );
        // Favourites collect less than underdogs
        let favourite = strategy.delta(3.0, 80.0, FLAT_WIN_SCORE);
        let underdog = strategy.delta(3.0, -80.0, FLAT_WIN_SCORE);
        assert!(favourite < 10.0);
        assert!(underdog > 10.0);
        assert!(underdog < 20.0);
    }

    #[test]
    fn test_flat_win_score_reference_is_fixed() {
        let strategy = MinScaledFlatScore { flat_delta: 20.0 };
        assert_relative_eq!(strategy.win_score_reference(8), FLAT_WIN_SCORE);

        // Score-aware variants take the literal winning score
        assert_relative_eq!(SigmoidDifferential.win_score_reference(8), 8.0);
        assert_relative_eq!(ScaledSquareDifferential.win_score_reference(10), 10.0);
    }

    #[test]
    fn test_legacy_variants_unsquashed() {
        // The historical revisions can exceed the sigmoid bound on blowouts
        let square = ScaledSquareDifferential.delta(10.0, -100.0, 10.0);
        assert!(square > 40.0);

        let translated = ScaledTranslatedDifferential.delta(3.0, 0.0, 5.0);
        let sigmoid = SigmoidDifferential.delta(3.0, 0.0, 5.0);
        assert!(translated != sigmoid);
    }

    #[test]
    fn test_strategies_deterministic() {
        let registry = StrategyRegistry::default();
        for name in [
            "square_differential",
            "sigmoid_differential",
            "min_scaled_flat_score",
            "scaled_square_differential",
            "scaled_translated_differential",
        ] {
            let strategy = registry.resolve(name).unwrap();
            let a = strategy.delta(3.0, 25.0, 5.0);
            let b = strategy.delta(3.0, 25.0, 5.0);
            assert_eq!(a, b, "{} must be deterministic", name);
        }
    }

    #[test]
    fn test_registry_unknown_name() {
        let registry = StrategyRegistry::default();
        let result = registry.resolve("glicko2");
        assert!(matches!(
            result,
            Err(shared::SharedError::UnknownRatingMethod(_))
        ));
    }

    #[test]
    fn test_registry_custom_flat_delta() {
        let registry = StrategyRegistry::with_defaults(&RatingConfig {
            base_rating: 500.0,
            flat_delta: 30.0,
        });
        let strategy = registry.resolve("min_scaled_flat_score").unwrap();
        assert_relative_eq!(strategy.delta(2.0, 0.0, FLAT_WIN_SCORE), 15.0);
    }
}
