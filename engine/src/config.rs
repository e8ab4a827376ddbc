use dotenv::dotenv;
use log::{info, warn};
use serde::Deserialize;
use std::env;

/// Rating every player starts a season at, unless overridden per season
pub const DEFAULT_BASE_RATING: f64 = 500.0;

/// Default flat delta magnitude for the `min_scaled_flat_score` strategy
pub const DEFAULT_FLAT_DELTA: f64 = 20.0;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl Default for Environment {
    fn default() -> Self {
        Environment::Development
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            "prod" | "production" => Ok(Environment::Production),
            _ => Err(format!("Unknown environment: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub environment: Environment,
    pub rating: RatingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RatingConfig {
    /// Season base rating applied when a new season is opened
    pub base_rating: f64,
    /// Flat delta magnitude for `min_scaled_flat_score`
    pub flat_delta: f64,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            base_rating: DEFAULT_BASE_RATING,
            flat_delta: DEFAULT_FLAT_DELTA,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let environment = match env::var("FOOSLINE_ENV") {
            Ok(value) => value.parse().unwrap_or_else(|e| {
                warn!("{}, falling back to development", e);
                Environment::Development
            }),
            Err(_) => Environment::Development,
        };

        let rating = RatingConfig {
            base_rating: float_env("FOOSLINE_BASE_RATING", DEFAULT_BASE_RATING),
            flat_delta: float_env("FOOSLINE_FLAT_DELTA", DEFAULT_FLAT_DELTA),
        };

        info!(
            "Loaded config: environment={:?}, base_rating={}, flat_delta={}",
            environment, rating.base_rating, rating.flat_delta
        );

        Config {
            environment,
            rating,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            rating: RatingConfig::default(),
        }
    }
}

fn float_env(key: &str, default: f64) -> f64 {
    match env::var(key) {
        Ok(value) => value.parse().unwrap_or_else(|_| {
            warn!("Invalid {} value {:?}, using default {}", key, value, default);
            default
        }),
        Err(_) => default,
    }
}
