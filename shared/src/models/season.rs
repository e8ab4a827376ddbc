use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{Result, SharedError};

/// A time-boxed partition of games with its own rating baseline and scoring
/// strategy. At most one season is active at a time; ratings never carry
/// across season boundaries.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct Season {
    /// Season id, assigned by the store
    pub id: i64,

    /// Season's display name
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    /// First day of the season
    pub start_date: NaiveDate,

    /// Last day of the season
    pub end_date: NaiveDate,

    /// Whether this is the season new games are recorded against
    pub active: bool,

    /// Name of the delta strategy every game in this season is scored with
    #[validate(length(min = 1, message = "Rating method is required"))]
    pub rating_method: String,

    /// Rating every player starts the season at
    pub base_rating: f64,
}

impl Season {
    pub fn new(
        id: i64,
        name: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        active: bool,
        rating_method: &str,
        base_rating: f64,
    ) -> Result<Self> {
        let season = Self {
            id,
            name: name.to_string(),
            start_date,
            end_date,
            active,
            rating_method: rating_method.to_string(),
            base_rating,
        };
        season.validate_fields()?;
        Ok(season)
    }

    pub fn validate_fields(&self) -> Result<()> {
        self.validate()?;
        if self.start_date >= self.end_date {
            return Err(SharedError::InvalidDateRange {
                start: self.start_date,
                end: self.end_date,
            });
        }
        Ok(())
    }
}
