pub mod models {
    pub mod game;
    pub mod player;
    pub mod season;
    pub mod timeseries;
}

pub mod dto {
    pub mod game;
    pub mod player;
    pub mod ratings;
}

pub mod error;

// Re-export commonly used items
pub use error::{Result, SharedError};

// Re-export models
pub use models::{game::Game, player::Player, season::Season, timeseries::TimeSeriesPoint};

// Re-export DTOs
pub use dto::{
    game::{GameWithRatingsDto, SubmitGameRequest, SubmittedGame},
    player::RatedPlayerDto,
    ratings::{AsOf, PlayerParticipation, PlayerRatingDto},
};
