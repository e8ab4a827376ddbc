pub mod config;

pub mod rating {
    pub mod delta;
    pub mod engine;
    pub mod recompute;

    pub use delta::{DeltaStrategy, StrategyRegistry};
    pub use engine::{apply_match, MatchUpdate};
    pub use recompute::replay;
}

pub mod game {
    pub mod repository;
    pub mod sequencer;
    pub mod usecase;

    pub use repository::GameRepository;
    pub use sequencer::{plan_insert, InsertPlan};
    pub use usecase::{GameUseCase, GameUseCaseImpl};
}

pub mod query {
    pub mod repository;
    pub mod usecase;

    pub use repository::QueryRepository;
    pub use usecase::{QueryUseCase, QueryUseCaseImpl};
}

pub mod storage {
    pub mod memory;

    pub use memory::MemoryStore;
}

pub use config::{Config, Environment, RatingConfig};
