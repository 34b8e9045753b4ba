//! Warehouse layer: schema migrations, row models and the repository that
//! owns every SQL statement, including the rolling-indicator queries.

mod migrations;
mod models;
mod queries;
mod repository;

pub use migrations::run_migrations;
pub use models::{
    BollingerPoint, ChampionStats, LiveSnapshotRow, MatchRow, ParticipantRow, PlayerStats,
    RsiPoint,
};
pub use repository::Repository;
