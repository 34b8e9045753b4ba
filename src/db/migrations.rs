use sqlx::SqlitePool;
use tracing::info;

use crate::error::AppError;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS matches (
    match_id TEXT PRIMARY KEY,
    game_creation INTEGER NOT NULL,
    game_duration INTEGER NOT NULL,
    game_mode TEXT NOT NULL,
    game_type TEXT NOT NULL,
    queue_id INTEGER NOT NULL,
    inserted_at INTEGER NOT NULL DEFAULT (unixepoch())
);

CREATE TABLE IF NOT EXISTS participants (
    match_id TEXT NOT NULL,
    puuid TEXT NOT NULL,
    summoner_name TEXT NOT NULL,
    champion_name TEXT NOT NULL,
    kills INTEGER NOT NULL,
    deaths INTEGER NOT NULL,
    assists INTEGER NOT NULL,
    gold_earned INTEGER NOT NULL,
    total_damage_dealt INTEGER NOT NULL,
    vision_score INTEGER NOT NULL,
    kda_ratio REAL NOT NULL,
    gold_per_minute REAL NOT NULL,
    damage_per_minute REAL NOT NULL,
    vision_score_per_minute REAL NOT NULL,
    win INTEGER NOT NULL,
    PRIMARY KEY (match_id, puuid),
    FOREIGN KEY (match_id) REFERENCES matches(match_id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS live_snapshots (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    game_id INTEGER NOT NULL,
    puuid TEXT NOT NULL,
    summoner_name TEXT NOT NULL,
    platform_id TEXT NOT NULL,
    game_mode TEXT NOT NULL,
    game_length INTEGER NOT NULL,
    captured_at INTEGER NOT NULL DEFAULT (unixepoch())
);

CREATE INDEX IF NOT EXISTS idx_participants_summoner ON participants(summoner_name);
CREATE INDEX IF NOT EXISTS idx_participants_match ON participants(match_id);
CREATE INDEX IF NOT EXISTS idx_live_snapshots_game ON live_snapshots(game_id);
"#;

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    info!("🗄️ Database migrations completed");
    Ok(())
}
