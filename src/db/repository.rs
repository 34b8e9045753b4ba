use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tracing::{debug, warn};

use super::models::{
    BollingerPoint, ChampionStats, LiveSnapshotRow, MatchRow, ParticipantRow, PlayerStats,
    RsiPoint,
};
use super::queries;
use crate::error::AppError;

/// Bounded attempts for transient write failures before the batch is dropped.
const MAX_WRITE_ATTEMPTS: u32 = 3;
const INITIAL_BACKOFF: Duration = Duration::from_millis(100);

#[derive(Clone, Debug)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // === Write path ===

    /// Stores a match and its participant rows. Idempotent on match id:
    /// returns `false` without touching anything when the match is already
    /// stored. Transient failures are retried with exponential backoff.
    pub async fn insert_match(
        &self,
        match_row: &MatchRow,
        participants: &[ParticipantRow],
    ) -> Result<bool, AppError> {
        let mut backoff = INITIAL_BACKOFF;
        let mut attempt = 1;

        loop {
            match self.try_insert_match(match_row, participants).await {
                Ok(inserted) => return Ok(inserted),
                Err(e) if is_transient(&e) && attempt < MAX_WRITE_ATTEMPTS => {
                    warn!(
                        attempt,
                        match_id = %match_row.match_id,
                        error = %e,
                        "🗄️ transient write error, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn try_insert_match(
        &self,
        match_row: &MatchRow,
        participants: &[ParticipantRow],
    ) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO matches (match_id, game_creation, game_duration, game_mode, game_type, queue_id)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(match_id) DO NOTHING
            "#,
        )
        .bind(&match_row.match_id)
        .bind(match_row.game_creation)
        .bind(match_row.game_duration)
        .bind(&match_row.game_mode)
        .bind(&match_row.game_type)
        .bind(match_row.queue_id)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            > 0;

        if !inserted {
            // Re-ingesting an already stored match is a no-op.
            debug!(match_id = %match_row.match_id, "🗄️ match already stored, skipping");
            tx.commit().await?;
            return Ok(false);
        }

        for p in participants {
            sqlx::query(
                r#"
                INSERT INTO participants (
                    match_id, puuid, summoner_name, champion_name,
                    kills, deaths, assists,
                    gold_earned, total_damage_dealt, vision_score,
                    kda_ratio, gold_per_minute, damage_per_minute, vision_score_per_minute,
                    win
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(match_id, puuid) DO NOTHING
                "#,
            )
            .bind(&p.match_id)
            .bind(&p.puuid)
            .bind(&p.summoner_name)
            .bind(&p.champion_name)
            .bind(p.kills)
            .bind(p.deaths)
            .bind(p.assists)
            .bind(p.gold_earned)
            .bind(p.total_damage_dealt)
            .bind(p.vision_score)
            .bind(p.kda_ratio)
            .bind(p.gold_per_minute)
            .bind(p.damage_per_minute)
            .bind(p.vision_score_per_minute)
            .bind(p.win)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    pub async fn has_match(&self, match_id: &str) -> Result<bool, AppError> {
        let found: Option<(String,)> =
            sqlx::query_as("SELECT match_id FROM matches WHERE match_id = ?")
                .bind(match_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(found.is_some())
    }

    pub async fn insert_live_snapshot(&self, snap: &LiveSnapshotRow) -> Result<(), AppError> {
        let mut backoff = INITIAL_BACKOFF;
        let mut attempt = 1;

        loop {
            let res = sqlx::query(
                r#"
                INSERT INTO live_snapshots (game_id, puuid, summoner_name, platform_id, game_mode, game_length, captured_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(snap.game_id)
            .bind(&snap.puuid)
            .bind(&snap.summoner_name)
            .bind(&snap.platform_id)
            .bind(&snap.game_mode)
            .bind(snap.game_length)
            .bind(snap.captured_at)
            .execute(&self.pool)
            .await;

            match res {
                Ok(_) => return Ok(()),
                Err(e) if is_transient(&e) && attempt < MAX_WRITE_ATTEMPTS => {
                    warn!(attempt, error = %e, "🗄️ transient snapshot write error, retrying");
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    // === Indicator and stat queries ===

    pub async fn rsi(&self, summoner_name: &str, limit: i64) -> Result<Vec<RsiPoint>, AppError> {
        let points = sqlx::query_as::<_, RsiPoint>(queries::RSI)
            .bind(summoner_name)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(points)
    }

    pub async fn bollinger_bands(
        &self,
        summoner_name: &str,
        limit: i64,
    ) -> Result<Vec<BollingerPoint>, AppError> {
        let rows = sqlx::query_as::<_, BollingerWindowRow>(queries::BOLLINGER_BANDS)
            .bind(summoner_name)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(BollingerWindowRow::into_point).collect())
    }

    pub async fn match_history(
        &self,
        summoner_name: &str,
        limit: i64,
    ) -> Result<Vec<ParticipantRow>, AppError> {
        let rows = sqlx::query_as::<_, ParticipantRow>(queries::MATCH_HISTORY)
            .bind(summoner_name)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn player_stats(&self, summoner_name: &str) -> Result<Option<PlayerStats>, AppError> {
        let stats = sqlx::query_as::<_, PlayerStats>(queries::PLAYER_STATS)
            .bind(summoner_name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(stats)
    }

    pub async fn champion_performance(
        &self,
        summoner_name: &str,
    ) -> Result<Vec<ChampionStats>, AppError> {
        let stats = sqlx::query_as::<_, ChampionStats>(queries::CHAMPION_PERFORMANCE)
            .bind(summoner_name)
            .fetch_all(&self.pool)
            .await?;
        Ok(stats)
    }
}

/// Raw rolling-window statistics behind the Bollinger query. The bands are
/// derived here because the bundled SQLite carries no sqrt function.
#[derive(Debug, sqlx::FromRow)]
struct BollingerWindowRow {
    match_id: String,
    gold_per_minute: f64,
    ma: f64,
    ma_sq: f64,
    samples: i64,
}

impl BollingerWindowRow {
    const WINDOW: i64 = 20;

    fn into_point(self) -> BollingerPoint {
        if self.samples < Self::WINDOW {
            return BollingerPoint {
                match_id: self.match_id,
                gold_per_minute: self.gold_per_minute,
                middle_band: None,
                upper_band: None,
                lower_band: None,
            };
        }

        // Clamp against float round-off before the square root.
        let std_dev = (self.ma_sq - self.ma * self.ma).max(0.0).sqrt();
        BollingerPoint {
            match_id: self.match_id,
            gold_per_minute: self.gold_per_minute,
            middle_band: Some(self.ma),
            upper_band: Some(self.ma + 2.0 * std_dev),
            lower_band: Some(self.ma - 2.0 * std_dev),
        }
    }
}

/// Errors worth retrying: connection/IO hiccups and SQLite busy/locked states.
fn is_transient(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut => true,
        sqlx::Error::Database(db) => {
            let msg = db.message().to_lowercase();
            msg.contains("locked") || msg.contains("busy")
        }
        _ => false,
    }
}
