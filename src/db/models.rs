use sqlx::FromRow;

/// One warehouse row per match. Immutable once stored.
#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct MatchRow {
    pub match_id: String,
    pub game_creation: i64,
    pub game_duration: i64,
    pub game_mode: String,
    pub game_type: String,
    pub queue_id: i64,
}

/// One warehouse row per participant, flattened from the match payload with
/// the derived per-minute metrics already computed.
#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct ParticipantRow {
    pub match_id: String,
    pub puuid: String,
    pub summoner_name: String,
    pub champion_name: String,
    pub kills: i64,
    pub deaths: i64,
    pub assists: i64,
    pub gold_earned: i64,
    pub total_damage_dealt: i64,
    pub vision_score: i64,
    pub kda_ratio: f64,
    pub gold_per_minute: f64,
    pub damage_per_minute: f64,
    pub vision_score_per_minute: f64,
    pub win: bool,
}

/// Ephemeral per-poll capture of an active game. Best-effort only.
#[derive(Debug, Clone, FromRow)]
pub struct LiveSnapshotRow {
    pub game_id: i64,
    pub puuid: String,
    pub summoner_name: String,
    pub platform_id: String,
    pub game_mode: String,
    pub game_length: i64,
    pub captured_at: i64,
}

/// One point of the rolling RSI series. `rsi` is NULL while the window has no
/// losses or not enough samples.
#[derive(Debug, Clone, FromRow)]
pub struct RsiPoint {
    pub match_id: String,
    pub kda_ratio: f64,
    pub rsi: Option<f64>,
}

/// One point of the Bollinger Band envelope over gold per minute.
#[derive(Debug, Clone, FromRow)]
pub struct BollingerPoint {
    pub match_id: String,
    pub gold_per_minute: f64,
    pub middle_band: Option<f64>,
    pub upper_band: Option<f64>,
    pub lower_band: Option<f64>,
}

/// Aggregate performance of a summoner over their stored matches.
#[derive(Debug, Clone, FromRow)]
pub struct PlayerStats {
    pub games_played: i64,
    pub avg_kda: f64,
    pub avg_gold_per_minute: f64,
    pub avg_damage_per_minute: f64,
    pub avg_vision_per_minute: f64,
    pub win_rate: f64,
}

/// Aggregate performance of a summoner on one champion.
#[derive(Debug, Clone, FromRow)]
pub struct ChampionStats {
    pub champion_name: String,
    pub games_played: i64,
    pub avg_kda: f64,
    pub win_rate: f64,
}
